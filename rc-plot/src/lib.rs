#[macro_use]
extern crate log;

mod time_series_plotter;

pub use time_series_plotter::TimeSeriesPlotter;

pub type Series = Vec<(f64, f64)>;
