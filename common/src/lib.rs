//! This crate provides the functionality shared by the reservoir crates:
//! the error taxonomy, the stream traits wiring inputs and feedback into a
//! reservoir, and the time series used to record and replay signals.

#![deny(unused_imports)]
#![warn(missing_docs)]

#[macro_use]
extern crate log;

mod error;
mod streams;
mod time_series;
mod time_series_stream;
pub mod validate;
mod waveforms;

pub use error::{RcError, Result};
pub use streams::{check_output_len, FeedbackSource, InputStream, SharedFeedback, SharedInput};
pub use time_series::TimeSeries;
pub use time_series_stream::{TimeSeriesStream, TIME_TOLERANCE};
pub use waveforms::{Waveform, WaveformStream};
