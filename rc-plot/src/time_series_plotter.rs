use std::error::Error;

use common::{RcError, Result, TimeSeries};
use plotters::prelude::*;

use super::Series;

/// Records a multi channel signal during a simulation and renders it as a
/// line chart, one line per channel
#[derive(Debug, Clone)]
pub struct TimeSeriesPlotter {
    series: TimeSeries,
    title: String,
    dt: f64,
}

impl TimeSeriesPlotter {
    /// # Arguments
    /// n_series: Number of channels recorded per time point
    /// title: Caption of the chart
    /// dt: Time between two consecutive time points
    pub fn new(n_series: usize, title: impl Into<String>, dt: f64) -> Result<Self> {
        common::validate::positive_finite("dt", dt)?;

        Ok(Self {
            series: TimeSeries::new(n_series)?,
            title: title.into(),
            dt,
        })
    }

    /// Append one time point, keeping only the first `n_series` values
    #[inline(always)]
    pub fn add_time_point(&mut self, x: &[f64]) -> Result<()> {
        self.series.add_time_point(x)
    }

    #[inline(always)]
    pub fn series(&self) -> &TimeSeries {
        &self.series
    }

    #[inline(always)]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// One (time, value) series per channel, the i-th time point at (i + 1) * dt
    pub fn channels(&self) -> Vec<Series> {
        let mut channels: Vec<Series> =
            vec![Vec::with_capacity(self.series.n_t()); self.series.n_series()];
        for (i, point) in self.series.iter().enumerate() {
            let t = (i + 1) as f64 * self.dt;
            for (channel, v) in channels.iter_mut().zip(point) {
                channel.push((t, *v));
            }
        }
        channels
    }

    /// Render all channels into a bitmap at `filename`
    pub fn render(&self, filename: &str, dims: (u32, u32)) -> std::result::Result<(), Box<dyn Error>> {
        if self.series.is_empty() {
            return Err(Box::new(RcError::EmptyTimeSeries));
        }
        let channels = self.channels();
        let t_min = channels[0][0].0;
        let t_max = channels[0][channels[0].len() - 1].0;
        let (mut v_min, mut v_max) = value_range(&channels);
        if v_min == v_max {
            v_min -= 1.0;
            v_max += 1.0;
        }

        let root = BitMapBackend::new(filename, dims).into_drawing_area();
        root.fill(&WHITE)?;

        let mut cc0 = ChartBuilder::on(&root)
            .margin(5)
            .x_label_area_size(20)
            .y_label_area_size(40)
            .caption(&self.title, ("sans-serif", 20).into_font().with_color(BLACK))
            .build_cartesian_2d(t_min..t_max.max(t_min + self.dt), v_min..v_max)?;

        cc0.configure_mesh()
            .x_labels(20)
            .y_labels(20)
            .x_label_formatter(&|v| format!("{:.2}", v))
            .y_label_formatter(&|v| format!("{:.2}", v))
            .draw()?;

        for (i, channel) in channels.into_iter().enumerate() {
            let color = Palette99::pick(i).to_rgba();
            cc0.draw_series(LineSeries::new(channel, color))?
                .label(format!("{}", i))
                .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color));
        }
        cc0.configure_series_labels().border_style(BLACK).draw()?;

        root.present()?;
        info!("rendered '{}' with {} time points to {}", self.title, self.series.n_t(), filename);

        Ok(())
    }
}

/// Smallest and largest finite value over all channels
fn value_range(channels: &[Series]) -> (f64, f64) {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for (_, v) in channels.iter().flatten() {
        if !v.is_finite() {
            continue;
        }
        if *v < min {
            min = *v;
        }
        if *v > max {
            max = *v;
        }
    }
    if min > max {
        (0.0, 0.0)
    } else {
        (min, max)
    }
}
