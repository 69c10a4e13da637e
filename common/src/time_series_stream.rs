use nalgebra::DVector;

use crate::{check_output_len, validate, InputStream, RcError, Result, TimeSeries};

/// Slack allowed on top of one step when comparing query times with the
/// internal clock of a `TimeSeriesStream`
pub const TIME_TOLERANCE: f64 = 1.0e-10;

/// Replays a recorded `TimeSeries` frame by frame as an `InputStream`.
///
/// The stream keeps its own clock, which has to be advanced together with the
/// consuming simulation by calling `next_frame` once per integration step.
/// Queries more than `dt + TIME_TOLERANCE` away from that clock are a logic
/// error of the caller and are rejected, as are queries after the last frame.
#[derive(Debug, Clone)]
pub struct TimeSeriesStream {
    series: TimeSeries,
    dt: f64,
    t: f64,
    frame: usize,
}

impl TimeSeriesStream {
    /// # Arguments
    /// series: The completed recording to replay
    /// dt: Time between two consecutive frames
    /// t: Time of the first frame
    pub fn new(series: TimeSeries, dt: f64, t: f64) -> Result<Self> {
        validate::positive_finite("dt", dt)?;
        validate::finite("t", t)?;
        debug!("replaying {} frames of width {} from t = {}", series.n_t(), series.n_series(), t);

        Ok(Self {
            series,
            dt,
            t,
            frame: 0,
        })
    }

    /// Move the internal clock without changing the current frame
    #[inline(always)]
    pub fn set_t(&mut self, t: f64) {
        self.t = t;
    }

    /// The internal clock
    #[inline(always)]
    pub fn t(&self) -> f64 {
        self.t
    }

    /// Index of the frame currently served
    #[inline(always)]
    pub fn frame(&self) -> usize {
        self.frame
    }

    /// False once every recorded frame has been left behind
    #[inline(always)]
    pub fn has_more_frames(&self) -> bool {
        self.frame < self.series.n_t()
    }

    /// Advance the clock by `dt` and move on to the next frame
    pub fn next_frame(&mut self) {
        self.t += self.dt;
        self.frame += 1;
        trace!("replay advanced to frame {} at t = {}", self.frame, self.t);
    }
}

impl InputStream for TimeSeriesStream {
    #[inline(always)]
    fn size(&self) -> usize {
        self.series.n_series()
    }

    fn get_input(&self, t: f64, out: &mut DVector<f64>) -> Result<()> {
        let window = self.dt + TIME_TOLERANCE;
        if (t - self.t).abs() > window {
            return Err(RcError::ReplayDesync {
                query: t,
                clock: self.t,
                window,
            });
        }
        if !self.has_more_frames() {
            return Err(RcError::ReplayExhausted {
                frame: self.frame,
                n_frames: self.series.n_t(),
            });
        }
        check_output_len("TimeSeriesStream::get_input", self.size(), out)?;
        out.copy_from_slice(self.series.time_point(self.frame)?);

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recording() -> TimeSeries {
        let mut ts = TimeSeries::new(2).unwrap();
        for i in 0..3 {
            ts.add_time_point(&[i as f64, -(i as f64)]).unwrap();
        }
        ts
    }

    #[test]
    fn stream_serves_current_frame() {
        if let Err(_) = pretty_env_logger::try_init() {}

        let mut stream = TimeSeriesStream::new(recording(), 0.1, 1.0).unwrap();
        let mut out = DVector::zeros(2);

        stream.get_input(1.0, &mut out).unwrap();
        assert_eq!(out.as_slice(), &[0.0, -0.0]);

        // anywhere within one step of the clock is fine, e.g. a Runge-Kutta stage
        stream.get_input(1.05, &mut out).unwrap();
        stream.get_input(1.1, &mut out).unwrap();
        assert_eq!(out.as_slice(), &[0.0, -0.0]);

        stream.next_frame();
        assert_eq!(stream.frame(), 1);
        stream.get_input(1.1, &mut out).unwrap();
        assert_eq!(out.as_slice(), &[1.0, -1.0]);
    }

    #[test]
    fn stream_rejects_desynchronized_query() {
        let stream = TimeSeriesStream::new(recording(), 0.1, 1.0).unwrap();
        let mut out = DVector::zeros(2);

        match stream.get_input(1.2, &mut out) {
            Err(RcError::ReplayDesync { query, clock, .. }) => {
                assert_eq!(query, 1.2);
                assert_eq!(clock, 1.0);
            }
            other => panic!("expected desync, got {:?}", other),
        }
        assert!(stream.get_input(0.85, &mut out).is_err());
        // a failed query leaves the buffer untouched
        assert_eq!(out, DVector::zeros(2));
    }

    #[test]
    fn stream_exhaustion() {
        let mut stream = TimeSeriesStream::new(recording(), 0.1, 0.0).unwrap();
        let mut out = DVector::zeros(2);

        for _ in 0..3 {
            assert!(stream.has_more_frames());
            stream.get_input(stream.t(), &mut out).unwrap();
            stream.next_frame();
        }
        assert!(!stream.has_more_frames());
        assert_eq!(
            stream.get_input(stream.t(), &mut out),
            Err(RcError::ReplayExhausted {
                frame: 3,
                n_frames: 3
            })
        );
    }

    #[test]
    fn stream_rejects_wrong_width() {
        let stream = TimeSeriesStream::new(recording(), 0.1, 0.0).unwrap();
        assert_eq!(stream.size(), 2);

        let mut out = DVector::zeros(3);
        assert!(matches!(
            stream.get_input(0.0, &mut out),
            Err(RcError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn stream_set_t() {
        let mut stream = TimeSeriesStream::new(recording(), 0.1, 0.0).unwrap();
        let mut out = DVector::zeros(2);
        stream.set_t(5.0);
        assert!(stream.get_input(0.0, &mut out).is_err());
        assert!(stream.get_input(5.0, &mut out).is_ok());
        assert_eq!(stream.frame(), 0);
    }

    #[test]
    fn stream_parameter_validation() {
        assert!(TimeSeriesStream::new(recording(), 0.0, 0.0).is_err());
        assert!(TimeSeriesStream::new(recording(), 0.1, f64::NAN).is_err());
    }
}
