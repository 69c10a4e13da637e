use common::{FeedbackSource, RcError, Result, SharedInput};
use nalgebra::DVector;
use nanorand::WyRand;

use crate::{
    readout::{write_feedback, ReadoutUnit, ReadoutWeights},
    ReadoutParams,
};

/// Readout units whose feedback can be clamped to a target signal.
///
/// While clamped (the initial state) the network receives `w_back · target(t)`
/// instead of the feedback of its own readout, so it can be trained to
/// produce the target before its readout is accurate. The readout itself is
/// always computed from the network.
pub struct ReadoutClampedFB {
    weights: ReadoutWeights,
    target: SharedInput,
    clamped: bool,
}

impl ReadoutClampedFB {
    /// Create one readout unit per channel of `target` on a reservoir of `n` neurons
    pub fn new(
        target: SharedInput,
        n: usize,
        params: &ReadoutParams,
        rng: &mut WyRand,
    ) -> Result<Self> {
        let m = target.borrow().size();
        let weights = ReadoutWeights::new(m, n, params, rng)?;

        Ok(Self {
            weights,
            target,
            clamped: true,
        })
    }

    /// Swap the target, which has to keep the number of channels
    pub fn set_target(&mut self, target: SharedInput) -> Result<()> {
        let size = target.borrow().size();
        if size != self.size() {
            return Err(RcError::dims("ReadoutClampedFB::set_target", (self.size(), 1), (size, 1)));
        }
        self.target = target;
        Ok(())
    }

    /// Feed back the target from now on
    pub fn clamp(&mut self) {
        debug!("feedback clamped to target");
        self.clamped = true;
    }

    /// Feed back the readout from now on
    pub fn unclamp(&mut self) {
        debug!("feedback unclamped");
        self.clamped = false;
    }

    #[inline(always)]
    pub fn is_clamped(&self) -> bool {
        self.clamped
    }

    /// The target at time `t`
    pub fn target_readout(&self, t: f64) -> Result<DVector<f64>> {
        let mut target = DVector::zeros(self.size());
        self.target.borrow().get_input(t, &mut target)?;
        Ok(target)
    }

    pub fn target_readout_array(&self, t: f64) -> Result<Vec<f64>> {
        Ok(self.target_readout(t)?.as_slice().to_vec())
    }
}

impl ReadoutUnit for ReadoutClampedFB {
    #[inline(always)]
    fn weights(&self) -> &ReadoutWeights {
        &self.weights
    }

    #[inline(always)]
    fn weights_mut(&mut self) -> &mut ReadoutWeights {
        &mut self.weights
    }

    fn readout_and_feedback(
        &self,
        r: &DVector<f64>,
        t: f64,
    ) -> Result<(DVector<f64>, DVector<f64>)> {
        let y = self.readout(r, t)?;
        let fb = if self.clamped {
            self.weights.feedback(&self.target_readout(t)?)?
        } else {
            self.weights.feedback(&y)?
        };
        Ok((y, fb))
    }
}

impl FeedbackSource for ReadoutClampedFB {
    #[inline(always)]
    fn fb_size(&self) -> usize {
        self.weights.n()
    }

    fn get_feedback(&self, rate: &DVector<f64>, t: f64, out: &mut DVector<f64>) -> Result<()> {
        write_feedback(self, rate, t, out)
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, rc::Rc};

    use common::{Waveform, WaveformStream};
    use nalgebra::DMatrix;
    use round::round;

    use super::*;

    fn wave(waveform: Waveform) -> SharedInput {
        Rc::new(RefCell::new(WaveformStream::new(waveform, 1.0).unwrap()))
    }

    fn small_readout() -> ReadoutClampedFB {
        let mut rng = WyRand::new_seed(0);
        let mut ro =
            ReadoutClampedFB::new(wave(Waveform::Sine), 3, &ReadoutParams::default(), &mut rng)
                .unwrap();
        ro.set_w_out(DMatrix::from_row_slice(1, 3, &[1.0, 1.0, 1.0])).unwrap();
        ro.weights_mut()
            .set_w_back(DMatrix::from_column_slice(3, 1, &[1.0, -1.0, 0.5]))
            .unwrap();
        ro
    }

    #[test]
    fn clamped_feedback_follows_target() {
        if let Err(_) = pretty_env_logger::try_init() {}

        let mut ro = small_readout();
        assert!(ro.is_clamped());
        let r = DVector::from_vec(vec![0.1, 0.2, 0.3]);

        let (y, fb) = ro.readout_and_feedback(&r, 0.25).unwrap();
        assert_eq!(round(y[0], 12), 0.6);
        // sin(2π · 0.25) = 1
        let fb: Vec<f64> = fb.iter().map(|v| round(*v, 12)).collect();
        assert_eq!(fb, vec![1.0, -1.0, 0.5]);

        // independent of the readout weights
        ro.set_w_out(DMatrix::from_row_slice(1, 3, &[5.0, -3.0, 2.0])).unwrap();
        let mut out = DVector::zeros(3);
        ro.get_feedback(&r, 0.25, &mut out).unwrap();
        let out: Vec<f64> = out.iter().map(|v| round(*v, 12)).collect();
        assert_eq!(out, vec![1.0, -1.0, 0.5]);
    }

    #[test]
    fn unclamped_feedback_follows_readout() {
        let mut ro = small_readout();
        let r = DVector::from_vec(vec![0.1, 0.2, 0.3]);
        let mut clamped = DVector::zeros(3);
        ro.get_feedback(&r, 0.25, &mut clamped).unwrap();

        ro.unclamp();
        assert!(!ro.is_clamped());
        let mut unclamped = DVector::zeros(3);
        ro.get_feedback(&r, 0.25, &mut unclamped).unwrap();
        let unclamped_rounded: Vec<f64> = unclamped.iter().map(|v| round(*v, 12)).collect();
        assert_eq!(unclamped_rounded, vec![0.6, -0.6, 0.3]);
        assert_ne!(clamped, unclamped);

        ro.clamp();
        let mut again = DVector::zeros(3);
        ro.get_feedback(&r, 0.25, &mut again).unwrap();
        assert_eq!(again, clamped);
    }

    #[test]
    fn clamped_target_access() {
        let ro = small_readout();
        assert_eq!(round(ro.target_readout_array(0.25).unwrap()[0], 12), 1.0);
        assert_eq!(round(ro.target_readout(0.75).unwrap()[0], 12), -1.0);
    }

    #[test]
    fn clamped_set_target_keeps_width() {
        let mut ro = small_readout();
        ro.set_target(wave(Waveform::Triangle)).unwrap();
        // the triangle starts at 1
        assert_eq!(ro.target_readout_array(0.0).unwrap(), vec![1.0]);

        let wide: SharedInput = Rc::new(RefCell::new(common::TimeSeriesStream::new(
            common::TimeSeries::new(2).unwrap(),
            0.001,
            0.0,
        )
        .unwrap()));
        assert_eq!(
            ro.set_target(wide),
            Err(RcError::dims("ReadoutClampedFB::set_target", (1, 1), (2, 1)))
        );
    }
}
