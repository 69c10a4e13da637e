use common::{validate, FeedbackSource, RcError, Result, SharedInput};
use nalgebra::{DMatrix, DVector};
use nanorand::WyRand;

use crate::{
    readout::{write_feedback, ReadoutUnit, ReadoutWeights},
    ReadoutParams, Reservoir,
};

/// Readout units trained online by recursive least squares (FORCE learning,
/// Sussillo & Abbott 2009).
///
/// Keeps a running estimate `P` of the inverse correlation matrix of the
/// firing rates, initialized to I / alpha. Feedback always comes from the
/// units' own readout.
pub struct ReadoutRLS {
    weights: ReadoutWeights,
    target: SharedInput,
    alpha: f64,
    p: DMatrix<f64>,
}

impl ReadoutRLS {
    /// # Arguments
    /// target: The signal to learn, one readout unit per channel
    /// n: Number of neurons in the reservoir
    /// params: Sparsity and gain of the weights
    /// alpha: Learning rate, values of 1 to 100 are typical
    pub fn new(
        target: SharedInput,
        n: usize,
        params: &ReadoutParams,
        alpha: f64,
        rng: &mut WyRand,
    ) -> Result<Self> {
        validate::positive_finite("alpha", alpha)?;
        let m = target.borrow().size();
        let weights = ReadoutWeights::new(m, n, params, rng)?;

        Ok(Self {
            weights,
            target,
            alpha,
            p: DMatrix::identity(n, n) / alpha,
        })
    }

    #[inline(always)]
    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    /// The inverse correlation estimate
    #[inline(always)]
    pub fn p(&self) -> &DMatrix<f64> {
        &self.p
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

    /// The per unit error (target - readout) * target
    pub fn error_array(&self, r: &DVector<f64>, t: f64) -> Result<Vec<f64>> {
        let y = self.readout(r, t)?;
        let target = self.target_readout(t)?;
        let err = (&target - y).component_mul(&target);
        Ok(err.as_slice().to_vec())
    }

    /// The error for the current state of `reservoir`
    pub fn error_array_for(&self, reservoir: &Reservoir) -> Result<Vec<f64>> {
        self.error_array(reservoir.get_r(), reservoir.t())
    }

    /// One recursive least squares update from the current state of `reservoir`.
    /// How often to call this is up to the driver, typically every few integration steps.
    pub fn learn(&mut self, reservoir: &Reservoir) -> Result<()> {
        let r = reservoir.get_r();
        let t = reservoir.t();
        if r.len() != self.weights.n() {
            return Err(RcError::dims("ReadoutRLS::learn", (self.weights.n(), 1), (r.len(), 1)));
        }

        let error = self.weights.readout(r)? - self.target_readout(t)?;

        let pr = &self.p * r;
        let rp = r.transpose() * &self.p;
        let norm = 1.0 + (&rp * r)[(0, 0)];
        self.p -= (&pr * &rp) / norm;

        let rp = r.transpose() * &self.p;
        self.weights.w_out -= &error * &rp;
        trace!("rls update at t = {}, |error|: {}", t, error.norm());

        Ok(())
    }
}

impl ReadoutUnit for ReadoutRLS {
    #[inline(always)]
    fn weights(&self) -> &ReadoutWeights {
        &self.weights
    }

    #[inline(always)]
    fn weights_mut(&mut self) -> &mut ReadoutWeights {
        &mut self.weights
    }
}

impl FeedbackSource for ReadoutRLS {
    #[inline(always)]
    fn fb_size(&self) -> usize {
        self.weights.n()
    }

    fn get_feedback(&self, rate: &DVector<f64>, t: f64, out: &mut DVector<f64>) -> Result<()> {
        write_feedback(self, rate, t, out)
    }
}
