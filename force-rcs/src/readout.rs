use common::{check_output_len, FeedbackSource, RcError, Result};
use nalgebra::{DMatrix, DVector};
use nanorand::WyRand;

use crate::{
    weights::{sparse_gaussian, sparse_uniform},
    ReadoutParams, Reservoir,
};

/// The feedforward and feedback weights of M linear readout units attached
/// to a reservoir of N neurons.
///
/// `w_out` (M x N) maps firing rates to readout values and is drawn from a
/// normal distribution scaled by 1 / sqrt(N * p_z) (Sussillo & Abbott 2009).
/// `w_back` (N x M) maps readout values back onto the neurons and is drawn
/// uniformly from [-g, g]. Both keep their shape for their whole lifetime.
#[derive(Debug, Clone)]
pub struct ReadoutWeights {
    pub(crate) w_out: DMatrix<f64>,
    pub(crate) w_back: DMatrix<f64>,
}

impl ReadoutWeights {
    /// Draws `w_out` first, then `w_back`
    pub fn new(m: usize, n: usize, params: &ReadoutParams, rng: &mut WyRand) -> Result<Self> {
        common::validate::positive_size("m", m)?;
        common::validate::positive_size("n", n)?;
        params.validate()?;

        let p_z = params.readout_sparsity;
        let w_out = sparse_gaussian(m, n, p_z, 1.0 / (n as f64 * p_z).sqrt(), rng);
        let w_back = sparse_uniform(n, m, params.feedback_sparsity, params.feedback_gain, rng);
        debug!("readout weights: M: {}, N: {}, params: {:?}", m, n, params);

        Ok(Self { w_out, w_back })
    }

    /// Number of readout units
    #[inline(always)]
    pub fn m(&self) -> usize {
        self.w_out.nrows()
    }

    /// Number of neurons read from and fed back to
    #[inline(always)]
    pub fn n(&self) -> usize {
        self.w_out.ncols()
    }

    #[inline(always)]
    pub fn w_out(&self) -> &DMatrix<f64> {
        &self.w_out
    }

    #[inline(always)]
    pub fn w_back(&self) -> &DMatrix<f64> {
        &self.w_back
    }

    pub fn set_w_out(&mut self, w_out: DMatrix<f64>) -> Result<()> {
        if w_out.shape() != self.w_out.shape() {
            return Err(RcError::dims("set_w_out", self.w_out.shape(), w_out.shape()));
        }
        self.w_out = w_out;
        Ok(())
    }

    pub fn set_w_back(&mut self, w_back: DMatrix<f64>) -> Result<()> {
        if w_back.shape() != self.w_back.shape() {
            return Err(RcError::dims("set_w_back", self.w_back.shape(), w_back.shape()));
        }
        self.w_back = w_back;
        Ok(())
    }

    /// y = w_out · r
    pub fn readout(&self, r: &DVector<f64>) -> Result<DVector<f64>> {
        if r.len() != self.n() {
            return Err(RcError::dims("readout rate", (self.n(), 1), (r.len(), 1)));
        }
        Ok(&self.w_out * r)
    }

    /// fb = w_back · y
    pub fn feedback(&self, y: &DVector<f64>) -> Result<DVector<f64>> {
        if y.len() != self.m() {
            return Err(RcError::dims("feedback readout", (self.m(), 1), (y.len(), 1)));
        }
        Ok(&self.w_back * y)
    }
}

/// A set of linear readout units, which doubles as the feedback source of a reservoir.
///
/// Variants share the weights and the readout computation, and differ in how
/// the feedback is sourced and in whether they learn.
pub trait ReadoutUnit {
    fn weights(&self) -> &ReadoutWeights;

    fn weights_mut(&mut self) -> &mut ReadoutWeights;

    /// Number of readout units M
    #[inline(always)]
    fn size(&self) -> usize {
        self.weights().m()
    }

    /// The readout for firing rates `r`, independent of `t`
    fn readout(&self, r: &DVector<f64>, _t: f64) -> Result<DVector<f64>> {
        self.weights().readout(r)
    }

    /// The readout and the feedback it produces.
    /// Every feedback consumer goes through this.
    fn readout_and_feedback(
        &self,
        r: &DVector<f64>,
        t: f64,
    ) -> Result<(DVector<f64>, DVector<f64>)> {
        let y = self.readout(r, t)?;
        let fb = self.weights().feedback(&y)?;
        Ok((y, fb))
    }

    fn readout_array(&self, r: &DVector<f64>, t: f64) -> Result<Vec<f64>> {
        Ok(self.readout(r, t)?.as_slice().to_vec())
    }

    /// The readout of the current state of `reservoir`
    fn readout_array_for(&self, reservoir: &Reservoir) -> Result<Vec<f64>> {
        self.readout_array(reservoir.get_r(), reservoir.t())
    }

    #[inline(always)]
    fn w_out(&self) -> &DMatrix<f64> {
        self.weights().w_out()
    }

    #[inline(always)]
    fn w_back(&self) -> &DMatrix<f64> {
        self.weights().w_back()
    }

    /// Replace the readout weights, which have to be M x N
    fn set_w_out(&mut self, w_out: DMatrix<f64>) -> Result<()> {
        self.weights_mut().set_w_out(w_out)
    }
}

/// Write the feedback of `unit` into `out`
pub(crate) fn write_feedback<U: ReadoutUnit + ?Sized>(
    unit: &U,
    rate: &DVector<f64>,
    t: f64,
    out: &mut DVector<f64>,
) -> Result<()> {
    check_output_len("readout feedback", unit.weights().n(), out)?;
    let (_, fb) = unit.readout_and_feedback(rate, t)?;
    out.copy_from(&fb);
    Ok(())
}

/// Readout units with fixed random weights, feeding their own output back
#[derive(Debug, Clone)]
pub struct Readout {
    weights: ReadoutWeights,
}

impl Readout {
    /// Create `m` readout units on a reservoir of `n` neurons
    pub fn new(m: usize, n: usize, params: &ReadoutParams, rng: &mut WyRand) -> Result<Self> {
        Ok(Self {
            weights: ReadoutWeights::new(m, n, params, rng)?,
        })
    }
}

impl ReadoutUnit for Readout {
    #[inline(always)]
    fn weights(&self) -> &ReadoutWeights {
        &self.weights
    }

    #[inline(always)]
    fn weights_mut(&mut self) -> &mut ReadoutWeights {
        &mut self.weights
    }
}

impl FeedbackSource for Readout {
    #[inline(always)]
    fn fb_size(&self) -> usize {
        self.weights.n()
    }

    fn get_feedback(&self, rate: &DVector<f64>, t: f64, out: &mut DVector<f64>) -> Result<()> {
        write_feedback(self, rate, t, out)
    }
}
