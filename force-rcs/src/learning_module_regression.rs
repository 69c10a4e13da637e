use common::{RcError, Result, SharedInput, TimeSeries};
use lin_reg::{LeastSquares, LinReg};
use nalgebra::{DMatrix, DVector};

use crate::{ReadoutUnit, Reservoir};

/// Diagnostics of one batch regression
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegressionReport {
    /// Number of (rate, target) pairs the weights were fit to
    pub n_samples: usize,
    /// Root mean square error of the previous weights on the stored data
    pub rms_before: f64,
    /// Root mean square error of the fitted weights on the stored data
    pub rms_after: f64,
}

/// Collects (firing rate, target) pairs during a simulation and fits the
/// readout weights to all of them at once.
///
/// Solves R · W' ≈ T for the M x N readout matrix W, where R (T x N) holds
/// one firing rate vector and T (T x M) one target vector per stored step.
pub struct LearningModuleRegression<R: LinReg = LeastSquares> {
    n: usize,
    m: usize,
    stored_r: TimeSeries,
    stored_target: TimeSeries,
    target: SharedInput,
    regressor: R,
}

impl LearningModuleRegression<LeastSquares> {
    /// Learn `target` from a reservoir of `n` neurons by ordinary least squares
    pub fn new(n: usize, target: SharedInput) -> Result<Self> {
        Self::with_regressor(n, target, LeastSquares::default())
    }
}

impl<R: LinReg> LearningModuleRegression<R> {
    /// Learn `target` from a reservoir of `n` neurons with a custom regression backend
    pub fn with_regressor(n: usize, target: SharedInput, regressor: R) -> Result<Self> {
        let m = target.borrow().size();

        Ok(Self {
            n,
            m,
            stored_r: TimeSeries::new(n)?,
            stored_target: TimeSeries::new(m)?,
            target,
            regressor,
        })
    }

    #[inline(always)]
    pub fn stored_r(&self) -> &TimeSeries {
        &self.stored_r
    }

    #[inline(always)]
    pub fn stored_target(&self) -> &TimeSeries {
        &self.stored_target
    }

    /// Record the current firing rates of `reservoir` together with the target
    /// at the reservoir's time
    pub fn store(&mut self, reservoir: &Reservoir) -> Result<()> {
        let mut target = DVector::zeros(self.m);
        self.target.borrow().get_input(reservoir.t(), &mut target)?;
        self.store_sample(reservoir.get_r().as_slice(), target.as_slice())
    }

    /// Record one (firing rate, target) pair.
    /// Nothing is stored unless both are wide enough.
    pub fn store_sample(&mut self, rate: &[f64], target: &[f64]) -> Result<()> {
        if rate.len() < self.n {
            return Err(RcError::dims("stored rate", (1, self.n), (1, rate.len())));
        }
        if target.len() < self.m {
            return Err(RcError::dims("stored target", (1, self.m), (1, target.len())));
        }
        self.stored_r.add_time_point(rate)?;
        self.stored_target.add_time_point(target)?;

        Ok(())
    }

    /// Fit the readout weights of `readout` to everything stored so far
    pub fn learn<U: ReadoutUnit + ?Sized>(&self, readout: &mut U) -> Result<RegressionReport> {
        let expected = (self.m, self.n);
        if readout.w_out().shape() != expected {
            return Err(RcError::dims(
                "LearningModuleRegression::learn",
                expected,
                readout.w_out().shape(),
            ));
        }
        if self.stored_r.is_empty() {
            return Err(RcError::EmptyTimeSeries);
        }

        let r = self.stored_r.to_matrix();
        let t = self.stored_target.to_matrix();
        let n_samples = r.nrows();

        let rms_before = rms_error(&(&r * readout.w_out().transpose()), &t);
        info!("rms error before learning: {}", rms_before);

        let design = r.columns(0, r.ncols());
        let targets = t.columns(0, t.ncols());
        let coeffs = self.regressor.fit_readout(&design, &targets)?;

        let rms_after = rms_error(&(&r * &coeffs), &t);
        info!("rms error after learning: {}", rms_after);

        readout.set_w_out(coeffs.transpose())?;

        Ok(RegressionReport {
            n_samples,
            rms_before,
            rms_after,
        })
    }

    /// Drop all stored samples
    pub fn reset(&mut self) -> Result<()> {
        debug!("dropping {} stored samples", self.stored_r.n_t());
        self.stored_r = TimeSeries::new(self.n)?;
        self.stored_target = TimeSeries::new(self.m)?;
        Ok(())
    }
}

/// Root mean square of the element wise difference
fn rms_error(predicted: &DMatrix<f64>, actual: &DMatrix<f64>) -> f64 {
    let diff = predicted - actual;
    (diff.norm_squared() / diff.len() as f64).sqrt()
}
