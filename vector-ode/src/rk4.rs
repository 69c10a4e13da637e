use common::{validate, Result};
use nalgebra::DVector;

use crate::{check_dims, DynamicalEquation, Integrator};

/// Classic fourth order Runge-Kutta.
///
/// Every stage evaluates the equation at its own (state, time) pair, so an
/// equation consulting external sources (e.g. feedback) sees each
/// intermediate state. Nothing is cached across stages.
#[derive(Debug, Clone)]
pub struct RK4Integrator {
    n: usize,
    k: DVector<f64>,
    x_est: DVector<f64>,
    deriv: DVector<f64>,
}

impl RK4Integrator {
    /// Create an integrator for states of dimension `n`
    pub fn new(n: usize) -> Result<Self> {
        validate::positive_size("n", n)?;

        Ok(Self {
            n,
            k: DVector::zeros(n),
            x_est: DVector::zeros(n),
            deriv: DVector::zeros(n),
        })
    }
}

impl Integrator for RK4Integrator {
    #[inline(always)]
    fn dim(&self) -> usize {
        self.n
    }

    fn step(
        &mut self,
        x: &mut DVector<f64>,
        t: f64,
        eq: &dyn DynamicalEquation,
        dt: f64,
    ) -> Result<()> {
        check_dims(self.n, x, eq)?;
        let half_dt = 0.5 * dt;

        // k1
        eq.time_deriv(x, t, &mut self.k)?;
        self.deriv.copy_from(&self.k);

        // k2 at x + dt/2 * k1
        self.x_est.copy_from(x);
        self.x_est.axpy(half_dt, &self.k, 1.0);
        eq.time_deriv(&self.x_est, t + half_dt, &mut self.k)?;
        self.deriv.axpy(2.0, &self.k, 1.0);

        // k3 at x + dt/2 * k2
        self.x_est.copy_from(x);
        self.x_est.axpy(half_dt, &self.k, 1.0);
        eq.time_deriv(&self.x_est, t + half_dt, &mut self.k)?;
        self.deriv.axpy(2.0, &self.k, 1.0);

        // k4 at x + dt * k3
        self.x_est.copy_from(x);
        self.x_est.axpy(dt, &self.k, 1.0);
        eq.time_deriv(&self.x_est, t + dt, &mut self.k)?;
        self.deriv += &self.k;

        x.axpy(dt / 6.0, &self.deriv, 1.0);

        Ok(())
    }
}
