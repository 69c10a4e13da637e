use common::{validate, Result};
use nalgebra::DVector;

use crate::{check_dims, DynamicalEquation, Integrator};

/// Euler's method, x += dt * f(x, t)
#[derive(Debug, Clone)]
pub struct EulerIntegrator {
    n: usize,
    deriv: DVector<f64>,
}

impl EulerIntegrator {
    /// Create an integrator for states of dimension `n`
    pub fn new(n: usize) -> Result<Self> {
        validate::positive_size("n", n)?;

        Ok(Self {
            n,
            deriv: DVector::zeros(n),
        })
    }
}

impl Integrator for EulerIntegrator {
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

        eq.time_deriv(x, t, &mut self.deriv)?;
        x.axpy(dt, &self.deriv, 1.0);

        Ok(())
    }
}
