//! Fixed step solvers for vector valued ordinary differential equations

#[macro_use]
extern crate log;

use common::Result;
use nalgebra::DVector;

mod euler;
mod rk4;

pub use euler::EulerIntegrator;
pub use rk4::RK4Integrator;

/// Supplies the time derivative of a system's state
pub trait DynamicalEquation {
    /// Dimension of the state and of the derivative
    fn dim(&self) -> usize;

    /// Write dx/dt, evaluated at state `x` and time `t`, into `deriv`
    fn time_deriv(&self, x: &DVector<f64>, t: f64, deriv: &mut DVector<f64>) -> Result<()>;
}

/// A numerical solver advancing a state by one fixed step
pub trait Integrator {
    /// The dimension this integrator was built for
    fn dim(&self) -> usize;

    /// Replace `x`, the state at time `t`, with the state at `t + dt`
    fn step(&mut self, x: &mut DVector<f64>, t: f64, eq: &dyn DynamicalEquation, dt: f64)
        -> Result<()>;
}

/// The available integration schemes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IntegratorKind {
    /// First order, one derivative evaluation per step
    Euler,
    /// Classic fourth order Runge-Kutta, four derivative evaluations per step
    #[default]
    RK4,
}

impl IntegratorKind {
    /// Construct an integrator of this kind for states of dimension `n`
    pub fn build(&self, n: usize) -> Result<Box<dyn Integrator>> {
        debug!("building {:?} integrator of dimension {}", self, n);
        Ok(match self {
            IntegratorKind::Euler => Box::new(EulerIntegrator::new(n)?),
            IntegratorKind::RK4 => Box::new(RK4Integrator::new(n)?),
        })
    }
}

/// Both the state and the equation have to match the integrator's dimension
pub(crate) fn check_dims(
    integrator_dim: usize,
    x: &DVector<f64>,
    eq: &dyn DynamicalEquation,
) -> Result<()> {
    if eq.dim() != integrator_dim {
        return Err(common::RcError::dims(
            "dimension of dynamical equation",
            (integrator_dim, 1),
            (eq.dim(), 1),
        ));
    }
    if x.len() != integrator_dim {
        return Err(common::RcError::dims(
            "dimension of system state",
            (integrator_dim, 1),
            (x.len(), 1),
        ));
    }
    Ok(())
}
