//! Rate model reservoirs with linear readouts, trained either in batch
//! (clamped feedback and least squares) or online (FORCE learning with
//! recursive least squares).

#[macro_use]
extern crate log;

mod learning_module_regression;
mod network_equation;
mod params;
mod projected_input;
mod readout;
mod readout_clamped_fb;
mod readout_rls;
mod reservoir;
mod weights;

pub use learning_module_regression::{LearningModuleRegression, RegressionReport};
pub use params::{ReadoutParams, ReservoirParams};
pub use projected_input::ProjectedInput;
pub use readout::{Readout, ReadoutUnit, ReadoutWeights};
pub use readout_clamped_fb::ReadoutClampedFB;
pub use readout_rls::ReadoutRLS;
pub use reservoir::Reservoir;
pub use vector_ode::IntegratorKind;
