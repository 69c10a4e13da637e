use common::{validate, Result};
use vector_ode::IntegratorKind;

/// The parameters of a rate reservoir
#[derive(Debug, Clone)]
pub struct ReservoirParams {
    /// Number of nodes in the reservoir
    pub size: usize,
    /// Connection probability within the reservoir
    pub sparsity: f64,
    /// Gain of the recurrent connections.
    /// Weights are drawn from a normal distribution scaled by g / sqrt(N * p),
    /// values above 1 make the autonomous network chaotic
    pub gain: f64,
    /// Time constant of the neurons
    pub tau: f64,
    /// Integration step
    pub dt: f64,
    /// Standard deviation of the random initial state
    pub initial_state_scale: f64,
    /// Numerical integration scheme
    pub integrator: IntegratorKind,
}

impl Default for ReservoirParams {
    fn default() -> Self {
        Self {
            size: 1000,
            sparsity: 0.1,
            gain: 1.5,
            tau: 0.01,
            dt: 0.001,
            initial_state_scale: 0.1,
            integrator: IntegratorKind::RK4,
        }
    }
}

impl ReservoirParams {
    /// Reject parameters which do not describe a valid network
    pub fn validate(&self) -> Result<()> {
        validate::positive_size("size", self.size)?;
        validate::probability("sparsity", self.sparsity)?;
        validate::finite("gain", self.gain)?;
        validate::positive_finite("tau", self.tau)?;
        validate::finite("dt", self.dt)?;
        validate::finite("initial_state_scale", self.initial_state_scale)?;

        Ok(())
    }

    /// Standard deviation of the nonzero recurrent weights
    pub(crate) fn weight_scale(&self) -> f64 {
        if self.sparsity > 0.0 {
            self.gain / (self.size as f64 * self.sparsity).sqrt()
        } else {
            0.0
        }
    }
}

/// The parameters shared by every readout variant
#[derive(Debug, Clone)]
pub struct ReadoutParams {
    /// Probability of a readout value feeding back onto a neuron
    pub feedback_sparsity: f64,
    /// Probability of a neuron connecting to a readout unit
    pub readout_sparsity: f64,
    /// Feedback weights are drawn uniformly from [-g, g]
    pub feedback_gain: f64,
}

impl Default for ReadoutParams {
    fn default() -> Self {
        Self {
            feedback_sparsity: 1.0,
            readout_sparsity: 1.0,
            feedback_gain: 1.0,
        }
    }
}

impl ReadoutParams {
    /// Reject parameters which do not describe a valid readout
    pub fn validate(&self) -> Result<()> {
        validate::probability("feedback_sparsity", self.feedback_sparsity)?;
        validate::probability("readout_sparsity", self.readout_sparsity)?;
        // scales the readout weights by 1 / sqrt(N * p_z)
        if self.readout_sparsity == 0.0 {
            return Err(common::RcError::invalid("readout_sparsity", "must be greater than 0"));
        }
        validate::finite("feedback_gain", self.feedback_gain)?;

        Ok(())
    }
}
