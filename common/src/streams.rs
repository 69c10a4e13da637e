use std::{cell::RefCell, rc::Rc};

use nalgebra::DVector;

use crate::{RcError, Result};

/// Supplies an exogenous drive vector as a function of time
pub trait InputStream {
    /// Number of values written by `get_input`
    fn size(&self) -> usize;

    /// Write the input at time `t` into `out`, which has to hold `size()` values
    fn get_input(&self, t: f64, out: &mut DVector<f64>) -> Result<()>;
}

/// Supplies the feedback injected into a reservoir, computed from its firing rates
pub trait FeedbackSource {
    /// Number of feedback values, equal to the size of the reservoir fed
    fn fb_size(&self) -> usize;

    /// Write the feedback for the firing rates `rate` at time `t` into `out`
    fn get_feedback(&self, rate: &DVector<f64>, t: f64, out: &mut DVector<f64>) -> Result<()>;
}

/// An input stream shared between the simulation driver and its consumers
pub type SharedInput = Rc<RefCell<dyn InputStream>>;

/// A feedback source shared between the simulation driver and a reservoir
pub type SharedFeedback = Rc<RefCell<dyn FeedbackSource>>;

/// Ensure an output buffer has room for exactly `expected` values
#[inline]
pub fn check_output_len(context: &'static str, expected: usize, out: &DVector<f64>) -> Result<()> {
    if out.len() != expected {
        return Err(RcError::dims(context, (expected, 1), (out.len(), 1)));
    }
    Ok(())
}
