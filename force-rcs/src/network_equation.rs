use common::{check_output_len, RcError, Result, SharedFeedback, SharedInput};
use nalgebra::{DMatrix, DVector};
use vector_ode::DynamicalEquation;

/// The network dynamics
/// dx/dt = (-x + W·tanh(x) + input(t) + feedback(tanh(x), t)) / τ
///
/// Borrows the connectivity and the wired streams of a reservoir for the
/// duration of one integration step. An absent stream means that term is off.
pub(crate) struct NetworkEquation<'a> {
    w: &'a DMatrix<f64>,
    tau: f64,
    input: Option<&'a SharedInput>,
    feedback: Option<&'a SharedFeedback>,
}

impl<'a> NetworkEquation<'a> {
    pub(crate) fn new(
        w: &'a DMatrix<f64>,
        tau: f64,
        input: Option<&'a SharedInput>,
        feedback: Option<&'a SharedFeedback>,
    ) -> Self {
        Self {
            w,
            tau,
            input,
            feedback,
        }
    }
}

impl DynamicalEquation for NetworkEquation<'_> {
    #[inline(always)]
    fn dim(&self) -> usize {
        self.w.nrows()
    }

    fn time_deriv(&self, x: &DVector<f64>, t: f64, deriv: &mut DVector<f64>) -> Result<()> {
        let n = self.dim();
        if x.len() != n {
            return Err(RcError::dims("network state", (n, 1), (x.len(), 1)));
        }
        check_output_len("network derivative", n, deriv)?;

        // firing rates of the candidate state
        let rate = x.map(f64::tanh);
        // recurrent drive
        deriv.gemv(1.0, self.w, &rate, 0.0);

        if let Some(input) = self.input {
            let mut ext = DVector::zeros(n);
            input.borrow().get_input(t, &mut ext)?;
            *deriv += &ext;
        }
        if let Some(feedback) = self.feedback {
            let mut fb = DVector::zeros(n);
            feedback.borrow().get_feedback(&rate, t, &mut fb)?;
            *deriv += &fb;
        }

        // leak
        *deriv -= x;
        *deriv /= self.tau;

        Ok(())
    }
}
