//! Linear regression backends used to fit readout matrices

#[macro_use]
extern crate log;

use nalgebra::{Const, DMatrix, Dyn, MatrixView};

mod error;
mod least_squares;
mod tikhonov_regularization;

pub use error::LinRegError;
pub use least_squares::LeastSquares;
pub use tikhonov_regularization::TikhonovRegularization;

/// Generic way of performing linear regression and fitting the readout matrix
pub trait LinReg: Clone {
    /// Fit a coefficient matrix, mapping each row of the design onto the
    /// same row of the targets
    ///
    /// # Parameters
    /// design: T x N, one observed feature vector per row
    /// targets: T x M, one target vector per row
    ///
    /// # Returns
    /// The N x M matrix `B` minimizing the residual of `design * B ≈ targets`
    fn fit_readout<'a>(
        &self,
        design: &'a MatrixView<'a, f64, Dyn, Dyn, Const<1>, Dyn>,
        targets: &'a MatrixView<'a, f64, Dyn, Dyn, Const<1>, Dyn>,
    ) -> Result<DMatrix<f64>, LinRegError>;
}
