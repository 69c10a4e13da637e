use nalgebra::{Const, DMatrix, Dyn, MatrixView};

use super::{LinReg, LinRegError};

/// Ordinary least squares, solved through the singular value decomposition
/// of the design matrix.
///
/// Singular values below `rcond * sigma_max` are treated as zero, so rank
/// deficient and under-determined designs yield the minimum norm solution
/// instead of failing on a non-invertible system.
#[derive(Debug, Clone, Default)]
pub struct LeastSquares {
    /// Relative cutoff for small singular values.
    /// `None` uses `max(rows, cols) * f64::EPSILON`
    pub rcond: Option<f64>,
}

impl LinReg for LeastSquares {
    fn fit_readout<'a>(
        &self,
        design: &'a MatrixView<'a, f64, Dyn, Dyn, Const<1>, Dyn>,
        targets: &'a MatrixView<'a, f64, Dyn, Dyn, Const<1>, Dyn>,
    ) -> Result<DMatrix<f64>, LinRegError> {
        if design.nrows() != targets.nrows() {
            return Err(LinRegError::DimensionMismatch {
                design_rows: design.nrows(),
                target_rows: targets.nrows(),
            });
        }
        if design.nrows() == 0 || design.ncols() == 0 {
            return Err(LinRegError::Empty);
        }

        let svd = design.clone_owned().svd(true, true);
        let sigma_max = svd.singular_values.max();
        let rcond = self
            .rcond
            .unwrap_or_else(|| design.nrows().max(design.ncols()) as f64 * f64::EPSILON);
        let eps = rcond * sigma_max;
        let rank = svd.singular_values.iter().filter(|s| **s > eps).count();
        debug!(
            "least squares fit of design ({}, {}) onto targets ({}, {}), rank: {}",
            design.nrows(),
            design.ncols(),
            targets.nrows(),
            targets.ncols(),
            rank
        );

        svd.solve(targets, eps).map_err(LinRegError::Solver)
    }
}
