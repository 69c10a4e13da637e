use thiserror::Error;

/// Failure modes of a linear regression fit
#[derive(Debug, Error, Clone, PartialEq)]
pub enum LinRegError {
    #[error("design has {design_rows} rows but targets have {target_rows}")]
    DimensionMismatch { design_rows: usize, target_rows: usize },

    #[error("cannot fit a readout without any observations")]
    Empty,

    #[error("normal equations are singular, increase the regularization coefficient")]
    Singular,

    #[error("least squares solver failed: {0}")]
    Solver(&'static str),
}
