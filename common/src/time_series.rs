use nalgebra::DMatrix;

use crate::{validate, RcError, Result};

/// Append only record of fixed width frames, one frame per time point.
/// Used to collect training data, to record signals for replay and as the
/// data source of the plotting collaborator.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeries {
    n_series: usize,
    // row major, frame after frame
    data: Vec<f64>,
}

impl TimeSeries {
    /// Create an empty series of frames which are `n_series` values wide
    pub fn new(n_series: usize) -> Result<Self> {
        validate::positive_size("n_series", n_series)?;

        Ok(Self {
            n_series,
            data: Vec::new(),
        })
    }

    /// Number of recorded time points
    #[inline(always)]
    pub fn n_t(&self) -> usize {
        self.data.len() / self.n_series
    }

    /// Width of each frame
    #[inline(always)]
    pub fn n_series(&self) -> usize {
        self.n_series
    }

    /// True if nothing has been recorded yet
    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Append one frame.
    /// Only the first `n_series` values of `x` are stored, extra values are dropped.
    pub fn add_time_point(&mut self, x: &[f64]) -> Result<()> {
        if x.len() < self.n_series {
            return Err(RcError::dims("TimeSeries::add_time_point", (1, self.n_series), (1, x.len())));
        }
        self.data.extend_from_slice(&x[..self.n_series]);

        Ok(())
    }

    /// The frame recorded at index `i`
    pub fn time_point(&self, i: usize) -> Result<&[f64]> {
        if i >= self.n_t() {
            return Err(RcError::IndexOutOfBounds {
                index: i,
                len: self.n_t(),
            });
        }
        let start = i * self.n_series;

        Ok(&self.data[start..start + self.n_series])
    }

    /// Iterate over all frames in recording order
    pub fn iter(&self) -> impl Iterator<Item = &[f64]> + '_ {
        self.data.chunks_exact(self.n_series)
    }

    /// The full history as a `n_t x n_series` matrix, one frame per row
    pub fn to_matrix(&self) -> DMatrix<f64> {
        DMatrix::from_row_slice(self.n_t(), self.n_series, &self.data)
    }
}
