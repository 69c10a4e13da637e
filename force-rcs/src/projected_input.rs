use common::{check_output_len, validate, InputStream, RcError, Result, SharedInput};
use nalgebra::{DMatrix, DVector};
use nanorand::WyRand;

use crate::weights::sparse_uniform;

/// Projects a K dimensional input stream onto the N neurons of a reservoir
/// through a fixed random matrix, so a low dimensional signal can drive it.
pub struct ProjectedInput {
    source: SharedInput,
    weights: DMatrix<f64>,
}

impl ProjectedInput {
    /// Draw an N x K projection with entries uniform on [-scaling, scaling],
    /// each kept with probability `sparsity`
    pub fn new(
        source: SharedInput,
        n: usize,
        sparsity: f64,
        scaling: f64,
        rng: &mut WyRand,
    ) -> Result<Self> {
        validate::positive_size("n", n)?;
        validate::probability("sparsity", sparsity)?;
        validate::finite("scaling", scaling)?;

        let k = source.borrow().size();
        let weights = sparse_uniform(n, k, sparsity, scaling, rng);

        Ok(Self { source, weights })
    }

    /// Use a given projection, which has to have as many columns as `source` has values
    pub fn from_weights(source: SharedInput, weights: DMatrix<f64>) -> Result<Self> {
        let k = source.borrow().size();
        if weights.ncols() != k || weights.nrows() == 0 {
            return Err(RcError::dims(
                "ProjectedInput::from_weights",
                (weights.nrows().max(1), k),
                weights.shape(),
            ));
        }

        Ok(Self { source, weights })
    }

    #[inline(always)]
    pub fn weights(&self) -> &DMatrix<f64> {
        &self.weights
    }
}

impl InputStream for ProjectedInput {
    #[inline(always)]
    fn size(&self) -> usize {
        self.weights.nrows()
    }

    fn get_input(&self, t: f64, out: &mut DVector<f64>) -> Result<()> {
        check_output_len("ProjectedInput::get_input", self.size(), out)?;

        let mut raw = DVector::zeros(self.weights.ncols());
        self.source.borrow().get_input(t, &mut raw)?;
        out.gemv(1.0, &self.weights, &raw, 0.0);

        Ok(())
    }
}
