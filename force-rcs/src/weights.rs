use std::f64::consts::PI;

use nalgebra::{DMatrix, Dim, Matrix};
use nanorand::{Rng, WyRand};

/// Standard normal sample, Box-Muller transform of two uniform draws
pub(crate) fn gaussian(rng: &mut WyRand) -> f64 {
    // 1 - u lies in (0, 1], keeping ln finite
    let u1 = 1.0 - rng.generate::<f64>();
    let u2 = rng.generate::<f64>();
    (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos()
}

/// Gaussian weights with standard deviation `scale`, each entry kept with
/// probability `density`.
/// Every entry consumes the same number of draws, so the stream of random
/// numbers does not depend on which entries survive.
pub(crate) fn sparse_gaussian(
    rows: usize,
    cols: usize,
    density: f64,
    scale: f64,
    rng: &mut WyRand,
) -> DMatrix<f64> {
    Matrix::from_fn_generic(Dim::from_usize(rows), Dim::from_usize(cols), |_, _| {
        let w = gaussian(rng) * scale;
        if rng.generate::<f64>() < density {
            w
        } else {
            0.0
        }
    })
}

/// Uniform weights on [-gain, gain], each entry kept with probability `density`
pub(crate) fn sparse_uniform(
    rows: usize,
    cols: usize,
    density: f64,
    gain: f64,
    rng: &mut WyRand,
) -> DMatrix<f64> {
    Matrix::from_fn_generic(Dim::from_usize(rows), Dim::from_usize(cols), |_, _| {
        let w = (rng.generate::<f64>() * 2.0 - 1.0) * gain;
        if rng.generate::<f64>() < density {
            w
        } else {
            0.0
        }
    })
}
