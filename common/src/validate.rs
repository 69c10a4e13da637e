//! Checks applied to construction parameters before anything is allocated

use crate::{RcError, Result};

/// Sizes have to be at least one
pub fn positive_size(name: &'static str, n: usize) -> Result<()> {
    if n == 0 {
        return Err(RcError::invalid(name, "must be greater than 0"));
    }
    Ok(())
}

/// Probabilities have to lie in [0, 1]
pub fn probability(name: &'static str, p: f64) -> Result<()> {
    if !(0.0..=1.0).contains(&p) {
        return Err(RcError::invalid(name, format!("must be in [0, 1], got {}", p)));
    }
    Ok(())
}

/// Rejects NaN and infinities
pub fn finite(name: &'static str, v: f64) -> Result<()> {
    if !v.is_finite() {
        return Err(RcError::invalid(name, format!("must be a finite number, got {}", v)));
    }
    Ok(())
}

/// Finite and strictly greater than zero
pub fn positive_finite(name: &'static str, v: f64) -> Result<()> {
    if !v.is_finite() || v <= 0.0 {
        return Err(RcError::invalid(name, format!("must be a positive finite number, got {}", v)));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation() {
        assert!(positive_size("n", 1).is_ok());
        assert!(positive_size("n", 0).is_err());

        assert!(probability("p", 0.0).is_ok());
        assert!(probability("p", 1.0).is_ok());
        assert!(probability("p", 1.0001).is_err());
        assert!(probability("p", f64::NAN).is_err());

        assert!(finite("g", -3.0).is_ok());
        assert!(finite("g", f64::INFINITY).is_err());

        assert!(positive_finite("tau", 0.01).is_ok());
        assert!(positive_finite("tau", 0.0).is_err());
        assert!(positive_finite("tau", f64::NAN).is_err());
    }
}
