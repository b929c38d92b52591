use crate::EbError;

pub fn ensure_finite(v: f64, what: &'static str) -> Result<f64, EbError> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(EbError::NonFinite { what, value: v })
    }
}

/// Weighted mean of `(weight, value)` pairs, `None` when the weights sum to zero.
pub fn weighted_mean(pairs: &[(f64, f64)]) -> Option<f64> {
    let total: f64 = pairs.iter().map(|(w, _)| w).sum();
    if total == 0.0 {
        return None;
    }
    Some(pairs.iter().map(|(w, v)| w * v).sum::<f64>() / total)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ensure_finite_detects_nan() {
        let err = ensure_finite(f64::NAN, "temperature").unwrap_err();
        assert!(err.to_string().contains("Non-finite"));
        assert_eq!(ensure_finite(21.5, "temperature").unwrap(), 21.5);
    }

    #[test]
    fn weighted_mean_handles_zero_weight() {
        assert_eq!(weighted_mean(&[(0.0, 10.0), (0.0, 20.0)]), None);
        assert_eq!(weighted_mean(&[(1.0, 10.0), (3.0, 20.0)]), Some(17.5));
    }
}
