//! Common utilities for appliance calculations.

use crate::error::{ApplianceError, ApplianceResult};
use eb_core::numeric::ensure_finite;

/// Flows at or below this are treated as stagnant (l/s)
pub const EPSILON_FLOW: f64 = 1e-12;

/// Ensure a value is finite, returning ApplianceError if not.
pub fn check_finite(value: f64, what: &'static str) -> ApplianceResult<f64> {
    ensure_finite(value, what).map_err(|_| ApplianceError::NonPhysical { what })
}

/// Ensure a parameter is strictly positive.
pub fn check_positive(value: f64, what: &'static str) -> ApplianceResult<f64> {
    if value > 0.0 && value.is_finite() {
        Ok(value)
    } else {
        Err(ApplianceError::InvalidArg { what })
    }
}

pub fn is_flowing(flow: f64) -> bool {
    flow > EPSILON_FLOW
}
