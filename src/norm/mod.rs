//! T-norms (conjunction/implication) and S-norms (disjunction/aggregation).
//!
//! Every variant is pure, deterministic, and NaN-preserving: a NaN operand
//! makes the result NaN rather than being silently treated as zero.

mod snorm;
mod tnorm;

pub use snorm::SNorm;
pub use tnorm::TNorm;

/// Shared NaN short-circuit used by every norm implementation.
#[inline]
fn nan_guard(a: f64, b: f64) -> Option<f64> {
    if a.is_nan() || b.is_nan() {
        Some(f64::NAN)
    } else {
        None
    }
}
