//! Numeric primitives shared across the engine: the scalar type, NaN-safe
//! comparisons with tolerance, clamping, and the fuzzification text form.

use serde::{Deserialize, Serialize};

/// An IEEE-754 double. NaN is a meaningful value here (it means "undefined
/// membership"), never silently coerced to zero.
pub type Scalar = f64;

pub const NAN: Scalar = f64::NAN;

/// Per-engine configuration: tolerance for approximate equality, default
/// integration resolution for integral defuzzifiers, and decimal precision
/// for textual formatting. No global mutable state backs this — every
/// component that needs it receives its own copy or a reference.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    pub tolerance: Scalar,
    pub resolution: usize,
    pub precision: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            tolerance: 1e-3,
            resolution: 100,
            precision: 3,
        }
    }
}

/// Approximate equality within `tolerance`. Two NaNs are never equal, per
/// IEEE-754 semantics, matching `f64`'s own `PartialEq`.
pub fn approx_eq(a: Scalar, b: Scalar, tolerance: Scalar) -> bool {
    if a.is_nan() || b.is_nan() {
        return false;
    }
    (a - b).abs() <= tolerance
}

pub fn is_nan(x: Scalar) -> bool {
    x.is_nan()
}

pub fn is_finite(x: Scalar) -> bool {
    x.is_finite()
}

/// Clamps `x` into `[min, max]`. NaN passes through unchanged, since a clamp
/// cannot make an undefined value defined.
pub fn clamp(x: Scalar, min: Scalar, max: Scalar) -> Scalar {
    if x.is_nan() {
        return x;
    }
    x.max(min).min(max)
}

/// Formats a scalar with the configured decimal precision, matching the
/// textual forms used by `Variable::fuzzify` and `Aggregated::fuzzy_value`.
/// NaN renders as `"nan"`.
pub fn format_scalar(x: Scalar, precision: usize) -> String {
    if x.is_nan() {
        "nan".to_string()
    } else {
        format!("{:.*}", precision, x)
    }
}

/// Renders a fuzzy value as `"mu1/term1 + mu2/term2 - mu3/term3 ..."`
/// (spec.md 6): each pair after the first is joined by `+` or `-` chosen by
/// the sign of its own mu (NaN always uses `+`), and the printed magnitude
/// is the absolute value so the sign lives only in the separator.
pub fn format_fuzzy_value<'a>(pairs: impl IntoIterator<Item = (Scalar, &'a str)>, precision: usize) -> String {
    let mut result = String::new();
    for (mu, name) in pairs {
        if result.is_empty() {
            // The first term carries its own sign in the printed number, same as every
            // later term's magnitude does once its separator sign is stripped off.
            let value = format_scalar(mu, precision);
            result.push_str(&format!("{value}/{name}"));
        } else {
            let sign = if mu.is_nan() || mu >= 0.0 { "+" } else { "-" };
            let magnitude = format_scalar(mu.abs(), precision);
            result.push_str(&format!(" {sign} {magnitude}/{name}"));
        }
    }
    result
}
