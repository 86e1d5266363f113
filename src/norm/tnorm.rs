use super::nan_guard;
use crate::scalar::Scalar;
use serde::{Deserialize, Serialize};

/// A T-norm: used as conjunction (`AND`) in antecedents and as implication
/// when activating consequents. Satisfies associativity, commutativity,
/// monotonicity, and `T(a, 1) = a`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TNorm {
    Minimum,
    AlgebraicProduct,
    BoundedDifference,
    DrasticProduct,
    EinsteinProduct,
    HamacherProduct,
    NilpotentMinimum,
    /// Identity implication: returns the consequent membership unchanged,
    /// used by Takagi-Sugeno-style outputs where the term itself already
    /// encodes the crisp contribution (spec.md calls this "not-applicable").
    NoneNorm,
}

impl TNorm {
    pub fn apply(&self, a: Scalar, b: Scalar) -> Scalar {
        if let Some(nan) = nan_guard(a, b) {
            return nan;
        }
        match self {
            TNorm::Minimum => a.min(b),
            TNorm::AlgebraicProduct => a * b,
            TNorm::BoundedDifference => (a + b - 1.0).max(0.0),
            TNorm::DrasticProduct => {
                if b == 1.0 {
                    a
                } else if a == 1.0 {
                    b
                } else {
                    0.0
                }
            }
            TNorm::EinsteinProduct => (a * b) / (2.0 - (a + b - a * b)),
            TNorm::HamacherProduct => {
                if a == 0.0 && b == 0.0 {
                    0.0
                } else {
                    (a * b) / (a + b - a * b)
                }
            }
            TNorm::NilpotentMinimum => {
                if a + b > 1.0 {
                    a.min(b)
                } else {
                    0.0
                }
            }
            TNorm::NoneNorm => b,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            TNorm::Minimum => "Minimum",
            TNorm::AlgebraicProduct => "AlgebraicProduct",
            TNorm::BoundedDifference => "BoundedDifference",
            TNorm::DrasticProduct => "DrasticProduct",
            TNorm::EinsteinProduct => "EinsteinProduct",
            TNorm::HamacherProduct => "HamacherProduct",
            TNorm::NilpotentMinimum => "NilpotentMinimum",
            TNorm::NoneNorm => "NoneNorm",
        }
    }
}
