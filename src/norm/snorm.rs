use super::nan_guard;
use crate::scalar::Scalar;
use serde::{Deserialize, Serialize};

/// An S-norm: used as disjunction (`OR`) in antecedents and as the
/// aggregation operator combining activated consequents. Satisfies
/// associativity, commutativity, monotonicity, and `S(a, 0) = a`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SNorm {
    Maximum,
    AlgebraicSum,
    BoundedSum,
    DrasticSum,
    EinsteinSum,
    HamacherSum,
    NilpotentMaximum,
    /// `(a + b) / max(1, a + b)` — the binary restriction of the Σ/max(1,Σ)
    /// family used when aggregating more than two activations pairwise.
    NormalizedSum,
    /// `a + b`, unbounded — the binary restriction of plain Σ.
    UnboundedSum,
}

impl SNorm {
    pub fn apply(&self, a: Scalar, b: Scalar) -> Scalar {
        if let Some(nan) = nan_guard(a, b) {
            return nan;
        }
        match self {
            SNorm::Maximum => a.max(b),
            SNorm::AlgebraicSum => a + b - a * b,
            SNorm::BoundedSum => (a + b).min(1.0),
            SNorm::DrasticSum => {
                if a == 0.0 {
                    b
                } else if b == 0.0 {
                    a
                } else {
                    1.0
                }
            }
            SNorm::EinsteinSum => (a + b) / (1.0 + a * b),
            SNorm::HamacherSum => {
                if a == 1.0 && b == 1.0 {
                    1.0
                } else {
                    (a + b - 2.0 * a * b) / (1.0 - a * b)
                }
            }
            SNorm::NilpotentMaximum => {
                if a + b < 1.0 {
                    a.max(b)
                } else {
                    1.0
                }
            }
            SNorm::NormalizedSum => (a + b) / (a + b).max(1.0),
            SNorm::UnboundedSum => a + b,
        }
    }

    /// Folds a sequence of degrees with this S-norm, matching how
    /// `Aggregated::membership` reduces over many activated terms.
    pub fn reduce(&self, values: impl IntoIterator<Item = Scalar>) -> Scalar {
        let mut acc: Option<Scalar> = None;
        for v in values {
            acc = Some(match acc {
                None => v,
                Some(a) => self.apply(a, v),
            });
        }
        acc.unwrap_or(0.0)
    }

    pub fn name(&self) -> &'static str {
        match self {
            SNorm::Maximum => "Maximum",
            SNorm::AlgebraicSum => "AlgebraicSum",
            SNorm::BoundedSum => "BoundedSum",
            SNorm::DrasticSum => "DrasticSum",
            SNorm::EinsteinSum => "EinsteinSum",
            SNorm::HamacherSum => "HamacherSum",
            SNorm::NilpotentMaximum => "NilpotentMaximum",
            SNorm::NormalizedSum => "NormalizedSum",
            SNorm::UnboundedSum => "UnboundedSum",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VARIANTS: [SNorm; 9] = [
        SNorm::Maximum,
        SNorm::AlgebraicSum,
        SNorm::BoundedSum,
        SNorm::DrasticSum,
        SNorm::EinsteinSum,
        SNorm::HamacherSum,
        SNorm::NilpotentMaximum,
        SNorm::NormalizedSum,
        SNorm::UnboundedSum,
    ];

    #[test]
    fn identity_law() {
        for norm in VARIANTS {
            for tenths in 0..=10 {
                let a = tenths as f64 / 10.0;
                assert!(
                    (norm.apply(a, 0.0) - a).abs() < 1e-9,
                    "{:?} failed S(a,0)=a at a={a}",
                    norm
                );
            }
        }
    }

    #[test]
    fn commutative() {
        for norm in VARIANTS {
            assert!((norm.apply(0.3, 0.7) - norm.apply(0.7, 0.3)).abs() < 1e-9);
        }
    }

    #[test]
    fn nan_propagates() {
        for norm in VARIANTS {
            assert!(norm.apply(f64::NAN, 0.5).is_nan());
        }
    }

    #[test]
    fn monotonic() {
        for norm in VARIANTS {
            let lo = norm.apply(0.2, 0.5);
            let hi = norm.apply(0.6, 0.5);
            assert!(lo <= hi + 1e-9, "{:?} not monotonic", norm);
        }
    }

    #[test]
    fn reduce_matches_fold() {
        let values = [0.2, 0.5, 0.9];
        let reduced = SNorm::Maximum.reduce(values);
        assert!((reduced - 0.9).abs() < 1e-9);
    }
}
