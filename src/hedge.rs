//! Unary hedge operators applied to antecedent/consequent degrees.

use crate::scalar::Scalar;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Hedge {
    Not,
    Very,
    Somewhat,
    Extremely,
    Seldom,
    Any,
    Unset,
}

impl Hedge {
    pub fn apply(&self, x: Scalar) -> Scalar {
        match self {
            Hedge::Not => 1.0 - x,
            Hedge::Very => x * x,
            Hedge::Somewhat => x.sqrt(),
            Hedge::Extremely => {
                if x < 0.5 {
                    2.0 * x * x
                } else {
                    1.0 - 2.0 * (1.0 - x) * (1.0 - x)
                }
            }
            Hedge::Seldom => {
                if x <= 0.5 {
                    (x / 2.0).sqrt()
                } else {
                    1.0 - ((1.0 - x) / 2.0).sqrt()
                }
            }
            Hedge::Any => 1.0,
            Hedge::Unset => x,
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "not" => Some(Hedge::Not),
            "very" => Some(Hedge::Very),
            "somewhat" => Some(Hedge::Somewhat),
            "extremely" => Some(Hedge::Extremely),
            "seldom" => Some(Hedge::Seldom),
            "any" => Some(Hedge::Any),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Hedge::Not => "not",
            Hedge::Very => "very",
            Hedge::Somewhat => "somewhat",
            Hedge::Extremely => "extremely",
            Hedge::Seldom => "seldom",
            Hedge::Any => "any",
            Hedge::Unset => "unset",
        }
    }
}

/// Applies a chain of hedges right-to-left (innermost first), matching
/// antecedent evaluation: `H1(H2(...Hk(mu)...))`.
pub fn apply_chain_antecedent(hedges: &[Hedge], mu: Scalar) -> Scalar {
    hedges.iter().rev().fold(mu, |acc, h| h.apply(acc))
}

/// Applies a chain of hedges left-to-right, matching consequent activation
/// degree modification per spec.md 4.5.
pub fn apply_chain_consequent(hedges: &[Hedge], degree: Scalar) -> Scalar {
    hedges.iter().fold(degree, |acc, h| h.apply(acc))
}
