use crate::aggregated::Aggregated;
use crate::error::Result;
use crate::norm::TNorm;
use crate::scalar::Scalar;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WeightedMode {
    /// Picks `Take` when the entry's implication is `NoneNorm` (already a
    /// Takagi-Sugeno pass-through), `TakeAndMultiply` otherwise.
    Automatic,
    /// Uses the term's raw value `z_i`, unmodified by the implication norm.
    Take,
    /// Replaces `z_i` with `implication(w_i, z_i)` before weighting.
    TakeAndMultiply,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WeightedDefuzzifier {
    WeightedAverage { mode: WeightedMode },
    WeightedSum { mode: WeightedMode },
}

impl WeightedDefuzzifier {
    pub fn defuzzify(&self, aggregated: &Aggregated, inputs: &IndexMap<String, Scalar>) -> Result<Scalar> {
        if aggregated.is_empty() {
            return Ok(Scalar::NAN);
        }
        let mode = match self {
            WeightedDefuzzifier::WeightedAverage { mode } | WeightedDefuzzifier::WeightedSum { mode } => *mode,
        };

        let mut numerator = 0.0;
        let mut denominator = 0.0;
        for activated in &aggregated.terms {
            let wi = activated.degree;
            let zi = if activated.term.is_parameter_only() {
                activated.term.membership(Scalar::NAN, inputs)?
            } else {
                activated.term.centroid()
            };
            let effective_mode = match mode {
                WeightedMode::Automatic => {
                    if activated.implication == TNorm::NoneNorm {
                        WeightedMode::Take
                    } else {
                        WeightedMode::TakeAndMultiply
                    }
                }
                other => other,
            };
            let zi_used = match effective_mode {
                WeightedMode::Take => zi,
                WeightedMode::TakeAndMultiply => activated.implication.apply(wi, zi),
                WeightedMode::Automatic => unreachable!("resolved above"),
            };
            numerator += wi * zi_used;
            denominator += wi;
        }

        match self {
            WeightedDefuzzifier::WeightedAverage { .. } => {
                if denominator.abs() < 1e-12 {
                    Ok(Scalar::NAN)
                } else {
                    Ok(numerator / denominator)
                }
            }
            WeightedDefuzzifier::WeightedSum { .. } => Ok(numerator),
        }
    }
}
