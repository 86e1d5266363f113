//! Crisp extraction from a fuzzy set: integral defuzzifiers (sample the
//! continuous aggregate curve) and weighted defuzzifiers (operate directly
//! on the activated entries).

mod integral;
mod weighted;

pub use integral::IntegralDefuzzifier;
pub use weighted::{WeightedDefuzzifier, WeightedMode};

use crate::aggregated::Aggregated;
use crate::error::Result;
use crate::scalar::{Scalar, Settings};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Defuzzifier {
    Integral(IntegralDefuzzifier),
    Weighted(WeightedDefuzzifier),
}

impl Defuzzifier {
    pub fn defuzzify(
        &self,
        aggregated: &Aggregated,
        inputs: &IndexMap<String, Scalar>,
        settings: &Settings,
    ) -> Result<Scalar> {
        match self {
            Defuzzifier::Integral(d) => d.defuzzify(aggregated, inputs, settings),
            Defuzzifier::Weighted(d) => d.defuzzify(aggregated, inputs),
        }
    }
}
