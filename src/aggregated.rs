//! The fuzzy set accumulated in an output variable across rule activations.

use crate::activated::Activated;
use crate::error::Result;
use crate::norm::SNorm;
use crate::scalar::Scalar;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Aggregated {
    pub name: String,
    pub min: Scalar,
    pub max: Scalar,
    pub aggregation: Option<SNorm>,
    pub terms: Vec<Activated>,
}

impl Aggregated {
    pub fn new(name: impl Into<String>, min: Scalar, max: Scalar, aggregation: Option<SNorm>) -> Self {
        Self {
            name: name.into(),
            min,
            max,
            aggregation,
            terms: Vec::new(),
        }
    }

    pub fn clear(&mut self) {
        self.terms.clear();
    }

    pub fn push(&mut self, activated: Activated) {
        self.terms.push(activated);
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Sum of activation degrees of entries whose term matches `term_name`,
    /// used when an output variable's term appears in an antecedent
    /// (spec.md 4.4).
    pub fn activation_degree(&self, term_name: &str) -> Scalar {
        self.terms
            .iter()
            .filter(|a| a.term.name == term_name)
            .map(|a| a.degree)
            .sum()
    }

    /// Pointwise membership of the whole aggregate at `x`, combining every
    /// activated entry with the aggregation S-norm. Used by integral
    /// defuzzifiers to sample the aggregate curve.
    ///
    /// When no aggregation operator is configured, falls back to the first
    /// activated entry's membership (rule-based selection rather than a
    /// pointwise combination), matching spec.md 3's description.
    pub fn membership(&self, x: Scalar, inputs: &IndexMap<String, Scalar>) -> Result<Scalar> {
        match &self.aggregation {
            Some(norm) => {
                let mut acc: Option<Scalar> = None;
                for activated in &self.terms {
                    let mu = activated.membership(x, inputs)?;
                    acc = Some(match acc {
                        None => mu,
                        Some(a) => norm.apply(a, mu),
                    });
                }
                Ok(acc.unwrap_or(0.0))
            }
            None => match self.terms.first() {
                Some(activated) => activated.membership(x, inputs),
                None => Ok(0.0),
            },
        }
    }

    /// Pointwise membership restricted to entries for a single term name.
    pub fn membership_of_term(
        &self,
        term_name: &str,
        x: Scalar,
        inputs: &IndexMap<String, Scalar>,
    ) -> Result<Scalar> {
        let matching: Vec<&Activated> = self.terms.iter().filter(|a| a.term.name == term_name).collect();
        match &self.aggregation {
            Some(norm) => {
                let mut acc: Option<Scalar> = None;
                for activated in matching {
                    let mu = activated.membership(x, inputs)?;
                    acc = Some(match acc {
                        None => mu,
                        Some(a) => norm.apply(a, mu),
                    });
                }
                Ok(acc.unwrap_or(0.0))
            }
            None => match matching.first() {
                Some(activated) => activated.membership(x, inputs),
                None => Ok(0.0),
            },
        }
    }
}
