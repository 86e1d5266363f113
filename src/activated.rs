//! An activated term: a consequent term paired with an antecedent-derived
//! degree and the implication operator that clips/scales it.

use crate::error::Result;
use crate::norm::TNorm;
use crate::scalar::Scalar;
use crate::term::Term;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Activated {
    pub term: Arc<Term>,
    pub degree: Scalar,
    pub implication: TNorm,
}

impl Activated {
    pub fn new(term: Arc<Term>, degree: Scalar, implication: TNorm) -> Self {
        Self { term, degree, implication }
    }

    /// `membership(x) = implication(degree, term.membership(x)) * height`.
    pub fn membership(&self, x: Scalar, inputs: &IndexMap<String, Scalar>) -> Result<Scalar> {
        let raw = self.term.membership(x, inputs)?;
        Ok(self.implication.apply(self.degree, raw) * self.term.height)
    }
}
