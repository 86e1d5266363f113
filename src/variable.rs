//! Input and output linguistic variables.
//!
//! Grounded in `original_source/fuzzylite/variable.py`: term storage order
//! (insertion order, not sorted), the `lock_previous -> default_value ->
//! lock_range` precedence `OutputVariable.defuzzify()` resolves an empty
//! aggregate with, and the `fuzzify(x)` text form.

use crate::aggregated::Aggregated;
use crate::defuzzifier::Defuzzifier;
use crate::error::Result;
use crate::scalar::{self, Scalar, Settings};
use crate::term::Term;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Variable {
    pub name: String,
    pub description: String,
    pub min: Scalar,
    pub max: Scalar,
    pub enabled: bool,
    pub terms: IndexMap<String, Term>,
}

impl Variable {
    pub fn new(name: impl Into<String>, min: Scalar, max: Scalar) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            min,
            max,
            enabled: true,
            terms: IndexMap::new(),
        }
    }

    pub fn add_term(&mut self, term: Term) {
        self.terms.insert(term.name.clone(), term);
    }

    pub fn term(&self, name: &str) -> Option<&Term> {
        self.terms.get(name)
    }

    pub fn range(&self) -> (Scalar, Scalar) {
        (self.min, self.max)
    }

    pub fn set_range(&mut self, min: Scalar, max: Scalar) {
        self.min = min;
        self.max = max;
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputVariable {
    pub base: Variable,
    pub value: Scalar,
    pub lock_range: bool,
}

impl InputVariable {
    pub fn new(name: impl Into<String>, min: Scalar, max: Scalar) -> Self {
        Self {
            base: Variable::new(name, min, max),
            value: Scalar::NAN,
            lock_range: false,
        }
    }

    pub fn range(&self) -> (Scalar, Scalar) {
        self.base.range()
    }

    pub fn set_range(&mut self, min: Scalar, max: Scalar) {
        self.base.set_range(min, max);
    }

    pub fn set_value(&mut self, x: Scalar) {
        self.value = if self.lock_range {
            scalar::clamp(x, self.base.min, self.base.max)
        } else {
            x
        };
    }

    /// Degree of the highest-membership term at the variable's current
    /// value, used for diagnostics and `InputVariable::fuzzify` callers that
    /// only need the winning term.
    pub fn highest_membership(&self, x: Scalar) -> (Scalar, Option<&Term>) {
        let mut best: Option<(Scalar, &Term)> = None;
        for term in self.base.terms.values() {
            let mu = term.membership_of(x);
            if mu.is_nan() {
                continue;
            }
            let replace = match best {
                Some((bm, _)) => mu > bm,
                None => true,
            };
            if replace {
                best = Some((mu, term));
            }
        }
        match best {
            Some((mu, term)) => (mu, Some(term)),
            None => (Scalar::NAN, None),
        }
    }

    /// `"term1:m1 + term2:m2 + ..."`, the textual fuzzification of `x`
    /// across every term, in declaration order.
    pub fn fuzzify(&self, x: Scalar, precision: usize) -> String {
        scalar::format_fuzzy_value(
            self.base.terms.values().map(|t| (t.membership_of(x), t.name.as_str())),
            precision,
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputVariable {
    pub base: Variable,
    pub value: Scalar,
    pub previous_value: Scalar,
    pub default_value: Scalar,
    pub lock_previous: bool,
    pub lock_range: bool,
    pub defuzzifier: Option<Defuzzifier>,
    pub aggregated: Aggregated,
}

impl OutputVariable {
    pub fn new(name: impl Into<String>, min: Scalar, max: Scalar) -> Self {
        let name = name.into();
        Self {
            aggregated: Aggregated::new(name.clone(), min, max, None),
            base: Variable::new(name, min, max),
            value: Scalar::NAN,
            previous_value: Scalar::NAN,
            default_value: Scalar::NAN,
            lock_previous: false,
            lock_range: false,
            defuzzifier: None,
        }
    }

    /// Writes the range through to both the variable's own `base.min/max`
    /// and the embedded `Aggregated`'s mirrored copy, keeping the "shared
    /// name/range" spec.md's design notes describe in sync rather than
    /// letting the two drift apart.
    pub fn set_range(&mut self, min: Scalar, max: Scalar) {
        self.base.set_range(min, max);
        self.aggregated.min = min;
        self.aggregated.max = max;
    }

    pub fn range(&self) -> (Scalar, Scalar) {
        self.base.range()
    }

    /// Snapshots the current value as `previous_value` (if finite — an
    /// undefined prior value leaves the last-known `previous_value`
    /// untouched, per spec.md 4.8), then empties the aggregated set and
    /// marks the output undefined until the next `defuzzify()` call. Called
    /// once per output variable at the start of every `Engine::process()`
    /// cycle.
    pub fn clear(&mut self) {
        if self.value.is_finite() {
            self.previous_value = self.value;
        }
        self.aggregated.clear();
        self.value = Scalar::NAN;
    }

    /// Resolves the crisp output from the aggregated fuzzy set and applies
    /// the finalization precedence of spec.md 4.8: a raw result that is
    /// NaN/infinite (whether from an empty aggregate or a degenerate
    /// defuzzification, e.g. a zero-denominator weighted average) falls back
    /// to `previous_value` under `lock_previous`, then to `default_value`;
    /// `lock_range` clamps whatever value results.
    pub fn defuzzify(&mut self, inputs: &IndexMap<String, Scalar>, settings: &Settings) -> Result<()> {
        let mut result = if self.aggregated.is_empty() {
            Scalar::NAN
        } else {
            let defuzzifier = match &self.defuzzifier {
                Some(d) => d,
                None => {
                    return Err(crate::state_error!(format!(
                        "output variable '{}' has no defuzzifier configured",
                        self.base.name
                    )))
                }
            };
            defuzzifier.defuzzify(&self.aggregated, inputs, settings)?
        };

        if !result.is_finite() {
            if self.lock_previous && self.previous_value.is_finite() {
                result = self.previous_value;
            } else if self.default_value.is_finite() {
                result = self.default_value;
            }
        }
        if self.lock_range {
            result = scalar::clamp(result, self.base.min, self.base.max);
        }
        self.value = result;
        Ok(())
    }

    /// `"term1:w1 + term2:w2 + ..."` over the entries currently aggregated,
    /// mirroring `InputVariable::fuzzify`'s textual form but over activation
    /// degrees rather than a queried crisp value.
    pub fn fuzzy_value(&self, precision: usize) -> String {
        scalar::format_fuzzy_value(
            self.aggregated.terms.iter().map(|a| (a.degree, a.term.name.as_str())),
            precision,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::defuzzifier::IntegralDefuzzifier;
    use crate::norm::SNorm;
    use crate::term::TermKind;

    fn triangle(name: &str, a: f64, b: f64, c: f64) -> Term {
        Term::new(name, TermKind::Triangle { a, b, c })
    }

    #[test]
    fn input_variable_highest_membership_picks_winning_term() {
        let mut v = InputVariable::new("obstacle", 0.0, 1.0);
        v.base.add_term(triangle("left", 0.0, 0.0, 0.5));
        v.base.add_term(triangle("right", 0.5, 1.0, 1.0));
        let (mu, term) = v.highest_membership(0.9);
        assert_eq!(term.unwrap().name, "right");
        assert!(mu > 0.5);
    }

    #[test]
    fn input_variable_fuzzify_lists_every_term() {
        let mut v = InputVariable::new("obstacle", 0.0, 1.0);
        v.base.add_term(triangle("left", 0.0, 0.0, 1.0));
        v.base.add_term(triangle("right", 0.0, 1.0, 1.0));
        let text = v.fuzzify(0.25, 3);
        assert_eq!(text, "0.750/left + 0.250/right");
    }

    #[test]
    fn set_value_with_lock_range_clamps() {
        let mut v = InputVariable::new("obstacle", 0.0, 1.0);
        v.lock_range = true;
        v.set_value(5.0);
        assert_eq!(v.value, 1.0);
        v.set_value(-5.0);
        assert_eq!(v.value, 0.0);
    }

    #[test]
    fn set_value_without_lock_range_passes_through() {
        let mut v = InputVariable::new("obstacle", 0.0, 1.0);
        v.set_value(5.0);
        assert_eq!(v.value, 5.0);
    }

    #[test]
    fn empty_aggregate_falls_back_to_lock_previous_then_default() {
        let mut out = OutputVariable::new("steer", 0.0, 1.0);
        out.defuzzifier = Some(Defuzzifier::Integral(IntegralDefuzzifier::Centroid { resolution: 10 }));
        out.default_value = 0.5;
        let inputs = IndexMap::new();
        let settings = Settings::default();

        out.defuzzify(&inputs, &settings).unwrap();
        assert_eq!(out.value, 0.5);

        out.value = 0.8;
        out.lock_previous = true;
        out.clear();
        out.defuzzify(&inputs, &settings).unwrap();
        assert_eq!(out.value, 0.8);
    }

    #[test]
    fn non_empty_aggregate_defuzzifies_and_locks_range() {
        use crate::activated::Activated;
        use crate::norm::TNorm;
        use std::sync::Arc;

        let mut out = OutputVariable::new("steer", 0.0, 1.0);
        out.base.add_term(triangle("right", 0.333, 0.666, 1.0));
        out.aggregated.aggregation = Some(SNorm::Maximum);
        out.aggregated.push(Activated::new(
            Arc::new(triangle("right", 0.333, 0.666, 1.0)),
            0.8,
            TNorm::Minimum,
        ));
        out.defuzzifier = Some(Defuzzifier::Integral(IntegralDefuzzifier::Centroid { resolution: 100 }));
        out.lock_range = true;

        let inputs = IndexMap::new();
        let settings = Settings::default();
        out.defuzzify(&inputs, &settings).unwrap();
        assert!(out.value >= 0.0 && out.value <= 1.0);
        assert!(!out.value.is_nan());
    }

    #[test]
    fn set_range_mirrors_into_aggregated() {
        let mut out = OutputVariable::new("steer", 0.0, 1.0);
        out.set_range(-1.0, 2.0);
        assert_eq!(out.range(), (-1.0, 2.0));
        assert_eq!(out.aggregated.min, -1.0);
        assert_eq!(out.aggregated.max, 2.0);
    }

    #[test]
    fn degenerate_nonempty_aggregate_falls_back_to_lock_previous() {
        use crate::activated::Activated;
        use crate::norm::TNorm;
        use std::sync::Arc;

        let mut out = OutputVariable::new("steer", 0.0, 1.0);
        out.aggregated.aggregation = Some(SNorm::Maximum);
        // height 0 makes every sample mu=0, so the centroid's denominator is
        // zero even though the aggregate itself is non-empty.
        let zeroed = triangle("right", 0.333, 0.666, 1.0).with_height(0.0);
        out.aggregated.push(Activated::new(Arc::new(zeroed), 0.8, TNorm::Minimum));
        out.defuzzifier = Some(Defuzzifier::Integral(IntegralDefuzzifier::Centroid { resolution: 50 }));
        out.lock_previous = true;
        out.previous_value = 0.42;

        let inputs = IndexMap::new();
        let settings = Settings::default();
        out.defuzzify(&inputs, &settings).unwrap();
        assert_eq!(out.value, 0.42);
    }

    #[test]
    fn clear_does_not_overwrite_previous_value_when_current_is_nan() {
        let mut out = OutputVariable::new("steer", 0.0, 1.0);
        out.previous_value = 0.6;
        out.value = Scalar::NAN;
        out.clear();
        assert_eq!(out.previous_value, 0.6);
    }

    #[test]
    fn missing_defuzzifier_on_non_empty_aggregate_is_a_state_error() {
        use crate::activated::Activated;
        use crate::norm::TNorm;
        use std::sync::Arc;

        let mut out = OutputVariable::new("steer", 0.0, 1.0);
        out.aggregated.push(Activated::new(
            Arc::new(triangle("right", 0.333, 0.666, 1.0)),
            0.8,
            TNorm::Minimum,
        ));
        let inputs = IndexMap::new();
        let settings = Settings::default();
        assert!(matches!(
            out.defuzzify(&inputs, &settings),
            Err(crate::error::FuzzyError::StateError { .. })
        ));
    }
}
