//! The top-level inference engine: ordered input/output variables, ordered
//! rule blocks, and the `process()` cycle that ties fuzzification, rule
//! firing, and defuzzification together.

use crate::aggregated::Aggregated;
use crate::activated::Activated;
use crate::error::{FuzzyError, Result};
use crate::missing_operator;
use crate::norm::TNorm;
use crate::rule::antecedent::AntecedentContext;
use crate::rule::{ConsequentSink, NameResolver, RuleBlock};
use crate::scalar::{Scalar, Settings};
use crate::semantic_error;
use crate::variable::{InputVariable, OutputVariable};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Coarse classification of an engine's inference style, derived from the
/// shape of its output variables' terms and rule block implications rather
/// than stored explicitly — an engine is whatever its configuration makes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InferenceType {
    Mamdani,
    TakagiSugeno,
    Tsukamoto,
    Larsen,
    Hybrid,
    Unknown,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Engine {
    pub name: String,
    pub description: String,
    pub settings: Settings,
    pub input_variables: IndexMap<String, InputVariable>,
    pub output_variables: IndexMap<String, OutputVariable>,
    pub rule_blocks: Vec<RuleBlock>,
}

impl Engine {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            settings: Settings::default(),
            input_variables: IndexMap::new(),
            output_variables: IndexMap::new(),
            rule_blocks: Vec::new(),
        }
    }

    pub fn input_variable(&self, name: &str) -> Option<&InputVariable> {
        self.input_variables.get(name)
    }

    pub fn input_variable_mut(&mut self, name: &str) -> Option<&mut InputVariable> {
        self.input_variables.get_mut(name)
    }

    pub fn output_variable(&self, name: &str) -> Option<&OutputVariable> {
        self.output_variables.get(name)
    }

    pub fn output_variable_mut(&mut self, name: &str) -> Option<&mut OutputVariable> {
        self.output_variables.get_mut(name)
    }

    /// Classifies the engine by inspecting its output terms: an engine whose
    /// output terms are entirely parameter-only (`Constant`/`Linear`/
    /// `Function`) is Takagi-Sugeno; entirely monotonic shapes (`Ramp`,
    /// `Sigmoid`, `SShape`, `ZShape`, `Concave`) is Tsukamoto, per real
    /// fuzzylite's convention that a Tsukamoto consequent resolves each
    /// rule's activation degree through a monotonic term's inverse rather
    /// than clipping a symmetric-peak shape; entirely ordinary (non-monotonic,
    /// non-parameter-only) terms with an `AlgebraicProduct` implication is
    /// Larsen, otherwise plain Mamdani; any mix of the three term families is
    /// Hybrid; no output terms at all is Unknown.
    pub fn inference_type(&self) -> InferenceType {
        let mut has_ts_term = false;
        let mut has_tsukamoto_term = false;
        let mut has_mamdani_term = false;
        for ov in self.output_variables.values() {
            for term in ov.base.terms.values() {
                if term.is_parameter_only() {
                    has_ts_term = true;
                } else if term.is_monotonic() {
                    has_tsukamoto_term = true;
                } else {
                    has_mamdani_term = true;
                }
            }
        }
        match (has_ts_term, has_tsukamoto_term, has_mamdani_term) {
            (true, false, false) => InferenceType::TakagiSugeno,
            (false, true, false) => InferenceType::Tsukamoto,
            (false, false, true) => {
                let uses_product = self
                    .rule_blocks
                    .iter()
                    .any(|b| b.implication == Some(TNorm::AlgebraicProduct));
                if uses_product {
                    InferenceType::Larsen
                } else {
                    InferenceType::Mamdani
                }
            }
            (false, false, false) => InferenceType::Unknown,
            _ => InferenceType::Hybrid,
        }
    }

    /// Resets every input/output variable to its undefined state and clears
    /// all output aggregates, discarding `lock_previous` history.
    pub fn restart(&mut self) {
        for iv in self.input_variables.values_mut() {
            iv.value = Scalar::NAN;
        }
        for ov in self.output_variables.values_mut() {
            ov.value = Scalar::NAN;
            ov.previous_value = Scalar::NAN;
            ov.aggregated.clear();
        }
    }

    /// Runs one inference cycle (spec.md 4.9): snapshot and clear every
    /// output, fire rule blocks in declaration order, then defuzzify each
    /// output. Returns non-fatal diagnostics (missing-operator / semantic
    /// errors raised by individual rules or outputs) collected along the
    /// way; a diagnostic never aborts the cycle.
    pub fn process(&mut self) -> Vec<FuzzyError> {
        let _timer = crate::utils::Timer::new("engine::process");
        let mut diagnostics = Vec::new();

        for ov in self.output_variables.values_mut() {
            ov.clear();
        }

        for block in &self.rule_blocks {
            log::trace!("firing rule block '{}'", block.name);
            let output_snapshot: IndexMap<String, Aggregated> = self
                .output_variables
                .iter()
                .map(|(name, ov)| (name.clone(), ov.aggregated.clone()))
                .collect();
            let ctx = EngineContext {
                input_variables: &self.input_variables,
                output_snapshot,
            };
            let mut sink = EngineSink { outputs: &mut self.output_variables };
            diagnostics.extend(block.fire(&ctx, &mut sink));
        }

        let input_values: IndexMap<String, Scalar> = self
            .input_variables
            .iter()
            .map(|(name, iv)| (name.clone(), iv.value))
            .collect();
        for ov in self.output_variables.values_mut() {
            if let Err(e) = ov.defuzzify(&input_values, &self.settings) {
                log::debug!("output variable '{}' failed to defuzzify: {}", ov.base.name, e);
                diagnostics.push(e);
            }
        }

        diagnostics
    }

    /// Validates every rule in every block against this engine's variables,
    /// matching `Rule::create(text, engine)`'s semantic pass (spec.md 6). A
    /// rule that fails to load is left `!loaded` and skipped by `process()`
    /// rather than aborting the whole engine.
    pub fn load_rules(&mut self) -> Vec<FuzzyError> {
        let resolver = EngineResolver {
            input_variables: &self.input_variables,
            output_variables: &self.output_variables,
        };
        let mut diagnostics = Vec::new();
        for block in &mut self.rule_blocks {
            for rule in &mut block.rules {
                if let Err(e) = rule.load(&resolver) {
                    diagnostics.push(e);
                }
            }
        }
        diagnostics
    }
}

struct EngineResolver<'a> {
    input_variables: &'a IndexMap<String, InputVariable>,
    output_variables: &'a IndexMap<String, OutputVariable>,
}

impl<'a> NameResolver for EngineResolver<'a> {
    fn term_exists(&self, variable: &str, term: &str) -> bool {
        if let Some(iv) = self.input_variables.get(variable) {
            return iv.base.term(term).is_some();
        }
        if let Some(ov) = self.output_variables.get(variable) {
            return ov.base.term(term).is_some();
        }
        false
    }
}

struct EngineContext<'a> {
    input_variables: &'a IndexMap<String, InputVariable>,
    /// Output aggregates as they stood before this rule block started
    /// firing. A rule in this block that references an output variable
    /// written earlier in the *same* block sees the pre-block value, not a
    /// live one — avoiding the aliasing a live reference would require
    /// while firing and reading the same block concurrently.
    output_snapshot: IndexMap<String, Aggregated>,
}

impl<'a> AntecedentContext for EngineContext<'a> {
    fn fuzzify(&self, variable: &str, term: &str) -> Result<Scalar> {
        if let Some(iv) = self.input_variables.get(variable) {
            let t = iv
                .base
                .term(term)
                .ok_or_else(|| semantic_error!(format!("{variable}.{term}")))?;
            return Ok(t.membership_of(iv.value));
        }
        if let Some(agg) = self.output_snapshot.get(variable) {
            return Ok(agg.activation_degree(term));
        }
        Err(semantic_error!(variable))
    }
}

struct EngineSink<'a> {
    outputs: &'a mut IndexMap<String, OutputVariable>,
}

impl<'a> ConsequentSink for EngineSink<'a> {
    fn activate(&mut self, variable: &str, term: &str, degree: Scalar, block_implication: Option<TNorm>) -> Result<()> {
        let output = self
            .outputs
            .get_mut(variable)
            .ok_or_else(|| semantic_error!(variable))?;
        let term = output
            .base
            .term(term)
            .ok_or_else(|| semantic_error!(format!("{variable}.{term}")))?
            .clone();
        let implication = if term.is_parameter_only() {
            TNorm::NoneNorm
        } else {
            block_implication.ok_or_else(|| missing_operator!("implication"))?
        };
        output
            .aggregated
            .push(Activated::new(std::sync::Arc::new(term), degree, implication));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::defuzzifier::{Defuzzifier, IntegralDefuzzifier, WeightedDefuzzifier, WeightedMode};
    use crate::norm::SNorm;
    use crate::rule::Rule;
    use crate::term::{Term, TermKind};

    fn obstacle_avoidance_mamdani() -> Engine {
        let mut engine = Engine::new("obstacleAvoidance");

        let mut obstacle = InputVariable::new("obstacle", 0.0, 1.0);
        obstacle
            .base
            .add_term(Term::new("left", TermKind::Ramp { start: 1.0, end: 0.0 }));
        obstacle
            .base
            .add_term(Term::new("right", TermKind::Ramp { start: 0.0, end: 1.0 }));
        engine.input_variables.insert("obstacle".to_string(), obstacle);

        let mut steer = OutputVariable::new("steer", 0.0, 1.0);
        steer
            .base
            .add_term(Term::new("left", TermKind::Ramp { start: 1.0, end: 0.0 }));
        steer
            .base
            .add_term(Term::new("right", TermKind::Ramp { start: 0.0, end: 1.0 }));
        steer.aggregated.aggregation = Some(SNorm::Maximum);
        steer.defuzzifier = Some(Defuzzifier::Integral(IntegralDefuzzifier::Centroid { resolution: 200 }));
        engine.output_variables.insert("steer".to_string(), steer);

        let mut block = RuleBlock::new("mamdani");
        block.implication = Some(TNorm::Minimum);
        let r1 = Rule::create("if obstacle is left then steer is right").unwrap();
        let r2 = Rule::create("if obstacle is right then steer is left").unwrap();
        block.rules.push(r1);
        block.rules.push(r2);
        engine.rule_blocks.push(block);

        let diagnostics = engine.load_rules();
        assert!(diagnostics.is_empty(), "{:?}", diagnostics);
        engine
    }

    #[test]
    fn ramp_consequent_engine_classifies_as_tsukamoto() {
        // `steer`'s terms are Ramp (monotonic), so per real fuzzylite's
        // convention this is Tsukamoto even though it's defuzzified by an
        // ordinary integral Centroid rather than per-rule inversion.
        let engine = obstacle_avoidance_mamdani();
        assert_eq!(engine.inference_type(), InferenceType::Tsukamoto);
    }

    #[test]
    fn triangle_consequent_engine_classifies_as_mamdani() {
        let mut engine = Engine::new("obstacleAvoidanceTriangular");

        let mut obstacle = InputVariable::new("obstacle", 0.0, 1.0);
        obstacle
            .base
            .add_term(Term::new("left", TermKind::Ramp { start: 1.0, end: 0.0 }));
        obstacle
            .base
            .add_term(Term::new("right", TermKind::Ramp { start: 0.0, end: 1.0 }));
        engine.input_variables.insert("obstacle".to_string(), obstacle);

        let mut steer = OutputVariable::new("steer", 0.0, 1.0);
        steer
            .base
            .add_term(Term::new("left", TermKind::Triangle { a: -0.5, b: 0.0, c: 0.5 }));
        steer
            .base
            .add_term(Term::new("right", TermKind::Triangle { a: 0.5, b: 1.0, c: 1.5 }));
        steer.aggregated.aggregation = Some(SNorm::Maximum);
        steer.defuzzifier = Some(Defuzzifier::Integral(IntegralDefuzzifier::Centroid { resolution: 200 }));
        engine.output_variables.insert("steer".to_string(), steer);

        let mut block = RuleBlock::new("mamdani");
        block.implication = Some(TNorm::Minimum);
        block.rules.push(Rule::create("if obstacle is left then steer is right").unwrap());
        block.rules.push(Rule::create("if obstacle is right then steer is left").unwrap());
        engine.rule_blocks.push(block);
        assert!(engine.load_rules().is_empty());

        assert_eq!(engine.inference_type(), InferenceType::Mamdani);
    }

    #[test]
    fn mamdani_engine_steers_away_from_obstacle() {
        let mut engine = obstacle_avoidance_mamdani();
        engine.input_variable_mut("obstacle").unwrap().set_value(0.0);
        let diagnostics = engine.process();
        assert!(diagnostics.is_empty(), "{:?}", diagnostics);
        let steer = engine.output_variable("steer").unwrap().value;
        assert!((steer - 0.667).abs() < 0.05, "expected steer near 0.667, got {steer}");
    }

    #[test]
    fn takagi_sugeno_engine_classifies_and_blends_constants() {
        let mut engine = Engine::new("tsObstacleAvoidance");

        let mut obstacle = InputVariable::new("obstacle", 0.0, 1.0);
        obstacle
            .base
            .add_term(Term::new("left", TermKind::Ramp { start: 1.0, end: 0.0 }));
        obstacle
            .base
            .add_term(Term::new("right", TermKind::Ramp { start: 0.0, end: 1.0 }));
        engine.input_variables.insert("obstacle".to_string(), obstacle);

        let mut steer = OutputVariable::new("steer", 0.0, 1.0);
        steer.base.add_term(Term::new("left", TermKind::Constant { value: 0.333 }));
        steer.base.add_term(Term::new("right", TermKind::Constant { value: 0.666 }));
        steer.aggregated.aggregation = Some(SNorm::Maximum);
        steer.defuzzifier = Some(Defuzzifier::Weighted(WeightedDefuzzifier::WeightedAverage {
            mode: WeightedMode::Automatic,
        }));
        engine.output_variables.insert("steer".to_string(), steer);

        let mut block = RuleBlock::new("takagiSugeno");
        let r1 = Rule::create("if obstacle is left then steer is right").unwrap();
        let r2 = Rule::create("if obstacle is right then steer is left").unwrap();
        block.rules.push(r1);
        block.rules.push(r2);
        engine.rule_blocks.push(block);
        assert!(engine.load_rules().is_empty());

        assert_eq!(engine.inference_type(), InferenceType::TakagiSugeno);

        engine.input_variable_mut("obstacle").unwrap().set_value(0.5);
        let diagnostics = engine.process();
        assert!(diagnostics.is_empty());
        let steer = engine.output_variable("steer").unwrap().value;
        assert!((steer - 0.4995).abs() < 1e-3, "got {steer}");
    }

    #[test]
    fn missing_implication_surfaces_as_diagnostic_not_a_panic() {
        let mut engine = obstacle_avoidance_mamdani();
        engine.rule_blocks[0].implication = None;
        engine.input_variable_mut("obstacle").unwrap().set_value(0.0);
        let diagnostics = engine.process();
        assert!(!diagnostics.is_empty());
        assert!(diagnostics
            .iter()
            .all(|e| matches!(e, FuzzyError::MissingOperator(_))));
    }

    #[test]
    fn restart_clears_values_and_history() {
        let mut engine = obstacle_avoidance_mamdani();
        engine.input_variable_mut("obstacle").unwrap().set_value(0.2);
        engine.process();
        engine.restart();
        assert!(engine.input_variable("obstacle").unwrap().value.is_nan());
        assert!(engine.output_variable("steer").unwrap().value.is_nan());
        assert!(engine.output_variable("steer").unwrap().previous_value.is_nan());
    }
}
