//! Rules and rule blocks: parsing rule text, evaluating antecedents, and
//! firing consequents into output variables' aggregated sets.

pub mod antecedent;
pub mod consequent;

use crate::error::Result;
use crate::hedge;
use crate::norm::TNorm;
use crate::scalar::Scalar;
use crate::syntax_error;
use antecedent::{Antecedent, AntecedentContext, TokenCursor};
use consequent::Consequent;
use serde::{Deserialize, Serialize};

/// Resolves whether a `variable is term` proposition names real elements,
/// used by [`Rule::load`] to revalidate a rule against an engine's
/// variables without the `rule` module depending on the `engine`/
/// `variable` modules directly.
pub trait NameResolver {
    fn term_exists(&self, variable: &str, term: &str) -> bool;
}

/// Receives consequent activations fired by a [`RuleBlock`], deciding per
/// term whether to use the block's implication or the identity norm (for
/// Takagi-Sugeno-style parameter-only terms), and appending the resulting
/// `Activated` entry to the named output variable's aggregated set.
pub trait ConsequentSink {
    fn activate(
        &mut self,
        variable: &str,
        term: &str,
        degree: Scalar,
        block_implication: Option<TNorm>,
    ) -> Result<()>;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    pub text: String,
    pub antecedent: Antecedent,
    pub consequent: Consequent,
    pub weight: Scalar,
    pub enabled: bool,
    pub loaded: bool,
}

fn parse_rule_text(text: &str) -> Result<(Antecedent, Consequent, Scalar)> {
    let tokens = antecedent::tokenize(text)?;
    let mut cursor = TokenCursor::new(&tokens);
    cursor.expect_keyword("if")?;
    let ant = antecedent::parse_expr(&mut cursor)?;
    cursor.expect_keyword("then")?;
    let cons = consequent::parse_consequent(&mut cursor)?;
    let weight = consequent::parse_weight(&mut cursor)?;
    if cursor.pos != cursor.tokens.len() {
        return Err(syntax_error!(cursor.peek_pos(), "trailing tokens after rule"));
    }
    Ok((ant, cons, weight))
}

impl Rule {
    /// Parses rule text syntactically only; semantic validation happens in
    /// [`Rule::load`]. `loaded` starts false until a resolver confirms every
    /// name in the rule resolves.
    pub fn create(text: &str) -> Result<Self> {
        let (antecedent, consequent, weight) = parse_rule_text(text)?;
        Ok(Self {
            text: text.to_string(),
            antecedent,
            consequent,
            weight,
            enabled: true,
            loaded: false,
        })
    }

    /// Parses and immediately validates against a resolver, matching
    /// `Rule.create(text, engine)` (spec.md 6).
    pub fn create_with_resolver(text: &str, resolver: &dyn NameResolver) -> Result<Self> {
        let mut rule = Self::create(text)?;
        rule.load(resolver)?;
        Ok(rule)
    }

    /// Revalidates every variable/term name the rule references, setting
    /// `loaded` on success. A rule left `!loaded` is skipped by its block.
    pub fn load(&mut self, resolver: &dyn NameResolver) -> Result<()> {
        fn walk_antecedent(ast: &Antecedent, resolver: &dyn NameResolver) -> Result<()> {
            match ast {
                Antecedent::Proposition(p) => {
                    if !resolver.term_exists(&p.variable, &p.term) {
                        return Err(crate::semantic_error!(format!("{}.{}", p.variable, p.term)));
                    }
                    Ok(())
                }
                Antecedent::And(l, r) | Antecedent::Or(l, r) => {
                    walk_antecedent(l, resolver)?;
                    walk_antecedent(r, resolver)
                }
            }
        }
        walk_antecedent(&self.antecedent, resolver)?;
        for p in &self.consequent.propositions {
            if !resolver.term_exists(&p.variable, &p.term) {
                return Err(crate::semantic_error!(format!("{}.{}", p.variable, p.term)));
            }
        }
        self.loaded = true;
        Ok(())
    }

    pub fn activation_degree(
        &self,
        ctx: &dyn AntecedentContext,
        conjunction: Option<TNorm>,
        disjunction: Option<TNorm>,
    ) -> Result<Scalar> {
        let truth = self.antecedent.eval(ctx, conjunction, disjunction)?;
        Ok(self.weight * truth)
    }

    pub fn to_text(&self) -> String {
        let mut text = format!("if {} then {}", self.antecedent.to_text(), self.consequent.to_text());
        if (self.weight - 1.0).abs() > f64::EPSILON {
            text.push_str(&format!(" with {}", self.weight));
        }
        text
    }
}

/// Firing strategy turning antecedent truth into consequent activations.
/// Only `General` is required by spec.md 4.6; the trait is the documented
/// extension point for First/Last/Threshold/Proportional variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Activation {
    General,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleBlock {
    pub name: String,
    pub description: String,
    pub enabled: bool,
    pub conjunction: Option<TNorm>,
    pub disjunction: Option<TNorm>,
    pub implication: Option<TNorm>,
    pub activation: Activation,
    pub rules: Vec<Rule>,
}

impl RuleBlock {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            enabled: true,
            conjunction: None,
            disjunction: None,
            implication: None,
            activation: Activation::General,
            rules: Vec::new(),
        }
    }

    /// Evaluates every enabled, loaded rule and fires its consequents into
    /// `sink`. Returns the diagnostics (missing-operator/semantic errors)
    /// raised by individual rules; the block itself never fails — a
    /// misbehaving rule simply contributes no activation (spec.md 7/4.9).
    pub fn fire(&self, ctx: &dyn AntecedentContext, sink: &mut dyn ConsequentSink) -> Vec<crate::error::FuzzyError> {
        let mut diagnostics = Vec::new();
        if !self.enabled {
            return diagnostics;
        }
        match self.activation {
            Activation::General => {
                for rule in &self.rules {
                    if !rule.enabled || !rule.loaded {
                        continue;
                    }
                    match rule.activation_degree(ctx, self.conjunction, self.disjunction) {
                        Ok(degree) if degree > 0.0 => {
                            for p in &rule.consequent.propositions {
                                let d = hedge::apply_chain_consequent(&p.hedges, degree);
                                if let Err(e) = sink.activate(&p.variable, &p.term, d, self.implication) {
                                    diagnostics.push(e);
                                }
                            }
                        }
                        Ok(_) => {}
                        Err(e) => diagnostics.push(e),
                    }
                }
            }
        }
        diagnostics
    }
}
