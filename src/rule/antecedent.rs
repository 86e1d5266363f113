//! Tokenizer, recursive-descent parser, and evaluator for rule antecedents.
//!
//! Grammar (spec.md 4.4), pinned to left-associative `and` binding tighter
//! than `or`:
//! ```text
//! expr        := term ("or" term)*
//! term        := factor ("and" factor)*
//! factor      := "(" expr ")" | proposition
//! proposition := IDENT "is" (HEDGE)* IDENT
//! ```

use crate::error::Result;
use crate::hedge::{self, Hedge};
use crate::norm::TNorm;
use crate::scalar::Scalar;
use crate::{missing_operator, syntax_error};
use serde::{Deserialize, Serialize};

/// Looks up membership degrees for antecedent propositions, abstracting
/// over input variables (`term.membership(value)`) and output variables
/// (the aggregated set's activation degree for that term).
pub trait AntecedentContext {
    fn fuzzify(&self, variable: &str, term: &str) -> Result<Scalar>;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Proposition {
    pub variable: String,
    pub hedges: Vec<Hedge>,
    pub term: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Antecedent {
    Proposition(Proposition),
    And(Box<Antecedent>, Box<Antecedent>),
    Or(Box<Antecedent>, Box<Antecedent>),
}

impl Antecedent {
    pub fn eval(
        &self,
        ctx: &dyn AntecedentContext,
        conjunction: Option<TNorm>,
        disjunction: Option<TNorm>,
    ) -> Result<Scalar> {
        match self {
            Antecedent::Proposition(p) => {
                let mu = ctx.fuzzify(&p.variable, &p.term)?;
                Ok(hedge::apply_chain_antecedent(&p.hedges, mu))
            }
            Antecedent::And(l, r) => {
                let a = l.eval(ctx, conjunction, disjunction)?;
                let b = r.eval(ctx, conjunction, disjunction)?;
                let op = conjunction.ok_or_else(|| missing_operator!("and"))?;
                Ok(op.apply(a, b))
            }
            Antecedent::Or(l, r) => {
                let a = l.eval(ctx, conjunction, disjunction)?;
                let b = r.eval(ctx, conjunction, disjunction)?;
                let op = disjunction.ok_or_else(|| missing_operator!("or"))?;
                Ok(op.apply(a, b))
            }
        }
    }

    /// Reprints the antecedent in canonical form (spec.md 8's round-trip
    /// property: parse, print, re-parse must be stable).
    pub fn to_text(&self) -> String {
        match self {
            Antecedent::Proposition(p) => {
                let mut parts = vec![p.variable.clone(), "is".to_string()];
                for h in &p.hedges {
                    parts.push(h.name().to_string());
                }
                parts.push(p.term.clone());
                parts.join(" ")
            }
            Antecedent::And(l, r) => format!("({} and {})", l.to_text(), r.to_text()),
            Antecedent::Or(l, r) => format!("({} or {})", l.to_text(), r.to_text()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Tok {
    Ident(String),
    LParen,
    RParen,
}

/// Splits rule text into identifier/paren tokens, tracking byte offsets for
/// error messages. Keywords (`if`, `is`, `and`, `or`, `then`, `with`) are
/// plain identifier tokens distinguished by the parser, matching the
/// lowercase-keyword convention spec.md's grammar uses.
pub(crate) fn tokenize(text: &str) -> Result<Vec<(usize, Tok)>> {
    let mut tokens = Vec::new();
    let mut chars = text.char_indices().peekable();
    while let Some(&(pos, ch)) = chars.peek() {
        if ch.is_whitespace() {
            chars.next();
            continue;
        }
        match ch {
            '(' => {
                chars.next();
                tokens.push((pos, Tok::LParen));
            }
            ')' => {
                chars.next();
                tokens.push((pos, Tok::RParen));
            }
            c if c.is_alphanumeric() || c == '_' || c == '.' || c == '-' => {
                let start = pos;
                let mut end = pos;
                while let Some(&(p, c)) = chars.peek() {
                    if c.is_whitespace() || c == '(' || c == ')' {
                        break;
                    }
                    end = p + c.len_utf8();
                    chars.next();
                }
                tokens.push((start, Tok::Ident(text[start..end].to_string())));
            }
            _ => return Err(syntax_error!(pos, format!("unexpected character '{ch}'"))),
        }
    }
    Ok(tokens)
}

pub(crate) struct TokenCursor<'a> {
    pub tokens: &'a [(usize, Tok)],
    pub pos: usize,
}

impl<'a> TokenCursor<'a> {
    pub fn new(tokens: &'a [(usize, Tok)]) -> Self {
        Self { tokens, pos: 0 }
    }

    pub fn peek(&self) -> Option<&Tok> {
        self.tokens.get(self.pos).map(|(_, t)| t)
    }

    pub fn peek_pos(&self) -> usize {
        self.tokens.get(self.pos).map(|(p, _)| *p).unwrap_or(usize::MAX)
    }

    pub fn is_keyword(&self, kw: &str) -> bool {
        matches!(self.peek(), Some(Tok::Ident(s)) if s.eq_ignore_ascii_case(kw))
    }

    pub fn advance(&mut self) -> Option<Tok> {
        let t = self.tokens.get(self.pos).map(|(_, t)| t.clone());
        self.pos += 1;
        t
    }

    pub fn expect_keyword(&mut self, kw: &str) -> Result<()> {
        if self.is_keyword(kw) {
            self.advance();
            Ok(())
        } else {
            Err(syntax_error!(
                self.peek_pos(),
                format!("expected '{kw}', found {:?}", self.peek())
            ))
        }
    }

    pub fn expect_ident(&mut self) -> Result<String> {
        match self.advance() {
            Some(Tok::Ident(s)) => Ok(s),
            other => Err(syntax_error!(
                self.peek_pos(),
                format!("expected identifier, found {:?}", other)
            )),
        }
    }
}

const CONTROL_KEYWORDS: [&str; 4] = ["then", "with", "and", "or"];

/// Parses `IDENT "is" (HEDGE)* IDENT`. Collects the whole run of plain
/// identifiers following `is` (stopping at a control keyword, paren, or end
/// of input): every identifier but the last must name a known hedge, and
/// the last one is the term.
pub(crate) fn parse_proposition(cursor: &mut TokenCursor) -> Result<Proposition> {
    let variable = cursor.expect_ident()?;
    cursor.expect_keyword("is")?;

    let mut run = Vec::new();
    loop {
        match cursor.peek() {
            Some(Tok::Ident(s)) if !CONTROL_KEYWORDS.iter().any(|kw| s.eq_ignore_ascii_case(kw)) => {
                run.push(s.clone());
                cursor.advance();
            }
            _ => break,
        }
    }
    if run.is_empty() {
        return Err(syntax_error!(cursor.peek_pos(), "expected a term after 'is'"));
    }
    let term = run.pop().unwrap();
    let mut hedges = Vec::with_capacity(run.len());
    for word in run {
        let hedge = Hedge::from_name(&word.to_ascii_lowercase())
            .ok_or_else(|| crate::semantic_error!(format!("unknown hedge '{word}'")))?;
        hedges.push(hedge);
    }
    Ok(Proposition { variable, hedges, term })
}

/// `factor := "(" expr ")" | proposition`
pub(crate) fn parse_factor(cursor: &mut TokenCursor) -> Result<Antecedent> {
    if matches!(cursor.peek(), Some(Tok::LParen)) {
        cursor.advance();
        let expr = parse_expr(cursor)?;
        if !matches!(cursor.peek(), Some(Tok::RParen)) {
            return Err(syntax_error!(cursor.peek_pos(), "expected ')'"));
        }
        cursor.advance();
        Ok(expr)
    } else {
        Ok(Antecedent::Proposition(parse_proposition(cursor)?))
    }
}

/// `term := factor ("and" factor)*`
pub(crate) fn parse_term(cursor: &mut TokenCursor) -> Result<Antecedent> {
    let mut node = parse_factor(cursor)?;
    while cursor.is_keyword("and") {
        cursor.advance();
        let rhs = parse_factor(cursor)?;
        node = Antecedent::And(Box::new(node), Box::new(rhs));
    }
    Ok(node)
}

/// `expr := term ("or" term)*`
pub(crate) fn parse_expr(cursor: &mut TokenCursor) -> Result<Antecedent> {
    let mut node = parse_term(cursor)?;
    while cursor.is_keyword("or") {
        cursor.advance();
        let rhs = parse_term(cursor)?;
        node = Antecedent::Or(Box::new(node), Box::new(rhs));
    }
    Ok(node)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    struct Ctx(HashMap<(String, String), Scalar>);
    impl AntecedentContext for Ctx {
        fn fuzzify(&self, variable: &str, term: &str) -> Result<Scalar> {
            self.0
                .get(&(variable.to_string(), term.to_string()))
                .copied()
                .ok_or_else(|| crate::semantic_error!(format!("{variable}.{term}")))
        }
    }

    fn parse(text: &str) -> Antecedent {
        let tokens = tokenize(text).unwrap();
        let mut cursor = TokenCursor::new(&tokens);
        let ast = parse_expr(&mut cursor).unwrap();
        assert_eq!(cursor.pos, cursor.tokens.len(), "trailing tokens");
        ast
    }

    #[test]
    fn and_binds_tighter_than_or() {
        let ast = parse("a is x and b is y or c is z");
        // must parse as (a is x and b is y) or (c is z)
        match ast {
            Antecedent::Or(lhs, rhs) => {
                assert!(matches!(*lhs, Antecedent::And(_, _)));
                assert!(matches!(*rhs, Antecedent::Proposition(_)));
            }
            other => panic!("expected Or at top level, got {:?}", other),
        }
    }

    #[test]
    fn parentheses_override_precedence() {
        let ast = parse("a is x and (b is y or c is z)");
        match ast {
            Antecedent::And(lhs, rhs) => {
                assert!(matches!(*lhs, Antecedent::Proposition(_)));
                assert!(matches!(*rhs, Antecedent::Or(_, _)));
            }
            other => panic!("expected And at top level, got {:?}", other),
        }
    }

    #[test]
    fn hedge_chain_parses() {
        let ast = parse("x is very not low");
        match ast {
            Antecedent::Proposition(p) => {
                assert_eq!(p.hedges, vec![Hedge::Very, Hedge::Not]);
                assert_eq!(p.term, "low");
            }
            other => panic!("expected Proposition, got {:?}", other),
        }
    }

    #[test]
    fn missing_operator_on_and_without_conjunction() {
        let ast = parse("a is x and b is y");
        let mut ctx_map = HashMap::new();
        ctx_map.insert(("a".to_string(), "x".to_string()), 0.5);
        ctx_map.insert(("b".to_string(), "y".to_string()), 0.3);
        let ctx = Ctx(ctx_map);
        let result = ast.eval(&ctx, None, Some(TNorm::Maximum));
        assert!(matches!(result, Err(crate::error::FuzzyError::MissingOperator(_))));
    }

    #[test]
    fn round_trip_is_stable() {
        let ast = parse("a is x and b is y or c is z");
        let printed = ast.to_text();
        let reparsed = parse(&printed);
        assert_eq!(reparsed.to_text(), printed);
    }
}
