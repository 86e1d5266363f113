//! Rule consequent: an ordered list of propositions applied when the
//! antecedent fires, plus the optional `with <weight>` clause.

use super::antecedent::{self, Proposition, Tok, TokenCursor};
use crate::error::Result;
use crate::scalar::Scalar;
use crate::syntax_error;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Consequent {
    pub propositions: Vec<Proposition>,
}

impl Consequent {
    pub fn to_text(&self) -> String {
        self.propositions
            .iter()
            .map(|p| {
                let mut parts = vec![p.variable.clone(), "is".to_string()];
                for h in &p.hedges {
                    parts.push(h.name().to_string());
                }
                parts.push(p.term.clone());
                parts.join(" ")
            })
            .collect::<Vec<_>>()
            .join(" and ")
    }
}

/// `consequent := V "is" (H)* T ("and" V "is" (H)* T)*`
pub(crate) fn parse_consequent(cursor: &mut TokenCursor) -> Result<Consequent> {
    let mut propositions = vec![antecedent::parse_proposition(cursor)?];
    while cursor.is_keyword("and") {
        cursor.advance();
        propositions.push(antecedent::parse_proposition(cursor)?);
    }
    Ok(Consequent { propositions })
}

/// `("with" number)?`
pub(crate) fn parse_weight(cursor: &mut TokenCursor) -> Result<Scalar> {
    if cursor.is_keyword("with") {
        cursor.advance();
        match cursor.advance() {
            Some(Tok::Ident(s)) => s
                .parse::<Scalar>()
                .map_err(|_| syntax_error!(cursor.peek_pos(), format!("invalid weight '{s}'"))),
            other => Err(syntax_error!(
                cursor.peek_pos(),
                format!("expected a number after 'with', found {:?}", other)
            )),
        }
    } else {
        Ok(1.0)
    }
}
