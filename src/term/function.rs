//! Recursive-descent parser and evaluator for the `Function` term: an
//! arithmetic expression over `+ - * / % ^`, parentheses, function calls,
//! and identifiers resolved against a variable map at evaluation time.

use crate::error::{FuzzyError, Result};
use crate::scalar::Scalar;
use crate::syntax_error;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expr {
    Number(Scalar),
    Variable(String),
    Unary(UnaryOp, Box<Expr>),
    Binary(BinaryOp, Box<Expr>, Box<Expr>),
    Call(String, Vec<Expr>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnaryOp {
    Neg,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Pow,
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Number(Scalar),
    Ident(String),
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Caret,
    LParen,
    RParen,
    Comma,
}

struct Lexer<'a> {
    src: &'a str,
    chars: std::iter::Peekable<std::str::CharIndices<'a>>,
}

impl<'a> Lexer<'a> {
    fn new(src: &'a str) -> Self {
        Self {
            src,
            chars: src.char_indices().peekable(),
        }
    }

    fn tokenize(mut self) -> Result<Vec<(usize, Token)>> {
        let mut tokens = Vec::new();
        while let Some(&(pos, ch)) = self.chars.peek() {
            if ch.is_whitespace() {
                self.chars.next();
                continue;
            }
            match ch {
                '+' => {
                    self.chars.next();
                    tokens.push((pos, Token::Plus));
                }
                '-' => {
                    self.chars.next();
                    tokens.push((pos, Token::Minus));
                }
                '*' => {
                    self.chars.next();
                    tokens.push((pos, Token::Star));
                }
                '/' => {
                    self.chars.next();
                    tokens.push((pos, Token::Slash));
                }
                '%' => {
                    self.chars.next();
                    tokens.push((pos, Token::Percent));
                }
                '^' => {
                    self.chars.next();
                    tokens.push((pos, Token::Caret));
                }
                '(' => {
                    self.chars.next();
                    tokens.push((pos, Token::LParen));
                }
                ')' => {
                    self.chars.next();
                    tokens.push((pos, Token::RParen));
                }
                ',' => {
                    self.chars.next();
                    tokens.push((pos, Token::Comma));
                }
                c if c.is_ascii_digit() || c == '.' => {
                    let start = pos;
                    let mut end = pos;
                    while let Some(&(p, c)) = self.chars.peek() {
                        if c.is_ascii_digit() || c == '.' || c == 'e' || c == 'E' {
                            end = p + c.len_utf8();
                            self.chars.next();
                        } else if (c == '+' || c == '-')
                            && matches!(self.src[start..end].chars().last(), Some('e') | Some('E'))
                        {
                            end = p + c.len_utf8();
                            self.chars.next();
                        } else {
                            break;
                        }
                    }
                    let text = &self.src[start..end];
                    let value = text
                        .parse::<Scalar>()
                        .map_err(|_| syntax_error!(start, format!("invalid number '{text}'")))?;
                    tokens.push((start, Token::Number(value)));
                }
                c if c.is_alphabetic() || c == '_' => {
                    let start = pos;
                    let mut end = pos;
                    while let Some(&(p, c)) = self.chars.peek() {
                        if c.is_alphanumeric() || c == '_' {
                            end = p + c.len_utf8();
                            self.chars.next();
                        } else {
                            break;
                        }
                    }
                    tokens.push((start, Token::Ident(self.src[start..end].to_string())));
                }
                _ => {
                    return Err(syntax_error!(pos, format!("unexpected character '{ch}'")));
                }
            }
        }
        Ok(tokens)
    }
}

struct Parser {
    tokens: Vec<(usize, Token)>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|(_, t)| t)
    }

    fn peek_pos(&self) -> usize {
        self.tokens
            .get(self.pos)
            .map(|(p, _)| *p)
            .unwrap_or(usize::MAX)
    }

    fn advance(&mut self) -> Option<Token> {
        let t = self.tokens.get(self.pos).map(|(_, t)| t.clone());
        self.pos += 1;
        t
    }

    fn expect(&mut self, tok: &Token) -> Result<()> {
        if self.peek() == Some(tok) {
            self.advance();
            Ok(())
        } else {
            Err(syntax_error!(
                self.peek_pos(),
                format!("expected {:?}, found {:?}", tok, self.peek())
            ))
        }
    }

    // expr := term (('+' | '-') term)*
    fn expr(&mut self) -> Result<Expr> {
        let mut node = self.term()?;
        loop {
            match self.peek() {
                Some(Token::Plus) => {
                    self.advance();
                    let rhs = self.term()?;
                    node = Expr::Binary(BinaryOp::Add, Box::new(node), Box::new(rhs));
                }
                Some(Token::Minus) => {
                    self.advance();
                    let rhs = self.term()?;
                    node = Expr::Binary(BinaryOp::Sub, Box::new(node), Box::new(rhs));
                }
                _ => break,
            }
        }
        Ok(node)
    }

    // term := power (('*' | '/' | '%') power)*
    fn term(&mut self) -> Result<Expr> {
        let mut node = self.power()?;
        loop {
            match self.peek() {
                Some(Token::Star) => {
                    self.advance();
                    let rhs = self.power()?;
                    node = Expr::Binary(BinaryOp::Mul, Box::new(node), Box::new(rhs));
                }
                Some(Token::Slash) => {
                    self.advance();
                    let rhs = self.power()?;
                    node = Expr::Binary(BinaryOp::Div, Box::new(node), Box::new(rhs));
                }
                Some(Token::Percent) => {
                    self.advance();
                    let rhs = self.power()?;
                    node = Expr::Binary(BinaryOp::Mod, Box::new(node), Box::new(rhs));
                }
                _ => break,
            }
        }
        Ok(node)
    }

    // power := unary ('^' power)?   -- right associative
    fn power(&mut self) -> Result<Expr> {
        let base = self.unary()?;
        if matches!(self.peek(), Some(Token::Caret)) {
            self.advance();
            let rhs = self.power()?;
            Ok(Expr::Binary(BinaryOp::Pow, Box::new(base), Box::new(rhs)))
        } else {
            Ok(base)
        }
    }

    // unary := '-' unary | atom
    fn unary(&mut self) -> Result<Expr> {
        if matches!(self.peek(), Some(Token::Minus)) {
            self.advance();
            let inner = self.unary()?;
            return Ok(Expr::Unary(UnaryOp::Neg, Box::new(inner)));
        }
        if matches!(self.peek(), Some(Token::Plus)) {
            self.advance();
            return self.unary();
        }
        self.atom()
    }

    // atom := NUMBER | IDENT '(' args ')' | IDENT | '(' expr ')'
    fn atom(&mut self) -> Result<Expr> {
        match self.advance() {
            Some(Token::Number(n)) => Ok(Expr::Number(n)),
            Some(Token::Ident(name)) => {
                if matches!(self.peek(), Some(Token::LParen)) {
                    self.advance();
                    let mut args = Vec::new();
                    if !matches!(self.peek(), Some(Token::RParen)) {
                        args.push(self.expr()?);
                        while matches!(self.peek(), Some(Token::Comma)) {
                            self.advance();
                            args.push(self.expr()?);
                        }
                    }
                    self.expect(&Token::RParen)?;
                    Ok(Expr::Call(name, args))
                } else {
                    Ok(Expr::Variable(name))
                }
            }
            Some(Token::LParen) => {
                let inner = self.expr()?;
                self.expect(&Token::RParen)?;
                Ok(inner)
            }
            other => Err(syntax_error!(
                self.peek_pos(),
                format!("unexpected token {:?}", other)
            )),
        }
    }
}

/// Parses a `Function` term's expression text into an AST.
pub fn parse(text: &str) -> Result<Expr> {
    let tokens = Lexer::new(text).tokenize()?;
    let mut parser = Parser { tokens, pos: 0 };
    let expr = parser.expr()?;
    if parser.pos != parser.tokens.len() {
        return Err(syntax_error!(
            parser.peek_pos(),
            "trailing tokens after expression"
        ));
    }
    Ok(expr)
}

/// Evaluates a parsed expression against a map of variable names to values.
pub fn evaluate(expr: &Expr, variables: &IndexMap<String, Scalar>) -> Result<Scalar> {
    match expr {
        Expr::Number(n) => Ok(*n),
        Expr::Variable(name) => variables
            .get(name)
            .copied()
            .ok_or_else(|| FuzzyError::SemanticError(name.clone())),
        Expr::Unary(UnaryOp::Neg, inner) => Ok(-evaluate(inner, variables)?),
        Expr::Binary(op, lhs, rhs) => {
            let a = evaluate(lhs, variables)?;
            let b = evaluate(rhs, variables)?;
            Ok(match op {
                BinaryOp::Add => a + b,
                BinaryOp::Sub => a - b,
                BinaryOp::Mul => a * b,
                BinaryOp::Div => a / b,
                BinaryOp::Mod => a % b,
                BinaryOp::Pow => a.powf(b),
            })
        }
        Expr::Call(name, args) => {
            let values: Vec<Scalar> = args
                .iter()
                .map(|a| evaluate(a, variables))
                .collect::<Result<_>>()?;
            call_function(name, &values)
        }
    }
}

fn call_function(name: &str, args: &[Scalar]) -> Result<Scalar> {
    macro_rules! unary {
        ($f:expr) => {{
            if args.len() != 1 {
                return Err(FuzzyError::SemanticError(format!(
                    "{name} expects 1 argument, got {}",
                    args.len()
                )));
            }
            Ok($f(args[0]))
        }};
    }
    match name {
        "sin" => unary!(Scalar::sin),
        "cos" => unary!(Scalar::cos),
        "tan" => unary!(Scalar::tan),
        "exp" => unary!(Scalar::exp),
        "log" => unary!(Scalar::ln),
        "ln" => unary!(Scalar::ln),
        "sqrt" => unary!(Scalar::sqrt),
        "fabs" | "abs" => unary!(Scalar::abs),
        "floor" => unary!(Scalar::floor),
        "ceil" => unary!(Scalar::ceil),
        "pow" => {
            if args.len() != 2 {
                return Err(FuzzyError::SemanticError(format!(
                    "pow expects 2 arguments, got {}",
                    args.len()
                )));
            }
            Ok(args[0].powf(args[1]))
        }
        "max" => args
            .iter()
            .copied()
            .reduce(Scalar::max)
            .ok_or_else(|| FuzzyError::SemanticError("max expects at least 1 argument".into())),
        "min" => args
            .iter()
            .copied()
            .reduce(Scalar::min)
            .ok_or_else(|| FuzzyError::SemanticError("min expects at least 1 argument".into())),
        _ => Err(FuzzyError::SemanticError(format!(
            "unknown function '{name}'"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, Scalar)]) -> IndexMap<String, Scalar> {
        pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[test]
    fn arithmetic_precedence() {
        let expr = parse("2 + 3 * 4").unwrap();
        assert_eq!(evaluate(&expr, &vars(&[])).unwrap(), 14.0);
    }

    #[test]
    fn power_is_right_associative() {
        let expr = parse("2 ^ 3 ^ 2").unwrap();
        // 2 ^ (3 ^ 2) = 2^9 = 512
        assert_eq!(evaluate(&expr, &vars(&[])).unwrap(), 512.0);
    }

    #[test]
    fn parentheses_override_precedence() {
        let expr = parse("(2 + 3) * 4").unwrap();
        assert_eq!(evaluate(&expr, &vars(&[])).unwrap(), 20.0);
    }

    #[test]
    fn variable_resolution() {
        let expr = parse("2 * x + 1").unwrap();
        assert_eq!(evaluate(&expr, &vars(&[("x", 5.0)])).unwrap(), 11.0);
    }

    #[test]
    fn unknown_variable_is_semantic_error() {
        let expr = parse("y + 1").unwrap();
        assert!(matches!(
            evaluate(&expr, &vars(&[])),
            Err(FuzzyError::SemanticError(_))
        ));
    }

    #[test]
    fn function_calls() {
        let expr = parse("max(1, 2, 3) + min(4, 5)").unwrap();
        assert_eq!(evaluate(&expr, &vars(&[])).unwrap(), 7.0);
    }

    #[test]
    fn malformed_expression_is_syntax_error() {
        assert!(matches!(parse("2 + * 3"), Err(FuzzyError::SyntaxError { .. })));
        assert!(matches!(parse("(2 + 3"), Err(FuzzyError::SyntaxError { .. })));
    }
}
