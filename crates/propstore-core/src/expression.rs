//! Arithmetic expressions for numeric values
//!
//! Numeric accessors read their raw value as an expression, so a config can
//! say `timeout = 60 * 5`. The grammar is closed:
//!
//! ```text
//! expr   := term (('+' | '-') term)*
//! term   := unary (('*' | '/') unary)*
//! unary  := ('+' | '-') unary | atom
//! atom   := number | '(' expr ')'
//! number := digits ['.' digits] [('e' | 'E') ['+' | '-'] digits]
//! ```
//!
//! `*` and `/` bind tighter than `+` and `-`; operators of equal precedence
//! associate to the left. Whitespace between tokens is ignored. Evaluation
//! happens in `f64`. Anything outside the grammar, division by zero, and
//! non-finite results are errors.

use crate::error::{StoreError, StoreResult};

const MAX_NESTING: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Token {
    Number(f64),
    Plus,
    Minus,
    Star,
    Slash,
    Open,
    Close,
}

/// Evaluate `expression` according to the module grammar
///
/// # Example
///
/// ```
/// use propstore_core::expression::evaluate;
///
/// assert_eq!(evaluate("60 * 5").unwrap(), 300.0);
/// assert_eq!(evaluate("(1 + 2) * -3").unwrap(), -9.0);
/// assert!(evaluate("2 ^ 3").is_err());
/// ```
pub fn evaluate(expression: &str) -> StoreResult<f64> {
    let tokens = tokenize(expression)?;
    if tokens.is_empty() {
        return Err(StoreError::numeric(expression, "empty expression"));
    }

    let mut parser = Parser {
        source: expression,
        tokens: &tokens,
        pos: 0,
        depth: 0,
    };
    let value = parser.expr()?;
    if parser.pos < tokens.len() {
        return Err(parser.error("unexpected trailing input"));
    }
    if !value.is_finite() {
        return Err(StoreError::numeric(expression, "result is not a finite number"));
    }
    Ok(value)
}

fn tokenize(source: &str) -> StoreResult<Vec<Token>> {
    let bytes = source.as_bytes();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        let c = bytes[i];
        let token = match c {
            b' ' | b'\t' => {
                i += 1;
                continue;
            }
            b'+' => Token::Plus,
            b'-' => Token::Minus,
            b'*' => Token::Star,
            b'/' => Token::Slash,
            b'(' => Token::Open,
            b')' => Token::Close,
            b'0'..=b'9' | b'.' => {
                let end = scan_number(bytes, i);
                let literal = &source[i..end];
                let value = literal.parse::<f64>().map_err(|_| {
                    StoreError::numeric(source, format!("malformed number '{}'", literal))
                })?;
                tokens.push(Token::Number(value));
                i = end;
                continue;
            }
            _ => {
                let unexpected = source[i..].chars().next().unwrap_or('?');
                return Err(StoreError::numeric(
                    source,
                    format!("unexpected character '{}' at offset {}", unexpected, i),
                ));
            }
        };
        tokens.push(token);
        i += 1;
    }

    Ok(tokens)
}

/// End offset of the number literal starting at `start`
fn scan_number(bytes: &[u8], start: usize) -> usize {
    let mut end = start;
    while end < bytes.len() && (bytes[end].is_ascii_digit() || bytes[end] == b'.') {
        end += 1;
    }

    // Exponent only when digits follow, so "2e" is reported as malformed by the caller.
    if end < bytes.len() && (bytes[end] == b'e' || bytes[end] == b'E') {
        let mut exp = end + 1;
        if exp < bytes.len() && (bytes[exp] == b'+' || bytes[exp] == b'-') {
            exp += 1;
        }
        if exp < bytes.len() && bytes[exp].is_ascii_digit() {
            while exp < bytes.len() && bytes[exp].is_ascii_digit() {
                exp += 1;
            }
            end = exp;
        }
    }
    end
}

struct Parser<'a> {
    source: &'a str,
    tokens: &'a [Token],
    pos: usize,
    depth: usize,
}

impl Parser<'_> {
    fn peek(&self) -> Option<Token> {
        self.tokens.get(self.pos).copied()
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.peek();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn error(&self, message: &str) -> StoreError {
        StoreError::numeric(self.source, message)
    }

    fn expr(&mut self) -> StoreResult<f64> {
        let mut value = self.term()?;
        while let Some(op @ (Token::Plus | Token::Minus)) = self.peek() {
            self.pos += 1;
            let rhs = self.term()?;
            if op == Token::Plus {
                value += rhs;
            } else {
                value -= rhs;
            }
        }
        Ok(value)
    }

    fn term(&mut self) -> StoreResult<f64> {
        let mut value = self.unary()?;
        while let Some(op @ (Token::Star | Token::Slash)) = self.peek() {
            self.pos += 1;
            let rhs = self.unary()?;
            if op == Token::Star {
                value *= rhs;
            } else {
                if rhs == 0.0 {
                    return Err(self.error("division by zero"));
                }
                value /= rhs;
            }
        }
        Ok(value)
    }

    fn unary(&mut self) -> StoreResult<f64> {
        match self.peek() {
            Some(Token::Plus) => {
                self.pos += 1;
                self.nested(Self::unary)
            }
            Some(Token::Minus) => {
                self.pos += 1;
                Ok(-self.nested(Self::unary)?)
            }
            _ => self.atom(),
        }
    }

    fn atom(&mut self) -> StoreResult<f64> {
        match self.next() {
            Some(Token::Number(value)) => Ok(value),
            Some(Token::Open) => {
                let value = self.nested(Self::expr)?;
                match self.next() {
                    Some(Token::Close) => Ok(value),
                    _ => Err(self.error("missing closing parenthesis")),
                }
            }
            Some(_) => Err(self.error("expected a number or '('")),
            None => Err(self.error("unexpected end of expression")),
        }
    }

    fn nested(&mut self, rule: fn(&mut Self) -> StoreResult<f64>) -> StoreResult<f64> {
        if self.depth >= MAX_NESTING {
            return Err(self.error("expression nested too deeply"));
        }
        self.depth += 1;
        let value = rule(self);
        self.depth -= 1;
        value
    }
}
