// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Boolean expression evaluation for `when` gates and the `continue`
//! handler's condition list.
//!
//! A `when` value arrives as either a pre-evaluated literal boolean (already
//! resolved by the document loader, e.g. a bare YAML `true`) or a template
//! string. The literal case passes straight through. The string case is
//! rejected outright if it still contains an unexpanded `{{`/`}}`/`{%`/`%}`
//! directive after rendering — a `when` expression is never itself a nested
//! template, only the *identifiers inside it* are. What survives rendering
//! is parsed by a small whitelist grammar: comparisons, `and`/`or`/`not`,
//! parentheses, `in`, and literals/identifiers resolved against the current
//! frame.

use pipewright_core::Frame;
use serde_json::Value;

use crate::error::TemplateError;
use crate::render::{contains_directive, lookup_json, render};

/// A `when` value as read off a document node.
#[derive(Debug, Clone)]
pub enum BoolExpr {
    Literal(bool),
    Template(String),
}

impl BoolExpr {
    pub fn evaluate(&self, bindings: &Frame) -> Result<bool, TemplateError> {
        match self {
            BoolExpr::Literal(b) => Ok(*b),
            BoolExpr::Template(s) => evaluate_str(s, bindings),
        }
    }
}

/// Render then evaluate `expr` as a boolean expression.
pub fn evaluate_str(expr: &str, bindings: &Frame) -> Result<bool, TemplateError> {
    let rendered = render(expr, bindings)?;
    if contains_directive(&rendered) {
        return Err(TemplateError::InvalidExpression(format!(
            "expression did not fully render: {rendered}"
        )));
    }
    let mut parser = BoolParser { src: rendered.trim(), pos: 0, bindings };
    let value = parser.parse_or()?;
    parser.skip_ws();
    if parser.pos != parser.src.len() {
        return Err(TemplateError::InvalidExpression(format!(
            "trailing input in expression: {}",
            &parser.src[parser.pos..]
        )));
    }
    Ok(truthy(&value))
}

fn truthy(v: &Value) -> bool {
    match v {
        Value::Bool(b) => *b,
        Value::Null => false,
        Value::String(s) => !s.is_empty(),
        Value::Number(n) => n.as_f64().unwrap_or(0.0) != 0.0,
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

struct BoolParser<'a> {
    src: &'a str,
    pos: usize,
    bindings: &'a Frame,
}

impl<'a> BoolParser<'a> {
    fn skip_ws(&mut self) {
        while self.src[self.pos..].starts_with(|c: char| c.is_whitespace()) {
            self.pos += 1;
        }
    }

    fn bump_word(&mut self, word: &str) -> bool {
        self.skip_ws();
        let rest = &self.src[self.pos..];
        if rest.starts_with(word) {
            let after = &rest[word.len()..];
            let boundary = after.chars().next().map(|c| !c.is_alphanumeric() && c != '_').unwrap_or(true);
            if boundary {
                self.pos += word.len();
                return true;
            }
        }
        false
    }

    fn bump(&mut self, token: &str) -> bool {
        self.skip_ws();
        if self.src[self.pos..].starts_with(token) {
            self.pos += token.len();
            true
        } else {
            false
        }
    }

    fn parse_or(&mut self) -> Result<Value, TemplateError> {
        let mut lhs = self.parse_and()?;
        loop {
            self.skip_ws();
            if self.bump_word("or") {
                let rhs = self.parse_and()?;
                lhs = Value::Bool(truthy(&lhs) || truthy(&rhs));
            } else {
                break;
            }
        }
        Ok(lhs)
    }

    fn parse_and(&mut self) -> Result<Value, TemplateError> {
        let mut lhs = self.parse_not()?;
        loop {
            self.skip_ws();
            if self.bump_word("and") {
                let rhs = self.parse_not()?;
                lhs = Value::Bool(truthy(&lhs) && truthy(&rhs));
            } else {
                break;
            }
        }
        Ok(lhs)
    }

    fn parse_not(&mut self) -> Result<Value, TemplateError> {
        self.skip_ws();
        if self.bump_word("not") {
            let inner = self.parse_not()?;
            return Ok(Value::Bool(!truthy(&inner)));
        }
        self.parse_comparison()
    }

    fn parse_comparison(&mut self) -> Result<Value, TemplateError> {
        let lhs = self.parse_atom()?;
        self.skip_ws();
        for op in ["==", "!=", "<=", ">=", "<", ">"] {
            if self.bump(op) {
                let rhs = self.parse_atom()?;
                return Ok(Value::Bool(compare(op, &lhs, &rhs)));
            }
        }
        if self.bump_word("in") {
            let rhs = self.parse_atom()?;
            return Ok(Value::Bool(contains(&rhs, &lhs)));
        }
        Ok(lhs)
    }

    fn parse_atom(&mut self) -> Result<Value, TemplateError> {
        self.skip_ws();
        if self.bump("(") {
            let inner = self.parse_or()?;
            self.skip_ws();
            if !self.bump(")") {
                return Err(TemplateError::InvalidExpression("expected ')'".to_string()));
            }
            return Ok(inner);
        }
        if self.bump_word("true") || self.bump_word("True") {
            return Ok(Value::Bool(true));
        }
        if self.bump_word("false") || self.bump_word("False") {
            return Ok(Value::Bool(false));
        }
        if self.src[self.pos..].starts_with(['"', '\'']) {
            return self.parse_string();
        }
        if self.src[self.pos..].starts_with(|c: char| c.is_ascii_digit() || c == '-') {
            return self.parse_number();
        }
        self.parse_identifier()
    }

    fn parse_string(&mut self) -> Result<Value, TemplateError> {
        let quote = self.src[self.pos..].chars().next().unwrap_or('"');
        self.pos += quote.len_utf8();
        let start = self.pos;
        while let Some(c) = self.src[self.pos..].chars().next() {
            if c == quote {
                break;
            }
            self.pos += c.len_utf8();
        }
        let text = self.src[start..self.pos].to_string();
        self.pos += quote.len_utf8();
        Ok(Value::String(text))
    }

    fn parse_number(&mut self) -> Result<Value, TemplateError> {
        let start = self.pos;
        if self.src[self.pos..].starts_with('-') {
            self.pos += 1;
        }
        while self.src[self.pos..].starts_with(|c: char| c.is_ascii_digit() || c == '.') {
            self.pos += 1;
        }
        let text = &self.src[start..self.pos];
        text.parse::<f64>()
            .map(Value::from)
            .map_err(|_| TemplateError::InvalidExpression(format!("invalid number: {text}")))
    }

    fn parse_identifier(&mut self) -> Result<Value, TemplateError> {
        let start = self.pos;
        while self.src[self.pos..]
            .starts_with(|c: char| c.is_alphanumeric() || c == '_' || c == '.')
        {
            self.pos += 1;
        }
        if self.pos == start {
            return Err(TemplateError::InvalidExpression(format!(
                "unexpected character at byte {}",
                self.pos
            )));
        }
        let path = &self.src[start..self.pos];
        lookup_json(path, self.bindings)
    }
}

fn compare(op: &str, lhs: &Value, rhs: &Value) -> bool {
    match op {
        "==" => lhs == rhs,
        "!=" => lhs != rhs,
        _ => match (lhs.as_f64(), rhs.as_f64()) {
            (Some(a), Some(b)) => match op {
                "<" => a < b,
                "<=" => a <= b,
                ">" => a > b,
                ">=" => a >= b,
                _ => false,
            },
            _ => false,
        },
    }
}

fn contains(haystack: &Value, needle: &Value) -> bool {
    match haystack {
        Value::Array(items) => items.contains(needle),
        Value::String(s) => match needle {
            Value::String(n) => s.contains(n.as_str()),
            _ => false,
        },
        Value::Object(map) => match needle {
            Value::String(n) => map.contains_key(n),
            _ => false,
        },
        _ => false,
    }
}

#[cfg(test)]
#[path = "boolean_tests.rs"]
mod tests;
