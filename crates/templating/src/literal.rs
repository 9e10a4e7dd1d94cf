// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Safe literal evaluator for the `with_items` string form (§4.4 step 3,
//! §9 "Safe literal evaluator"). Accepts only numbers, strings, booleans,
//! lists, tuples, dicts, sets, unary/binary arithmetic, comparisons, and the
//! single `OrderedMap(...)` constructor. Anything else — in particular any
//! other function call — is rejected. This is never a general-purpose
//! interpreter: there is no variable lookup, no attribute access, no
//! arbitrary call.

use serde_json::{Map, Value};

use crate::error::TemplateError;

/// Parse `input` as a whitelisted literal expression and return its value as
/// a `serde_json::Value`. Lists/tuples/sets all become JSON arrays (sets are
/// de-duplicated); dicts and `OrderedMap(...)` become JSON objects.
pub fn eval_literal(input: &str) -> Result<Value, TemplateError> {
    let mut parser = Parser::new(input);
    let value = parser.parse_expr()?;
    parser.skip_ws();
    if !parser.at_end() {
        return Err(TemplateError::InvalidExpression(format!(
            "trailing input at byte {}",
            parser.pos
        )));
    }
    Ok(value)
}

struct Parser<'a> {
    src: &'a [u8],
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(src: &'a str) -> Self {
        Parser { src: src.as_bytes(), pos: 0 }
    }

    fn at_end(&self) -> bool {
        self.pos >= self.src.len()
    }

    fn peek(&self) -> Option<u8> {
        self.src.get(self.pos).copied()
    }

    fn skip_ws(&mut self) {
        while matches!(self.peek(), Some(b' ' | b'\t' | b'\n' | b'\r')) {
            self.pos += 1;
        }
    }

    fn bump_if(&mut self, literal: &str) -> bool {
        self.skip_ws();
        if self.src[self.pos..].starts_with(literal.as_bytes()) {
            self.pos += literal.len();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, literal: &str) -> Result<(), TemplateError> {
        if self.bump_if(literal) {
            Ok(())
        } else {
            Err(TemplateError::InvalidExpression(format!(
                "expected '{literal}' at byte {}",
                self.pos
            )))
        }
    }

    // expr := comparison
    fn parse_expr(&mut self) -> Result<Value, TemplateError> {
        self.parse_comparison()
    }

    fn parse_comparison(&mut self) -> Result<Value, TemplateError> {
        let lhs = self.parse_additive()?;
        self.skip_ws();
        for op in ["==", "!=", "<=", ">=", "<", ">"] {
            if self.bump_if(op) {
                let rhs = self.parse_additive()?;
                return Ok(Value::Bool(compare(op, &lhs, &rhs)?));
            }
        }
        Ok(lhs)
    }

    fn parse_additive(&mut self) -> Result<Value, TemplateError> {
        let mut lhs = self.parse_multiplicative()?;
        loop {
            self.skip_ws();
            if self.bump_if("+") {
                let rhs = self.parse_multiplicative()?;
                lhs = arith("+", &lhs, &rhs)?;
            } else if self.bump_if("-") {
                let rhs = self.parse_multiplicative()?;
                lhs = arith("-", &lhs, &rhs)?;
            } else {
                break;
            }
        }
        Ok(lhs)
    }

    fn parse_multiplicative(&mut self) -> Result<Value, TemplateError> {
        let mut lhs = self.parse_unary()?;
        loop {
            self.skip_ws();
            if self.bump_if("*") {
                let rhs = self.parse_unary()?;
                lhs = arith("*", &lhs, &rhs)?;
            } else if self.bump_if("/") {
                let rhs = self.parse_unary()?;
                lhs = arith("/", &lhs, &rhs)?;
            } else {
                break;
            }
        }
        Ok(lhs)
    }

    fn parse_unary(&mut self) -> Result<Value, TemplateError> {
        self.skip_ws();
        if self.bump_if("-") {
            let inner = self.parse_unary()?;
            return match inner {
                Value::Number(n) if n.is_i64() => {
                    Ok(Value::from(-n.as_i64().unwrap_or_default()))
                }
                Value::Number(n) => Ok(Value::from(-n.as_f64().unwrap_or_default())),
                other => Err(TemplateError::InvalidExpression(format!(
                    "cannot negate {other}"
                ))),
            };
        }
        self.parse_primary()
    }

    fn parse_primary(&mut self) -> Result<Value, TemplateError> {
        self.skip_ws();
        match self.peek() {
            Some(b'(') => self.parse_tuple_or_paren(),
            Some(b'[') => self.parse_list(),
            Some(b'{') => self.parse_dict_or_set(),
            Some(b'"') | Some(b'\'') => self.parse_string().map(Value::String),
            Some(c) if c.is_ascii_digit() => self.parse_number(),
            _ => self.parse_keyword_or_constructor(),
        }
    }

    fn parse_tuple_or_paren(&mut self) -> Result<Value, TemplateError> {
        self.expect("(")?;
        let mut items = Vec::new();
        let mut saw_comma = false;
        self.skip_ws();
        if !self.bump_if(")") {
            loop {
                items.push(self.parse_expr()?);
                self.skip_ws();
                if self.bump_if(",") {
                    saw_comma = true;
                    self.skip_ws();
                    if self.bump_if(")") {
                        break;
                    }
                } else {
                    self.expect(")")?;
                    break;
                }
            }
        }
        if !saw_comma && items.len() == 1 {
            return Ok(items.into_iter().next().unwrap_or(Value::Null));
        }
        Ok(Value::Array(items))
    }

    fn parse_list(&mut self) -> Result<Value, TemplateError> {
        self.expect("[")?;
        let mut items = Vec::new();
        self.skip_ws();
        if !self.bump_if("]") {
            loop {
                items.push(self.parse_expr()?);
                self.skip_ws();
                if self.bump_if(",") {
                    self.skip_ws();
                    if self.bump_if("]") {
                        break;
                    }
                } else {
                    self.expect("]")?;
                    break;
                }
            }
        }
        Ok(Value::Array(items))
    }

    /// `{}` is an empty dict. `{a, b}` (no colons) is a set, folded to an
    /// array with duplicates removed. `{k: v, ...}` is a dict.
    fn parse_dict_or_set(&mut self) -> Result<Value, TemplateError> {
        self.expect("{")?;
        self.skip_ws();
        if self.bump_if("}") {
            return Ok(Value::Object(Map::new()));
        }

        let first_key = self.parse_expr()?;
        self.skip_ws();
        if self.bump_if(":") {
            let mut map = Map::new();
            let first_val = self.parse_expr()?;
            insert_key(&mut map, first_key, first_val)?;
            self.skip_ws();
            while self.bump_if(",") {
                self.skip_ws();
                if self.bump_if("}") {
                    return Ok(Value::Object(map));
                }
                let k = self.parse_expr()?;
                self.expect(":")?;
                let v = self.parse_expr()?;
                insert_key(&mut map, k, v)?;
                self.skip_ws();
            }
            self.expect("}")?;
            Ok(Value::Object(map))
        } else {
            let mut items = vec![first_key];
            self.skip_ws();
            while self.bump_if(",") {
                self.skip_ws();
                if self.bump_if("}") {
                    return Ok(dedup(items));
                }
                items.push(self.parse_expr()?);
                self.skip_ws();
            }
            self.expect("}")?;
            Ok(dedup(items))
        }
    }

    fn parse_string(&mut self) -> Result<String, TemplateError> {
        let quote = self.peek().ok_or_else(|| {
            TemplateError::InvalidExpression("expected string literal".to_string())
        })?;
        self.pos += 1;
        let mut out = String::new();
        loop {
            match self.peek() {
                None => {
                    return Err(TemplateError::InvalidExpression(
                        "unterminated string literal".to_string(),
                    ))
                }
                Some(c) if c == quote => {
                    self.pos += 1;
                    break;
                }
                Some(b'\\') => {
                    self.pos += 1;
                    match self.peek() {
                        Some(b'n') => out.push('\n'),
                        Some(b't') => out.push('\t'),
                        Some(c) => out.push(c as char),
                        None => {
                            return Err(TemplateError::InvalidExpression(
                                "unterminated escape".to_string(),
                            ))
                        }
                    }
                    self.pos += 1;
                }
                Some(c) => {
                    out.push(c as char);
                    self.pos += 1;
                }
            }
        }
        Ok(out)
    }

    fn parse_number(&mut self) -> Result<Value, TemplateError> {
        let start = self.pos;
        while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
            self.pos += 1;
        }
        let mut is_float = false;
        if self.peek() == Some(b'.') {
            is_float = true;
            self.pos += 1;
            while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
                self.pos += 1;
            }
        }
        let text = std::str::from_utf8(&self.src[start..self.pos])
            .map_err(|_| TemplateError::InvalidExpression("invalid number".to_string()))?;
        if is_float {
            let f: f64 = text
                .parse()
                .map_err(|_| TemplateError::InvalidExpression(format!("invalid float: {text}")))?;
            Ok(Value::from(f))
        } else {
            let i: i64 = text
                .parse()
                .map_err(|_| TemplateError::InvalidExpression(format!("invalid int: {text}")))?;
            Ok(Value::from(i))
        }
    }

    fn parse_keyword_or_constructor(&mut self) -> Result<Value, TemplateError> {
        let start = self.pos;
        while matches!(self.peek(), Some(c) if c.is_ascii_alphanumeric() || c == b'_') {
            self.pos += 1;
        }
        let word = std::str::from_utf8(&self.src[start..self.pos]).unwrap_or_default();
        match word {
            "True" | "true" => Ok(Value::Bool(true)),
            "False" | "false" => Ok(Value::Bool(false)),
            "None" | "null" => Ok(Value::Null),
            "OrderedMap" => self.parse_ordered_map(),
            "" => Err(TemplateError::InvalidExpression(format!(
                "unexpected character at byte {}",
                self.pos
            ))),
            other => Err(TemplateError::InvalidExpression(format!(
                "'{other}' is not a whitelisted literal or constructor"
            ))),
        }
    }

    /// `OrderedMap(k=v, ...)` is the sole permitted function call.
    fn parse_ordered_map(&mut self) -> Result<Value, TemplateError> {
        self.expect("(")?;
        let mut map = Map::new();
        self.skip_ws();
        if self.bump_if(")") {
            return Ok(Value::Object(map));
        }
        loop {
            self.skip_ws();
            let key_start = self.pos;
            while matches!(self.peek(), Some(c) if c.is_ascii_alphanumeric() || c == b'_') {
                self.pos += 1;
            }
            let key = std::str::from_utf8(&self.src[key_start..self.pos])
                .unwrap_or_default()
                .to_string();
            if key.is_empty() {
                return Err(TemplateError::InvalidExpression(
                    "OrderedMap() expects keyword arguments".to_string(),
                ));
            }
            self.expect("=")?;
            let value = self.parse_expr()?;
            map.insert(key, value);
            self.skip_ws();
            if self.bump_if(",") {
                self.skip_ws();
                if self.bump_if(")") {
                    break;
                }
            } else {
                self.expect(")")?;
                break;
            }
        }
        Ok(Value::Object(map))
    }
}

fn insert_key(map: &mut Map<String, Value>, key: Value, value: Value) -> Result<(), TemplateError> {
    let key_str = match key {
        Value::String(s) => s,
        other => other.to_string(),
    };
    map.insert(key_str, value);
    Ok(())
}

fn dedup(items: Vec<Value>) -> Value {
    let mut seen = Vec::new();
    for item in items {
        if !seen.iter().any(|s| s == &item) {
            seen.push(item);
        }
    }
    Value::Array(seen)
}

fn arith(op: &str, lhs: &Value, rhs: &Value) -> Result<Value, TemplateError> {
    if let (Value::String(a), Value::String(b)) = (lhs, rhs) {
        if op == "+" {
            return Ok(Value::String(format!("{a}{b}")));
        }
    }
    let (a, b) = (
        lhs.as_f64().ok_or_else(|| non_numeric(lhs))?,
        rhs.as_f64().ok_or_else(|| non_numeric(rhs))?,
    );
    let result = match op {
        "+" => a + b,
        "-" => a - b,
        "*" => a * b,
        "/" => {
            if b == 0.0 {
                return Err(TemplateError::InvalidExpression("division by zero".to_string()));
            }
            a / b
        }
        other => return Err(TemplateError::InvalidExpression(format!("unknown operator {other}"))),
    };
    if lhs.is_i64() && rhs.is_i64() && result.fract() == 0.0 {
        Ok(Value::from(result as i64))
    } else {
        Ok(Value::from(result))
    }
}

fn non_numeric(v: &Value) -> TemplateError {
    TemplateError::InvalidExpression(format!("{v} is not numeric"))
}

fn compare(op: &str, lhs: &Value, rhs: &Value) -> Result<bool, TemplateError> {
    Ok(match op {
        "==" => lhs == rhs,
        "!=" => lhs != rhs,
        "<" | "<=" | ">" | ">=" => {
            let (a, b) = (
                lhs.as_f64().ok_or_else(|| non_numeric(lhs))?,
                rhs.as_f64().ok_or_else(|| non_numeric(rhs))?,
            );
            match op {
                "<" => a < b,
                "<=" => a <= b,
                ">" => a > b,
                _ => a >= b,
            }
        }
        other => {
            return Err(TemplateError::InvalidExpression(format!(
                "unknown comparison operator {other}"
            )))
        }
    })
}

#[cfg(test)]
#[path = "literal_tests.rs"]
mod tests;
