// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The `with_items` decorator (§4.4 step 3): either a document-provided
//! sequence or a string rendered then safely evaluated via the whitelisted
//! literal grammar.

use pipewright_core::{ExecuteError, Frame, ValidationError};
use pipewright_templating::{eval_literal, render};
use serde_yaml::Value as Yaml;

use crate::yaml::yaml_to_json;

pub enum WithItems {
    Literal(Vec<serde_json::Value>),
    Template(String),
}

impl WithItems {
    pub fn from_yaml(value: &Yaml) -> Result<Self, ValidationError> {
        match value {
            Yaml::Sequence(items) => Ok(WithItems::Literal(items.iter().map(yaml_to_json).collect())),
            Yaml::String(s) => Ok(WithItems::Template(s.clone())),
            other => Err(ValidationError::InvalidNode {
                tag: "with_items".to_string(),
                reason: format!("unsupported with_items value: {other:?}"),
            }),
        }
    }

    /// Resolve to the concrete item list against the current frame,
    /// rendering and safely evaluating the string form if needed. A
    /// rendered expression that isn't a list is treated as a single item.
    pub fn resolve(&self, bindings: &Frame) -> Result<Vec<serde_json::Value>, ExecuteError> {
        match self {
            WithItems::Literal(items) => Ok(items.clone()),
            WithItems::Template(s) => {
                let rendered = render(s, bindings)?;
                let value = eval_literal(&rendered)?;
                match value {
                    serde_json::Value::Array(items) => Ok(items),
                    other => Ok(vec![other]),
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "with_items_tests.rs"]
mod tests;
