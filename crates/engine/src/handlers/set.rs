// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `set` (§4.5): binds literal values into the current frame, unrendered.
//! Grounded in `original_source/plugins/set.py`'s `Set` — values are stored
//! as-is; only a later read through the variable store renders them.

use pipewright_core::{ExecuteError, ExecutionContext, StoredValue, TaskResult, ValidationError};
use serde_yaml::Value as Yaml;

use crate::node::{BuildContext, Execute, HandlerFactory};
use crate::yaml::yaml_to_json;

pub struct SetFactory;

impl HandlerFactory for SetFactory {
    fn tag(&self) -> &'static str {
        "set"
    }

    fn build(&self, value: &Yaml, _ctx: &BuildContext) -> Result<Box<dyn Execute>, ValidationError> {
        let mapping = value.as_mapping().ok_or_else(|| ValidationError::InvalidNode {
            tag: "set".to_string(),
            reason: format!("'set' must be a mapping, got {value:?}"),
        })?;
        let mut entries = Vec::with_capacity(mapping.len());
        for (k, v) in mapping {
            let key = k.as_str().ok_or_else(|| ValidationError::InvalidNode {
                tag: "set".to_string(),
                reason: format!("'set' keys must be strings, got {k:?}"),
            })?;
            entries.push((key.to_string(), yaml_to_json(v)));
        }
        Ok(Box::new(Set { entries }))
    }
}

struct Set {
    entries: Vec<(String, serde_json::Value)>,
}

impl Execute for Set {
    fn execute(&self, ctx: &mut ExecutionContext) -> Result<TaskResult, ExecuteError> {
        for (key, value) in &self.entries {
            ctx.variables
                .top_mut()
                .insert(key.clone(), StoredValue::from(value.clone()));
        }
        Ok(TaskResult::success())
    }
}

#[cfg(test)]
#[path = "set_tests.rs"]
mod tests;
