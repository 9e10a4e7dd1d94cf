// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `stage` (§4.5): runs a sequence of child tasks, optionally in a fresh
//! variable scope. Grounded in `original_source/plugins/stage.py`'s
//! `Stage` — a `skipped`/`continue` outcome from the last child is
//! normalized to `success` at the stage boundary, so `continue` only ever
//! short-circuits its immediate enclosing grouping, never propagates past it.

use pipewright_core::{ExecuteError, ExecutionContext, Outcome, TaskResult, ValidationError};
use serde_yaml::Value as Yaml;

use crate::node::{self, BuildContext, Execute, HandlerFactory, Node};

pub struct StageFactory;

impl HandlerFactory for StageFactory {
    fn tag(&self) -> &'static str {
        "stage"
    }

    fn build(&self, value: &Yaml, ctx: &BuildContext) -> Result<Box<dyn Execute>, ValidationError> {
        let mapping = value.as_mapping().ok_or_else(|| ValidationError::InvalidNode {
            tag: "stage".to_string(),
            reason: format!("'stage' must be a mapping, got {value:?}"),
        })?;
        let get = |key: &str| mapping.get(Yaml::String(key.to_string()));

        let scope = match get("scope") {
            Some(Yaml::Bool(b)) => *b,
            Some(other) => {
                return Err(ValidationError::InvalidNode {
                    tag: "stage".to_string(),
                    reason: format!("'stage.scope' must be a boolean, got {other:?}"),
                })
            }
            None => true,
        };

        let tasks = get("tasks").ok_or_else(|| ValidationError::InvalidNode {
            tag: "stage".to_string(),
            reason: "'stage.tasks' is required".to_string(),
        })?;
        let children = ctx.build_children(tasks, "stage")?;

        Ok(Box::new(Stage { scope, children }))
    }
}

struct Stage {
    scope: bool,
    children: Vec<Node>,
}

impl Execute for Stage {
    fn execute(&self, ctx: &mut ExecutionContext) -> Result<TaskResult, ExecuteError> {
        let result = if self.scope {
            ctx.scoped(|ctx| node::run_children(&self.children, ctx))?
        } else {
            node::run_children(&self.children, ctx)?
        };
        Ok(normalize_boundary(result))
    }
}

/// `skipped`/`continue` never escape a grouping handler's boundary as
/// anything but `success` (§4.5, §7).
fn normalize_boundary(result: TaskResult) -> TaskResult {
    match result.outcome {
        Outcome::Skipped | Outcome::Continue => TaskResult::success(),
        _ => result,
    }
}

#[cfg(test)]
#[path = "stage_tests.rs"]
mod tests;
