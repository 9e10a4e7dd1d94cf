// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `continue` (§4.5): if any of its `when` conditions holds, short-circuits
//! its enclosing grouping handler successfully (see
//! `crate::node::run_children`). Grounded in
//! `original_source/plugins/cont.py`'s `Continue`.

use pipewright_core::{ExecuteError, ExecutionContext, TaskResult, ValidationError};
use pipewright_templating::BoolExpr;
use serde_yaml::Value as Yaml;

use crate::node::{BuildContext, Execute, HandlerFactory};

pub struct ContinueFactory;

impl HandlerFactory for ContinueFactory {
    fn tag(&self) -> &'static str {
        "continue"
    }

    fn build(&self, value: &Yaml, _ctx: &BuildContext) -> Result<Box<dyn Execute>, ValidationError> {
        let mapping = value.as_mapping().ok_or_else(|| ValidationError::InvalidNode {
            tag: "continue".to_string(),
            reason: format!("'continue' must be a mapping, got {value:?}"),
        })?;
        let when = mapping
            .get(Yaml::String("when".to_string()))
            .ok_or_else(|| ValidationError::InvalidNode {
                tag: "continue".to_string(),
                reason: "'continue.when' is required".to_string(),
            })?;
        let items = when.as_sequence().ok_or_else(|| ValidationError::InvalidNode {
            tag: "continue".to_string(),
            reason: format!("'continue.when' must be a sequence, got {when:?}"),
        })?;
        let conditions = items
            .iter()
            .map(|v| match v {
                Yaml::Bool(b) => Ok(BoolExpr::Literal(*b)),
                Yaml::String(s) => Ok(BoolExpr::Template(s.clone())),
                other => Err(ValidationError::InvalidNode {
                    tag: "continue".to_string(),
                    reason: format!("'continue.when' entries must be booleans or strings, got {other:?}"),
                }),
            })
            .collect::<Result<_, _>>()?;
        Ok(Box::new(ContinueTask { conditions }))
    }
}

struct ContinueTask {
    conditions: Vec<BoolExpr>,
}

impl Execute for ContinueTask {
    fn execute(&self, ctx: &mut ExecutionContext) -> Result<TaskResult, ExecuteError> {
        for condition in &self.conditions {
            if condition.evaluate(ctx.variables.top())? {
                return Ok(TaskResult::continue_());
            }
        }
        Ok(TaskResult::success())
    }
}

#[cfg(test)]
#[path = "continue_task_tests.rs"]
mod tests;
