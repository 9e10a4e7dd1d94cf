// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `fail` (§4.5): renders `message`, logs an error, returns `failure`.
//! Grounded in `original_source/plugins/__init__.py`'s `Fail`.

use pipewright_core::{ExecuteError, ExecutionContext, TaskResult, ValidationError};
use pipewright_templating::render;
use serde_yaml::Value as Yaml;
use tracing::error;

use crate::node::{BuildContext, Execute, HandlerFactory};

pub struct FailFactory;

impl HandlerFactory for FailFactory {
    fn tag(&self) -> &'static str {
        "fail"
    }

    fn build(&self, value: &Yaml, _ctx: &BuildContext) -> Result<Box<dyn Execute>, ValidationError> {
        let message = match value {
            Yaml::String(s) => s.clone(),
            Yaml::Null => String::new(),
            other => {
                return Err(ValidationError::InvalidNode {
                    tag: "fail".to_string(),
                    reason: format!("'fail' must be a string, got {other:?}"),
                })
            }
        };
        Ok(Box::new(Fail { message }))
    }
}

struct Fail {
    message: String,
}

impl Execute for Fail {
    fn execute(&self, ctx: &mut ExecutionContext) -> Result<TaskResult, ExecuteError> {
        let rendered = render(&self.message, ctx.variables.top())?;
        error!("| {rendered}");
        Ok(TaskResult::failure().with_stdout(rendered))
    }
}

#[cfg(test)]
#[path = "fail_tests.rs"]
mod tests;
