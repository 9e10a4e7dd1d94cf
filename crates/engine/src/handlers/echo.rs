// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `echo` (§4.5): renders `text`, logs each line, always `success`.
//! Grounded in `original_source/plugins/echo.py`'s `Echo`.

use pipewright_core::{ExecuteError, ExecutionContext, TaskResult, ValidationError};
use pipewright_templating::render;
use serde_yaml::Value as Yaml;
use tracing::info;

use crate::node::{BuildContext, Execute, HandlerFactory};

pub struct EchoFactory;

impl HandlerFactory for EchoFactory {
    fn tag(&self) -> &'static str {
        "echo"
    }

    fn build(&self, value: &Yaml, _ctx: &BuildContext) -> Result<Box<dyn Execute>, ValidationError> {
        let text = value
            .as_str()
            .ok_or_else(|| ValidationError::InvalidNode {
                tag: "echo".to_string(),
                reason: format!("'echo' must be a string, got {value:?}"),
            })?
            .to_string();
        Ok(Box::new(Echo { text }))
    }
}

struct Echo {
    text: String,
}

impl Execute for Echo {
    fn execute(&self, ctx: &mut ExecutionContext) -> Result<TaskResult, ExecuteError> {
        let rendered = render(&self.text, ctx.variables.top())?;
        for line in rendered.split('\n') {
            info!("| {line}");
        }
        Ok(TaskResult::success().with_stdout(rendered))
    }
}

#[cfg(test)]
#[path = "echo_tests.rs"]
mod tests;
