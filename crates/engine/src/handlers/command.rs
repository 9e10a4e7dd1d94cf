// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `command` (§4.5): renders the command line, splits it POSIX-style, and
//! runs it directly (no shell in between). Grounded in
//! `original_source/plugins/command.py`'s `Command`. A terminated process
//! (timeout or missing binary) is logged and converted to `failure` rather
//! than propagated, matching the original's behavior of always reporting a
//! task-level result instead of raising.

use std::sync::Arc;

use pipewright_core::{ExecuteError, ExecutionContext, TaskResult, ValidationError};
use pipewright_procrunner::{ProcessRunner, SpawnRequest};
use pipewright_templating::render;
use serde_yaml::Value as Yaml;
use tracing::error;

use crate::env_overlay::EnvOverlay;
use crate::node::{BuildContext, Execute, HandlerFactory};
use crate::tokenize;

pub struct CommandFactory;

impl HandlerFactory for CommandFactory {
    fn tag(&self) -> &'static str {
        "command"
    }

    fn build(&self, value: &Yaml, ctx: &BuildContext) -> Result<Box<dyn Execute>, ValidationError> {
        let cmd = value
            .as_str()
            .ok_or_else(|| ValidationError::InvalidNode {
                tag: "command".to_string(),
                reason: format!("'command' must be a string, got {value:?}"),
            })?
            .to_string();
        Ok(Box::new(Command {
            cmd,
            runner: Arc::clone(&ctx.runner),
            env: Arc::clone(&ctx.env),
        }))
    }
}

struct Command {
    cmd: String,
    runner: Arc<ProcessRunner>,
    env: Arc<EnvOverlay>,
}

impl Execute for Command {
    fn execute(&self, ctx: &mut ExecutionContext) -> Result<TaskResult, ExecuteError> {
        let rendered = render(&self.cmd, ctx.variables.top())?;
        let argv = tokenize::split(&rendered)
            .map_err(|e| ExecuteError::Io(std::io::Error::new(std::io::ErrorKind::InvalidInput, e.0)))?;
        let (env_set, env_remove) = self.env.snapshot();
        let outcome = self.runner.run(SpawnRequest {
            argv,
            cwd: None,
            timeout: None,
            capture_stdout: true,
            silent: false,
            env_set,
            env_remove,
        });
        match outcome.into_result() {
            Ok(result) => Ok(result),
            Err(ExecuteError::ProcessTerminated { exit_code }) => {
                error!(exit_code, command = %rendered, "command process terminated");
                Ok(TaskResult::failure().with_extra("exit_code", serde_json::Value::from(exit_code)))
            }
            Err(other) => Err(other),
        }
    }
}

#[cfg(test)]
#[path = "command_tests.rs"]
mod tests;
