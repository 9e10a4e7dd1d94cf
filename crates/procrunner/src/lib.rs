// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! pipewright-procrunner: a synchronous-from-the-caller wrapper over an
//! async child-process core, per §4.2/§5. A single [`ProcessRunner`] owns a
//! background event-loop thread for the lifetime of the CLI process; every
//! `command`/`shell` invocation posts a [`exec::SpawnRequest`] to it and
//! blocks until the reply arrives.

mod exec;
mod loop_thread;

pub use exec::{SpawnRequest, BINARY_NOT_FOUND_EXIT_CODE, TIMEOUT_EXIT_CODE};
pub use loop_thread::ProcessRunner;

use pipewright_core::{ExecuteError, TaskResult};

/// Raw outcome of one child-process run, before translation into a
/// [`TaskResult`]/[`ExecuteError`].
#[derive(Debug, Clone)]
pub struct ProcRunnerOutcome {
    pub exit_code: i32,
    pub stdout: Option<String>,
}

impl ProcRunnerOutcome {
    pub fn terminated(exit_code: i32) -> Self {
        ProcRunnerOutcome { exit_code, stdout: None }
    }

    /// Translate into the handler-facing contract: exit 0 is `success`;
    /// `TIMEOUT_EXIT_CODE`/`BINARY_NOT_FOUND_EXIT_CODE` are raised as
    /// `ExecuteError::ProcessTerminated`; anything else is a `failure`
    /// `TaskResult` carrying the captured stdout, per §4.5's `command`.
    pub fn into_result(self) -> Result<TaskResult, ExecuteError> {
        match self.exit_code {
            0 => {
                let mut result = TaskResult::success();
                if let Some(stdout) = self.stdout {
                    result = result.with_stdout(stdout);
                }
                Ok(result)
            }
            TIMEOUT_EXIT_CODE | BINARY_NOT_FOUND_EXIT_CODE => {
                Err(ExecuteError::ProcessTerminated { exit_code: self.exit_code })
            }
            code => {
                let mut result = TaskResult::failure();
                if let Some(stdout) = self.stdout {
                    result = result.with_stdout(stdout);
                }
                Ok(result.with_extra("exit_code", serde_json::Value::from(code)))
            }
        }
    }
}

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
