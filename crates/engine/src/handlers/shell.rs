// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `shell` (§4.5): renders a script body to a temp file and runs it through
//! an interpreter, standard or custom. Grounded in
//! `original_source/plugins/shell.py`'s `Shell` and its standard-executable
//! table.

use std::sync::Arc;

use pipewright_core::{ExecuteError, ExecutionContext, TaskResult, ValidationError};
use pipewright_procrunner::{ProcessRunner, SpawnRequest};
use pipewright_templating::render;
use serde_yaml::Value as Yaml;
use tracing::error;

use crate::env_overlay::EnvOverlay;
use crate::node::{BuildContext, Execute, HandlerFactory};

struct Interpreter {
    executable: &'static str,
    flags: &'static [&'static str],
    extension: &'static str,
}

/// The standard interpreter table (§4.5): executable, flags to place before
/// the script path, and the file extension the temp file is given.
fn standard_interpreter(key: &str) -> Option<Interpreter> {
    match key {
        "sh" => Some(Interpreter { executable: "/bin/sh", flags: &["-euf"], extension: ".sh" }),
        "bash" => Some(Interpreter {
            executable: "/bin/bash",
            flags: &["-euf", "-o", "pipefail"],
            extension: ".sh",
        }),
        "cmd" => Some(Interpreter {
            executable: r"\Windows\System32\cmd.exe",
            flags: &["/q", "/c"],
            extension: ".bat",
        }),
        "powershell" => Some(Interpreter {
            executable: r"\Windows\System32\WindowsPowerShell\v1.0\powershell.exe",
            flags: &["-Version", "4.0", "-NoLogo", "-NonInteractive", "-WindowStyle", "Hidden", "-File"],
            extension: ".ps1",
        }),
        _ => None,
    }
}

fn default_interpreter_key() -> &'static str {
    if std::env::consts::OS == "windows" {
        "cmd"
    } else {
        "sh"
    }
}

pub struct ShellFactory;

impl HandlerFactory for ShellFactory {
    fn tag(&self) -> &'static str {
        "shell"
    }

    fn build(&self, value: &Yaml, ctx: &BuildContext) -> Result<Box<dyn Execute>, ValidationError> {
        let mapping = value.as_mapping().ok_or_else(|| ValidationError::InvalidNode {
            tag: "shell".to_string(),
            reason: format!("'shell' must be a mapping, got {value:?}"),
        })?;
        let get = |key: &str| mapping.get(Yaml::String(key.to_string()));

        let script = get("script")
            .and_then(|v| v.as_str())
            .ok_or_else(|| ValidationError::InvalidNode {
                tag: "shell".to_string(),
                reason: "'shell.script' is required and must be a string".to_string(),
            })?
            .to_string();

        let executable_key = match get("executable") {
            Some(Yaml::String(s)) => s.clone(),
            Some(other) => {
                return Err(ValidationError::InvalidNode {
                    tag: "shell".to_string(),
                    reason: format!("'shell.executable' must be a string, got {other:?}"),
                })
            }
            None => default_interpreter_key().to_string(),
        };

        let override_flags: Option<Vec<String>> = match get("executable_flags") {
            Some(Yaml::Sequence(items)) => Some(
                items
                    .iter()
                    .map(|v| {
                        v.as_str().map(str::to_string).ok_or_else(|| ValidationError::InvalidNode {
                            tag: "shell".to_string(),
                            reason: format!("'shell.executable_flags' entries must be strings, got {v:?}"),
                        })
                    })
                    .collect::<Result<_, _>>()?,
            ),
            Some(other) => {
                return Err(ValidationError::InvalidNode {
                    tag: "shell".to_string(),
                    reason: format!("'shell.executable_flags' must be a sequence of strings, got {other:?}"),
                })
            }
            None => None,
        };

        let (executable, flags, extension) = match standard_interpreter(&executable_key) {
            Some(interp) => (
                interp.executable.to_string(),
                override_flags.unwrap_or_else(|| interp.flags.iter().map(|s| s.to_string()).collect()),
                interp.extension.to_string(),
            ),
            None => (executable_key, override_flags.unwrap_or_default(), String::new()),
        };

        Ok(Box::new(Shell {
            script,
            executable,
            flags,
            extension,
            runner: Arc::clone(&ctx.runner),
            env: Arc::clone(&ctx.env),
        }))
    }
}

struct Shell {
    script: String,
    executable: String,
    flags: Vec<String>,
    extension: String,
    runner: Arc<ProcessRunner>,
    env: Arc<EnvOverlay>,
}

impl Execute for Shell {
    fn execute(&self, ctx: &mut ExecutionContext) -> Result<TaskResult, ExecuteError> {
        let rendered = render(&self.script, ctx.variables.top())?;

        let file = tempfile::Builder::new().suffix(&self.extension).tempfile()?;
        std::fs::write(file.path(), &rendered)?;

        let mut argv = vec![self.executable.clone()];
        argv.extend(self.flags.iter().cloned());
        argv.push(file.path().to_string_lossy().into_owned());

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
                error!(exit_code, executable = %self.executable, "shell process terminated");
                Ok(TaskResult::failure().with_extra("exit_code", serde_json::Value::from(exit_code)))
            }
            Err(other) => Err(other),
        }
    }
}

#[cfg(test)]
#[path = "shell_tests.rs"]
mod tests;
