// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `env` (§4.5): accumulates process-environment edits onto the shared
//! [`EnvOverlay`] that later `command`/`shell` spawns read from. Grounded in
//! `original_source/plugins/env.py`'s `Env` — `set` values are stored raw,
//! not re-rendered by this task; `unset` takes glob patterns matched against
//! the current logical environment and is always applied before `set`.

use std::sync::Arc;

use pipewright_core::{ExecuteError, ExecutionContext, TaskResult, ValidationError};
use serde_yaml::Value as Yaml;

use crate::env_overlay::EnvOverlay;
use crate::node::{BuildContext, Execute, HandlerFactory};

pub struct EnvFactory;

impl HandlerFactory for EnvFactory {
    fn tag(&self) -> &'static str {
        "env"
    }

    fn build(&self, value: &Yaml, ctx: &BuildContext) -> Result<Box<dyn Execute>, ValidationError> {
        let mapping = value.as_mapping().ok_or_else(|| ValidationError::InvalidNode {
            tag: "env".to_string(),
            reason: format!("'env' must be a mapping, got {value:?}"),
        })?;
        let get = |key: &str| mapping.get(Yaml::String(key.to_string()));

        let mut set = Vec::new();
        if let Some(value) = get("set") {
            let set_mapping = value.as_mapping().ok_or_else(|| ValidationError::InvalidNode {
                tag: "env".to_string(),
                reason: format!("'env.set' must be a mapping, got {value:?}"),
            })?;
            for (k, v) in set_mapping {
                let key = k.as_str().ok_or_else(|| ValidationError::InvalidNode {
                    tag: "env".to_string(),
                    reason: format!("'env.set' keys must be strings, got {k:?}"),
                })?;
                let val = v.as_str().ok_or_else(|| ValidationError::InvalidNode {
                    tag: "env".to_string(),
                    reason: format!("'env.set' values must be strings, got {v:?}"),
                })?;
                set.push((key.to_string(), val.to_string()));
            }
        }

        let mut unset = Vec::new();
        if let Some(value) = get("unset") {
            let patterns: Vec<String> = match value {
                Yaml::String(s) => vec![s.clone()],
                Yaml::Sequence(items) => items
                    .iter()
                    .map(|v| {
                        v.as_str().map(str::to_string).ok_or_else(|| ValidationError::InvalidNode {
                            tag: "env".to_string(),
                            reason: format!("'env.unset' entries must be strings, got {v:?}"),
                        })
                    })
                    .collect::<Result<_, _>>()?,
                other => {
                    return Err(ValidationError::InvalidNode {
                        tag: "env".to_string(),
                        reason: format!("'env.unset' must be a string or sequence of strings, got {other:?}"),
                    })
                }
            };
            for pattern in patterns {
                let compiled = glob::Pattern::new(&pattern).map_err(|e| ValidationError::InvalidNode {
                    tag: "env".to_string(),
                    reason: format!("invalid glob pattern '{pattern}': {e}"),
                })?;
                unset.push(compiled);
            }
        }

        Ok(Box::new(Env {
            set,
            unset,
            overlay: Arc::clone(&ctx.env),
        }))
    }
}

struct Env {
    set: Vec<(String, String)>,
    unset: Vec<glob::Pattern>,
    overlay: Arc<EnvOverlay>,
}

impl Execute for Env {
    fn execute(&self, _ctx: &mut ExecutionContext) -> Result<TaskResult, ExecuteError> {
        if !self.unset.is_empty() {
            let view = self.overlay.current_view();
            let matched: Vec<String> = view
                .keys()
                .filter(|key| self.unset.iter().any(|pattern| pattern.matches(key)))
                .cloned()
                .collect();
            self.overlay.unset(&matched);
        }

        for (key, value) in &self.set {
            self.overlay.set(key.clone(), value.clone());
        }

        Ok(TaskResult::success())
    }
}

#[cfg(test)]
#[path = "env_tests.rs"]
mod tests;
