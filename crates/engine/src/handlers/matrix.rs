// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `matrix` (§4.5): runs its child tasks once per tag, binding `matrix_tag`
//! and an accumulating `matrix_list` into a fresh scope per iteration, and
//! optionally setting environment variables for the duration of each
//! iteration. Grounded in `original_source/plugins/matrix.py`'s `Matrix`,
//! expanded per the positional glob tag-filter interpretation.

use std::sync::Arc;

use pipewright_core::{ExecuteError, ExecutionContext, Outcome, StoredValue, TaskResult, ValidationError};
use pipewright_templating::render;
use serde_yaml::Value as Yaml;
use tracing::debug;

use crate::env_overlay::EnvOverlay;
use crate::node::{self, BuildContext, Execute, HandlerFactory, Node};

/// One matrix entry: a tag plus the (unrendered) environment templates set
/// for the duration of its iteration. The bare-list form carries no env
/// templates.
enum MatrixTags {
    List(Vec<String>),
    Mapping(Vec<(String, Vec<(String, String)>)>),
}

impl MatrixTags {
    fn entries(&self) -> Vec<(String, Vec<(String, String)>)> {
        match self {
            MatrixTags::List(tags) => tags.iter().map(|t| (t.clone(), Vec::new())).collect(),
            MatrixTags::Mapping(entries) => entries.clone(),
        }
    }
}

pub struct MatrixFactory;

impl HandlerFactory for MatrixFactory {
    fn tag(&self) -> &'static str {
        "matrix"
    }

    fn build(&self, value: &Yaml, ctx: &BuildContext) -> Result<Box<dyn Execute>, ValidationError> {
        let mapping = value.as_mapping().ok_or_else(|| ValidationError::InvalidNode {
            tag: "matrix".to_string(),
            reason: format!("'matrix' must be a mapping, got {value:?}"),
        })?;
        let get = |key: &str| mapping.get(Yaml::String(key.to_string()));

        let tags_value = get("tags").ok_or_else(|| ValidationError::InvalidNode {
            tag: "matrix".to_string(),
            reason: "'matrix.tags' is required".to_string(),
        })?;
        let tags = match tags_value {
            Yaml::Sequence(items) => {
                let names = items
                    .iter()
                    .map(|v| {
                        v.as_str().map(str::to_string).ok_or_else(|| ValidationError::InvalidNode {
                            tag: "matrix".to_string(),
                            reason: format!("'matrix.tags' entries must be strings, got {v:?}"),
                        })
                    })
                    .collect::<Result<_, _>>()?;
                MatrixTags::List(names)
            }
            Yaml::Mapping(map) => {
                let mut entries = Vec::with_capacity(map.len());
                for (tag, envs) in map {
                    let tag_name = tag.as_str().ok_or_else(|| ValidationError::InvalidNode {
                        tag: "matrix".to_string(),
                        reason: format!("'matrix.tags' keys must be strings, got {tag:?}"),
                    })?;
                    let env_mapping = envs.as_mapping().ok_or_else(|| ValidationError::InvalidNode {
                        tag: "matrix".to_string(),
                        reason: format!("'matrix.tags.{tag_name}' must be a mapping, got {envs:?}"),
                    })?;
                    let mut env_pairs = Vec::with_capacity(env_mapping.len());
                    for (k, v) in env_mapping {
                        let key = k.as_str().ok_or_else(|| ValidationError::InvalidNode {
                            tag: "matrix".to_string(),
                            reason: format!("'matrix.tags.{tag_name}' keys must be strings, got {k:?}"),
                        })?;
                        let val = v.as_str().ok_or_else(|| ValidationError::InvalidNode {
                            tag: "matrix".to_string(),
                            reason: format!("'matrix.tags.{tag_name}' values must be strings, got {v:?}"),
                        })?;
                        env_pairs.push((key.to_string(), val.to_string()));
                    }
                    entries.push((tag_name.to_string(), env_pairs));
                }
                MatrixTags::Mapping(entries)
            }
            other => {
                return Err(ValidationError::InvalidNode {
                    tag: "matrix".to_string(),
                    reason: format!("'matrix.tags' must be a sequence or mapping, got {other:?}"),
                })
            }
        };

        let tasks = get("tasks").ok_or_else(|| ValidationError::InvalidNode {
            tag: "matrix".to_string(),
            reason: "'matrix.tasks' is required".to_string(),
        })?;
        let children = ctx.build_children(tasks, "matrix")?;

        Ok(Box::new(Matrix {
            tags,
            children,
            env: Arc::clone(&ctx.env),
        }))
    }
}

struct Matrix {
    tags: MatrixTags,
    children: Vec<Node>,
    env: Arc<EnvOverlay>,
}

/// A matrix nesting depth's glob pattern rejects the tag at that position;
/// no pattern at that depth means "no filter" (§4 open question, resolved
/// positionally). A malformed pattern is treated as a non-match.
fn tag_filter_skips(patterns: &[String], matrix_list: &[String]) -> bool {
    for (depth, tag) in matrix_list.iter().enumerate() {
        let Some(pattern) = patterns.get(depth) else { continue };
        match glob::Pattern::new(pattern) {
            Ok(compiled) if compiled.matches(tag) => {}
            Ok(_) => return true,
            Err(e) => {
                tracing::warn!(pattern, error = %e, "invalid matrix tag filter pattern, treating as non-match");
                return true;
            }
        }
    }
    false
}

impl Execute for Matrix {
    fn execute(&self, ctx: &mut ExecutionContext) -> Result<TaskResult, ExecuteError> {
        let mut last = TaskResult::success();

        for (tag, env_templates) in self.tags.entries() {
            let mut rendered_keys = Vec::with_capacity(env_templates.len());
            let mut render_err = None;
            for (key, template) in &env_templates {
                match render(template, ctx.variables.top()).map_err(ExecuteError::from) {
                    Ok(value) => {
                        self.env.set(key.clone(), value);
                        rendered_keys.push(key.clone());
                    }
                    Err(e) => {
                        render_err = Some(e);
                        break;
                    }
                }
            }
            if let Some(e) = render_err {
                self.env.unset(&rendered_keys);
                return Err(e);
            }

            debug!("Beginning matrix entry: {tag}");
            // Captured without `?` so `self.env.unset` below runs on every exit
            // path — an `Err` from `run_children` must not leave this
            // iteration's env overlay mutations applied to later iterations.
            let outcome = ctx.scoped(|ctx| -> Result<TaskResult, ExecuteError> {
                let frame = ctx.variables.top_mut();
                frame.insert("matrix_tag".to_string(), StoredValue::from(serde_json::json!(tag)));
                let mut matrix_list: Vec<String> = frame
                    .get("matrix_list")
                    .map(|v| v.to_json())
                    .and_then(|v| serde_json::from_value(v).ok())
                    .unwrap_or_default();
                matrix_list.push(tag.clone());
                frame.insert(
                    "matrix_list".to_string(),
                    StoredValue::from(serde_json::to_value(&matrix_list).unwrap_or(serde_json::Value::Null)),
                );

                if tag_filter_skips(&ctx.matrix_tag_patterns, &matrix_list) {
                    return Ok(TaskResult::skipped());
                }

                node::run_children(&self.children, ctx)
            });
            debug!("Completed matrix entry: {tag}");

            self.env.unset(&rendered_keys);

            let result = outcome?;
            let failed = result.outcome == Outcome::Failure;
            last = result;
            if failed {
                break;
            }
        }

        Ok(normalize_boundary(last))
    }
}

fn normalize_boundary(result: TaskResult) -> TaskResult {
    match result.outcome {
        Outcome::Skipped | Outcome::Continue => TaskResult::success(),
        _ => result,
    }
}

#[cfg(test)]
#[path = "matrix_tests.rs"]
mod tests;
