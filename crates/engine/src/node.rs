// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The Node (AST) entity and the Executor Decorator (§4.4) that wraps every
//! handler instance with the generic execution contract: tag gate, `when`
//! gate, `with_items` loop, attempts/retry loop, register capture.

use std::sync::Arc;
use std::time::{Duration, Instant};

use pipewright_core::{ExecuteError, ExecutionContext, Outcome, StoredValue, TaskResult, ValidationError};
use pipewright_procrunner::ProcessRunner;
use pipewright_templating::BoolExpr;
use serde_yaml::Value as Yaml;
use tracing::{error, info};

use crate::env_overlay::EnvOverlay;
use crate::registry::Registry;
use crate::with_items::WithItems;

/// Document keys every node may carry alongside its single handler key.
/// Excluded from the handler-key substring search (§4.3).
const COMMON_DECORATOR_KEYS: &[&str] = &["name", "when", "with_items", "attempts", "tags", "register"];

/// Anything a [`Node`] can wrap: a leaf task handler or a container
/// (`stage`/`matrix`) that recursively runs its own child nodes.
pub trait Execute: Send + Sync {
    fn execute(&self, ctx: &mut ExecutionContext) -> Result<TaskResult, ExecuteError>;
}

/// Builds an [`Execute`] body from a document node's field value. Registered
/// once per task kind in the [`Registry`] (§4.3).
pub trait HandlerFactory: Send + Sync {
    fn tag(&self) -> &'static str;
    fn build(&self, value: &Yaml, ctx: &BuildContext) -> Result<Box<dyn Execute>, ValidationError>;
}

/// Threaded through node construction: the shared registry for recursive
/// children (`stage`/`matrix`), the tags inherited from any enclosing
/// container, and the process runner `command`/`shell` capture at build
/// time so their [`Execute::execute`] only ever needs an `ExecutionContext`.
pub struct BuildContext<'a> {
    pub registry: &'a Registry,
    pub inherited_tags: Vec<String>,
    pub runner: Arc<ProcessRunner>,
    pub env: Arc<EnvOverlay>,
}

impl<'a> BuildContext<'a> {
    /// Build every entry of a `tasks:` sequence, propagating `inherited_tags`
    /// to each child.
    pub fn build_children(&self, tasks_value: &Yaml, tag: &'static str) -> Result<Vec<Node>, ValidationError> {
        let seq = tasks_value.as_sequence().ok_or_else(|| ValidationError::InvalidNode {
            tag: tag.to_string(),
            reason: "'tasks' must be a sequence".to_string(),
        })?;
        seq.iter()
            .map(|n| {
                build_node(
                    n,
                    self.registry,
                    &self.inherited_tags,
                    Arc::clone(&self.runner),
                    Arc::clone(&self.env),
                )
            })
            .collect()
    }

    /// A child `BuildContext` carrying this node's own (already-inherited)
    /// tags further down, for containers that build children directly
    /// rather than through [`BuildContext::build_children`].
    pub fn nested(&self, inherited_tags: Vec<String>) -> BuildContext<'_> {
        BuildContext {
            registry: self.registry,
            inherited_tags,
            runner: Arc::clone(&self.runner),
            env: Arc::clone(&self.env),
        }
    }
}

/// One entry in the built AST: a handler instance plus the common
/// decorators attached on its enclosing document node (§2, §4.4).
pub struct Node {
    pub name: String,
    pub when: Option<BoolExpr>,
    pub with_items: Option<WithItems>,
    pub attempts: u32,
    pub tags: Vec<String>,
    pub register: Option<String>,
    pub body: Box<dyn Execute>,
}

impl Node {
    /// Run the Executor Decorator contract end to end.
    pub fn run(&self, ctx: &mut ExecutionContext) -> Result<TaskResult, ExecuteError> {
        if ctx.is_tag_gated(&self.tags) {
            return Ok(TaskResult::skipped());
        }

        if let Some(when) = &self.when {
            match when.evaluate(ctx.variables.top()).map_err(ExecuteError::from) {
                Ok(true) => {}
                Ok(false) => return Ok(TaskResult::skipped()),
                Err(ExecuteError::UndefinedVariable(var)) => {
                    return Ok(self.undefined_variable_failure(&var, "when"));
                }
                Err(other) => return Err(other),
            }
        }

        let result = match &self.with_items {
            Some(with_items) => self.run_with_items(ctx, with_items)?,
            None => self.run_attempts(ctx)?,
        };

        if result.outcome != Outcome::Failure {
            if let Some(register) = &self.register {
                ctx.variables
                    .top_mut()
                    .insert(register.clone(), StoredValue::from(result.clone()));
            }
        }

        Ok(result)
    }

    fn run_with_items(
        &self,
        ctx: &mut ExecutionContext,
        with_items: &WithItems,
    ) -> Result<TaskResult, ExecuteError> {
        let items = match with_items.resolve(ctx.variables.top()) {
            Ok(items) => items,
            Err(ExecuteError::UndefinedVariable(var)) => {
                return Ok(self.undefined_variable_failure(&var, "with_items"));
            }
            Err(other) => return Err(other),
        };
        let mut last = TaskResult::success();
        for item in items {
            let attempt = ctx.scoped(|ctx| {
                ctx.variables
                    .top_mut()
                    .insert("item".to_string(), StoredValue::from(item));
                self.run_attempts(ctx)
            })?;
            let failed = attempt.outcome == Outcome::Failure;
            last = attempt;
            if failed {
                break;
            }
        }
        Ok(last)
    }

    /// Retry loop: up to `attempts` invocations, sleeping `count^2` seconds
    /// between a failed attempt and the next (§4.4 step 4).
    fn run_attempts(&self, ctx: &mut ExecutionContext) -> Result<TaskResult, ExecuteError> {
        let attempts = self.attempts.max(1);
        let mut last = TaskResult::success();
        for count in 1..=attempts {
            let start = Instant::now();
            let result = match self.body.execute(ctx) {
                Ok(result) => result,
                Err(ExecuteError::UndefinedVariable(var)) => self.undefined_variable_failure(&var, "body"),
                Err(other) => return Err(other),
            };
            let elapsed = start.elapsed();
            info!(
                name = %self.name,
                attempt = count,
                outcome = %result.outcome,
                elapsed_ms = elapsed.as_millis() as u64,
                "task attempt finished",
            );
            let truthy = result.is_truthy();
            last = result;
            if truthy {
                break;
            }
            if count < attempts {
                std::thread::sleep(Duration::from_secs((count * count) as u64));
            }
        }
        Ok(last)
    }

    /// §7: an undefined template variable is a `failure` outcome, not a hard
    /// error — the handler whose field referenced it catches the error here
    /// and logs it instead of aborting the pipeline.
    fn undefined_variable_failure(&self, var: &str, stage: &str) -> TaskResult {
        error!(name = %self.name, stage, variable = %var, "undefined variable");
        TaskResult::failure()
    }
}

/// Run a sequence of already-built child nodes in order, stopping at the
/// first `failure` or `continue` outcome — the continue handler's contract
/// (§4.4) is to "short-circuit its enclosing grouping handler successfully",
/// which `stage` and `matrix` both implement by calling this helper.
/// `skipped` does not stop iteration (§7: "counted as success for
/// short-circuit purposes").
pub fn run_children(children: &[Node], ctx: &mut ExecutionContext) -> Result<TaskResult, ExecuteError> {
    let mut last = TaskResult::success();
    for child in children {
        let result = child.run(ctx)?;
        let stop = matches!(result.outcome, Outcome::Failure | Outcome::Continue);
        last = result;
        if stop {
            break;
        }
    }
    Ok(last)
}

/// Find the first node key (in document order, skipping the common
/// decorator keys) that contains a registered tag as a substring — §4.3's
/// "substring containment is the match rule, preserving backward-compatible
/// aliasing" — checking registered tags in registration order.
fn find_handler_key<'a>(mapping: &'a serde_yaml::Mapping, registry: &Registry) -> Option<(&'a str, &'static str)> {
    for (k, _) in mapping {
        let Some(key) = k.as_str() else { continue };
        if COMMON_DECORATOR_KEYS.contains(&key) {
            continue;
        }
        for factory in registry.iter() {
            if key.contains(factory.tag()) {
                return Some((key, factory.tag()));
            }
        }
    }
    None
}

fn parse_when(value: &Yaml) -> Result<BoolExpr, ValidationError> {
    match value {
        Yaml::Bool(b) => Ok(BoolExpr::Literal(*b)),
        Yaml::String(s) => Ok(BoolExpr::Template(s.clone())),
        other => Err(ValidationError::InvalidNode {
            tag: "when".to_string(),
            reason: format!("'when' must be a boolean or string, got {other:?}"),
        }),
    }
}

struct CommonDecorators {
    name: String,
    when: Option<BoolExpr>,
    with_items: Option<WithItems>,
    attempts: u32,
    tags: Vec<String>,
    register: Option<String>,
}

fn parse_common_decorators(
    mapping: &serde_yaml::Mapping,
    tag: &'static str,
    inherited_tags: &[String],
) -> Result<CommonDecorators, ValidationError> {
    let get = |key: &str| mapping.get(Yaml::String(key.to_string()));

    let name = match get("name") {
        Some(Yaml::String(s)) => s.clone(),
        Some(other) => {
            return Err(ValidationError::InvalidNode {
                tag: tag.to_string(),
                reason: format!("'name' must be a string, got {other:?}"),
            })
        }
        None => tag.to_string(),
    };

    let when = get("when").map(parse_when).transpose()?;

    let with_items = get("with_items").map(WithItems::from_yaml).transpose()?;

    let attempts = match get("attempts") {
        Some(Yaml::Number(n)) => n.as_u64().unwrap_or(0) as u32,
        Some(other) => {
            return Err(ValidationError::InvalidNode {
                tag: tag.to_string(),
                reason: format!("'attempts' must be a positive integer, got {other:?}"),
            })
        }
        None => 1,
    };
    if attempts < 1 {
        return Err(ValidationError::InvalidNode {
            tag: tag.to_string(),
            reason: "'attempts' must be >= 1".to_string(),
        });
    }

    let mut tags: Vec<String> = match get("tags") {
        Some(Yaml::Sequence(items)) => items
            .iter()
            .map(|v| {
                v.as_str().map(str::to_string).ok_or_else(|| ValidationError::InvalidNode {
                    tag: tag.to_string(),
                    reason: format!("'tags' entries must be strings, got {v:?}"),
                })
            })
            .collect::<Result<_, _>>()?,
        Some(other) => {
            return Err(ValidationError::InvalidNode {
                tag: tag.to_string(),
                reason: format!("'tags' must be a sequence of strings, got {other:?}"),
            })
        }
        None => Vec::new(),
    };
    tags.extend(inherited_tags.iter().cloned());

    let register = match get("register") {
        Some(Yaml::String(s)) => Some(s.clone()),
        Some(other) => {
            return Err(ValidationError::InvalidNode {
                tag: tag.to_string(),
                reason: format!("'register' must be a string, got {other:?}"),
            })
        }
        None => None,
    };

    Ok(CommonDecorators {
        name,
        when,
        with_items,
        attempts,
        tags,
        register,
    })
}

/// Validate-then-build a single document node (§4.3). This crate merges the
/// two conceptual phases operationally: construction performs schema
/// validation as it goes, so a document that fails to build also fails to
/// validate and vice versa — `crate::driver::validate_document` and
/// `crate::driver::build_document` both bottom out here.
pub fn build_node(
    value: &Yaml,
    registry: &Registry,
    inherited_tags: &[String],
    runner: Arc<ProcessRunner>,
    env: Arc<EnvOverlay>,
) -> Result<Node, ValidationError> {
    let mapping = value
        .as_mapping()
        .ok_or_else(|| ValidationError::UnknownNode(format!("{value:?}")))?;

    let (key, tag) = find_handler_key(mapping, registry)
        .ok_or_else(|| ValidationError::UnknownNode(format!("no registered handler matches keys of {value:?}")))?;

    let factory = registry
        .lookup(tag)
        .unwrap_or_else(|| unreachable!("tag '{tag}' was just matched from the registry"));

    let field_value = mapping
        .get(Yaml::String(key.to_string()))
        .unwrap_or_else(|| unreachable!("key '{key}' was just read from this mapping"));

    let decorators = parse_common_decorators(mapping, tag, inherited_tags)?;

    let build_ctx = BuildContext {
        registry,
        inherited_tags: decorators.tags.clone(),
        runner,
        env,
    };
    let body = factory.build(field_value, &build_ctx)?;

    Ok(Node {
        name: decorators.name,
        when: decorators.when,
        with_items: decorators.with_items,
        attempts: decorators.attempts,
        tags: decorators.tags,
        register: decorators.register,
        body,
    })
}

#[cfg(test)]
#[path = "node_tests.rs"]
mod tests;
