// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The outcome value carried through the executor.

use std::collections::BTreeMap;
use std::fmt;

use serde_json::Value;

/// One of the four outcomes a task can produce.
///
/// Truthy iff not [`Outcome::Failure`] — see [`TaskResult::is_truthy`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    Failure,
    Skipped,
    /// Emitted by the `continue` handler; its enclosing grouping handler
    /// normalizes this to `Success` at its boundary.
    Continue,
}

impl Outcome {
    pub fn as_str(self) -> &'static str {
        match self {
            Outcome::Success => "success",
            Outcome::Failure => "failure",
            Outcome::Skipped => "skipped",
            Outcome::Continue => "continue",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The result of executing a single task node.
///
/// String coercion ([`TaskResult::to_string`] via [`fmt::Display`]) yields
/// `stdout` when present, else the outcome literal.
#[derive(Debug, Clone)]
pub struct TaskResult {
    pub outcome: Outcome,
    pub stdout: Option<String>,
    pub extra: BTreeMap<String, Value>,
}

impl TaskResult {
    pub fn new(outcome: Outcome) -> Self {
        TaskResult {
            outcome,
            stdout: None,
            extra: BTreeMap::new(),
        }
    }

    pub fn success() -> Self {
        Self::new(Outcome::Success)
    }

    pub fn failure() -> Self {
        Self::new(Outcome::Failure)
    }

    pub fn skipped() -> Self {
        Self::new(Outcome::Skipped)
    }

    pub fn continue_() -> Self {
        Self::new(Outcome::Continue)
    }

    pub fn with_stdout(mut self, stdout: impl Into<String>) -> Self {
        self.stdout = Some(stdout.into());
        self
    }

    pub fn with_extra(mut self, key: impl Into<String>, value: Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }

    /// Truthy iff `outcome != Outcome::Failure`.
    pub fn is_truthy(&self) -> bool {
        self.outcome != Outcome::Failure
    }

    /// Render this result as a JSON value, for use as a templating binding
    /// when a task's result is registered into the variable store.
    pub fn to_json(&self) -> Value {
        let mut map = serde_json::Map::new();
        map.insert(
            "outcome".to_string(),
            Value::String(self.outcome.as_str().to_string()),
        );
        if let Some(stdout) = &self.stdout {
            map.insert("stdout".to_string(), Value::String(stdout.clone()));
        }
        for (k, v) in &self.extra {
            map.insert(k.clone(), v.clone());
        }
        Value::Object(map)
    }
}

impl fmt::Display for TaskResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.stdout {
            Some(s) => f.write_str(s),
            None => f.write_str(self.outcome.as_str()),
        }
    }
}

#[cfg(test)]
#[path = "result_tests.rs"]
mod tests;
