// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The Pipeline Driver (§4.6): validates a whole document, builds it into
//! nodes, and executes them in order, short-circuiting on the first
//! failure. Document validation and node construction are one operational
//! pass here (see `crate::node::build_node`'s doc comment) — `validate`
//! simply discards the built tree and keeps only the question "did this
//! succeed."

use std::sync::Arc;
use std::time::Instant;

use pipewright_core::{ExecuteError, ExecutionContext, Outcome, TaskResult, ValidationError};
use pipewright_procrunner::ProcessRunner;
use serde_yaml::Value as Yaml;
use tracing::info;

use crate::env_overlay::EnvOverlay;
use crate::node::{build_node, Node};
use crate::registry::Registry;

/// A fully built, ready-to-run pipeline document.
pub struct Pipeline {
    nodes: Vec<Node>,
}

impl Pipeline {
    /// Validate-then-build a top-level document: an ordered sequence of
    /// task nodes (§4.6, §6 "Document format").
    pub fn build(
        document: &Yaml,
        registry: &Registry,
        runner: Arc<ProcessRunner>,
        env: Arc<EnvOverlay>,
    ) -> Result<Self, ValidationError> {
        let items = document.as_sequence().ok_or_else(|| ValidationError::InvalidNode {
            tag: "document".to_string(),
            reason: "top-level document must be a sequence".to_string(),
        })?;
        let nodes = items
            .iter()
            .map(|item| build_node(item, registry, &[], Arc::clone(&runner), Arc::clone(&env)))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Pipeline { nodes })
    }

    /// Validate only: build the document and discard the tree, keeping only
    /// whether it succeeded (§6 `validate` subcommand, §8 property 1).
    pub fn validate(
        document: &Yaml,
        registry: &Registry,
        runner: Arc<ProcessRunner>,
        env: Arc<EnvOverlay>,
    ) -> Result<(), ValidationError> {
        Self::build(document, registry, runner, env).map(|_| ())
    }

    /// Run every top-level node in order, short-circuiting on the first
    /// `failure` (§4.6, §8 property 9). A top-level `continue` is treated
    /// as success (§7: "outside any grouping it is treated as success by
    /// the driver").
    pub fn execute(&self, ctx: &mut ExecutionContext) -> Result<TaskResult, ExecuteError> {
        let start = Instant::now();
        info!(nodes = self.nodes.len(), "pipeline execution starting");

        let mut last = TaskResult::success();
        for node in &self.nodes {
            let result = node.run(ctx)?;
            let failed = result.outcome == Outcome::Failure;
            last = result;
            if failed {
                break;
            }
        }

        let final_result = if last.outcome == Outcome::Continue {
            TaskResult::success()
        } else {
            last
        };

        info!(
            outcome = %final_result.outcome,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "pipeline execution finished",
        );
        Ok(final_result)
    }
}

#[cfg(test)]
#[path = "driver_tests.rs"]
mod tests;
