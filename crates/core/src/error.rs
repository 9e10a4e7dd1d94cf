// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error taxonomy, split into the two conceptual layers of §7: validation-time
//! errors (fatal to a document) and execution-time failures.

use thiserror::Error;

/// Fatal, document-level errors raised by [`Node Factory`](crate) validation.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("no registered handler matches node: {0}")]
    UnknownNode(String),
    #[error("node failed schema validation for handler '{tag}': {reason}")]
    InvalidNode { tag: String, reason: String },
    #[error("invalid boolean expression: {0}")]
    InvalidExpression(String),
}

/// Execution-time failures. These do not abort the document; they become
/// `Outcome::Failure` at the node that raised them.
#[derive(Debug, Error)]
pub enum ExecuteError {
    #[error("process terminated with exit code {exit_code}")]
    ProcessTerminated { exit_code: i32 },
    #[error("undefined variable: {0}")]
    UndefinedVariable(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl ExecuteError {
    /// The exit code a `ProcessTerminated` carries, used for CLI reporting.
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            ExecuteError::ProcessTerminated { exit_code } => Some(*exit_code),
            _ => None,
        }
    }
}
