// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::collections::HashSet;

#[test]
fn runs_and_captures_stdout() {
    let mut ctx = ExecutionContext::new(HashSet::new(), vec![]);
    let command = Command {
        cmd: "echo hello".to_string(),
        runner: Arc::new(ProcessRunner::start()),
        env: Arc::new(EnvOverlay::new()),
    };
    let result = command.execute(&mut ctx).unwrap();
    assert!(result.is_truthy());
    assert_eq!(result.stdout.as_deref(), Some("hello\n"));
}

#[test]
fn missing_binary_becomes_failure_not_error() {
    let mut ctx = ExecutionContext::new(HashSet::new(), vec![]);
    let command = Command {
        cmd: "pipewright-definitely-not-a-real-binary".to_string(),
        runner: Arc::new(ProcessRunner::start()),
        env: Arc::new(EnvOverlay::new()),
    };
    let result = command.execute(&mut ctx).unwrap();
    assert!(!result.is_truthy());
}
