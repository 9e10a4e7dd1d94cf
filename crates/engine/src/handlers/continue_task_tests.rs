// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use pipewright_core::Outcome;
use std::collections::HashSet;

#[test]
fn any_true_condition_continues() {
    let mut ctx = ExecutionContext::new(HashSet::new(), vec![]);
    let task = ContinueTask {
        conditions: vec![BoolExpr::Literal(false), BoolExpr::Literal(true)],
    };
    let result = task.execute(&mut ctx).unwrap();
    assert_eq!(result.outcome, Outcome::Continue);
}

#[test]
fn all_false_succeeds_without_continuing() {
    let mut ctx = ExecutionContext::new(HashSet::new(), vec![]);
    let task = ContinueTask {
        conditions: vec![BoolExpr::Literal(false)],
    };
    let result = task.execute(&mut ctx).unwrap();
    assert_eq!(result.outcome, Outcome::Success);
}
