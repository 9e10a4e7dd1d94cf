// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::collections::HashSet;

#[test]
fn returns_failure_with_rendered_message() {
    let mut ctx = ExecutionContext::new(HashSet::new(), vec![]);
    let fail = Fail { message: "bye".to_string() };
    let result = fail.execute(&mut ctx).unwrap();
    assert!(!result.is_truthy());
    assert_eq!(result.stdout.as_deref(), Some("bye"));
}
