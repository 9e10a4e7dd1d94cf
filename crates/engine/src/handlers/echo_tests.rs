// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use pipewright_core::StoredValue;
use std::collections::HashSet;

#[test]
fn renders_and_succeeds() {
    let mut ctx = ExecutionContext::new(HashSet::new(), vec![]);
    ctx.variables
        .top_mut()
        .insert("name".to_string(), StoredValue::from(serde_json::json!("benden")));
    let echo = Echo { text: "hello {{ name }}".to_string() };
    let result = echo.execute(&mut ctx).unwrap();
    assert!(result.is_truthy());
    assert_eq!(result.stdout.as_deref(), Some("hello benden"));
}

#[test]
fn undefined_variable_propagates_as_error() {
    let mut ctx = ExecutionContext::new(HashSet::new(), vec![]);
    let echo = Echo { text: "{{ missing }}".to_string() };
    assert!(echo.execute(&mut ctx).is_err());
}
