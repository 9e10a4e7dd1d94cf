// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::collections::HashSet;

#[test]
fn binds_values_unrendered() {
    let mut ctx = ExecutionContext::new(HashSet::new(), vec![]);
    let set = Set {
        entries: vec![("greeting".to_string(), serde_json::json!("{{ name }}"))],
    };
    set.execute(&mut ctx).unwrap();
    assert_eq!(
        ctx.variables.top().get("greeting").unwrap().to_display(),
        "{{ name }}"
    );
}
