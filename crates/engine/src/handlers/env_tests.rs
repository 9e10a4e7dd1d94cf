// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::collections::HashSet;

#[test]
fn unset_applies_before_set() {
    let overlay = Arc::new(EnvOverlay::new());
    overlay.set("STAGE".to_string(), "prod".to_string());
    let env = Env {
        set: vec![("STAGE".to_string(), "qa".to_string())],
        unset: vec![glob::Pattern::new("STAGE").unwrap()],
        overlay: Arc::clone(&overlay),
    };
    let mut ctx = ExecutionContext::new(HashSet::new(), vec![]);
    env.execute(&mut ctx).unwrap();
    let (overrides, removals) = overlay.snapshot();
    assert!(removals.is_empty());
    assert_eq!(overrides, vec![("STAGE".to_string(), "qa".to_string())]);
}
