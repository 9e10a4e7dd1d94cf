// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn set_then_snapshot_reports_override() {
    let overlay = EnvOverlay::new();
    overlay.set("STAGE".to_string(), "prod".to_string());
    let (overrides, removals) = overlay.snapshot();
    assert_eq!(overrides, vec![("STAGE".to_string(), "prod".to_string())]);
    assert!(removals.is_empty());
}

#[test]
fn unset_after_set_reports_removal_not_override() {
    let overlay = EnvOverlay::new();
    overlay.set("STAGE".to_string(), "prod".to_string());
    overlay.unset(&["STAGE".to_string()]);
    let (overrides, removals) = overlay.snapshot();
    assert!(overrides.is_empty());
    assert_eq!(removals, vec!["STAGE".to_string()]);
}
