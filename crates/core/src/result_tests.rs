// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn truthy_is_anything_but_failure() {
    assert!(TaskResult::success().is_truthy());
    assert!(TaskResult::skipped().is_truthy());
    assert!(TaskResult::continue_().is_truthy());
    assert!(!TaskResult::failure().is_truthy());
}

#[test]
fn display_prefers_stdout_over_outcome() {
    let r = TaskResult::success().with_stdout("hello");
    assert_eq!(r.to_string(), "hello");
    assert_eq!(TaskResult::failure().to_string(), "failure");
}
