// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn no_filter_never_gates() {
    let ctx = ExecutionContext::new(HashSet::new(), vec![]);
    assert!(!ctx.is_tag_gated(&["deploy".to_string()]));
    assert!(!ctx.is_tag_gated(&[]));
}

#[test]
fn disjoint_tags_are_gated() {
    let selected: HashSet<String> = ["prod".to_string()].into_iter().collect();
    let ctx = ExecutionContext::new(selected, vec![]);
    assert!(ctx.is_tag_gated(&["staging".to_string()]));
    assert!(!ctx.is_tag_gated(&["prod".to_string(), "staging".to_string()]));
    // untagged nodes are never gated
    assert!(!ctx.is_tag_gated(&[]));
}
