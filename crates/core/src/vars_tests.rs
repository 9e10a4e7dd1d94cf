// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn never_empty_after_init() {
    let store = VariableStore::new(Frame::new());
    assert_eq!(store.height(), 1);
}

#[test]
fn push_copy_duplicates_top_frame() {
    let mut store = VariableStore::new(Frame::new());
    store
        .top_mut()
        .insert("a".into(), Value::String("benden".into()).into());
    store.push_copy();
    assert_eq!(store.height(), 2);
    assert!(store.top().contains_key("a"));
}

#[test]
fn scoped_restores_height_on_err() {
    let mut store = VariableStore::new(Frame::new());
    let start = store.height();
    let result: Result<(), &str> = store.scoped(|s| {
        s.top_mut().insert("x".into(), Value::Null.into());
        Err("boom")
    });
    assert!(result.is_err());
    assert_eq!(store.height(), start);
}

#[test]
fn pop_never_empties_stack() {
    let mut store = VariableStore::new(Frame::new());
    store.pop();
    store.pop();
    assert_eq!(store.height(), 1);
}
