// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use pipewright_core::StoredValue;

#[test]
fn literal_sequence_passes_through() {
    let with_items = WithItems::from_yaml(&serde_yaml::from_str("[1, 2, 3]").unwrap()).unwrap();
    let resolved = with_items.resolve(&Frame::new()).unwrap();
    assert_eq!(resolved, vec![serde_json::json!(1), serde_json::json!(2), serde_json::json!(3)]);
}

#[test]
fn string_form_is_rendered_then_evaluated() {
    let mut frame = Frame::new();
    frame.insert("count".to_string(), StoredValue::Json(serde_json::json!(3)));
    let with_items = WithItems::from_yaml(&Yaml::String("['a', 'b', '{{ count }}']".to_string())).unwrap();
    let resolved = with_items.resolve(&frame).unwrap();
    assert_eq!(
        resolved,
        vec![serde_json::json!("a"), serde_json::json!("b"), serde_json::json!("3")]
    );
}

#[test]
fn non_list_rendered_value_becomes_single_item() {
    let with_items = WithItems::from_yaml(&Yaml::String("'just_one'".to_string())).unwrap();
    let resolved = with_items.resolve(&Frame::new()).unwrap();
    assert_eq!(resolved, vec![serde_json::json!("just_one")]);
}
