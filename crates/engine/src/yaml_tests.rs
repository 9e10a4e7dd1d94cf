// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn converts_nested_mapping_preserving_values() {
    let yaml: Yaml = serde_yaml::from_str("a: 1\nb: [1, 2, 3]\nc: {d: true}").unwrap();
    let json = yaml_to_json(&yaml);
    assert_eq!(json, serde_json::json!({"a": 1, "b": [1,2,3], "c": {"d": true}}));
}
