// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn parses_simple_list() {
    let v = eval_literal("[a, b, c]");
    assert!(v.is_err(), "bare identifiers are not whitelisted literals");
    let v = eval_literal("['a', 'b', 'c']").unwrap();
    assert_eq!(v, serde_json::json!(["a", "b", "c"]));
}

#[test]
fn parses_numbers_and_arithmetic() {
    assert_eq!(eval_literal("1 + 2").unwrap(), serde_json::json!(3));
    assert_eq!(eval_literal("2 * 3 + 1").unwrap(), serde_json::json!(7));
    assert_eq!(eval_literal("-4").unwrap(), serde_json::json!(-4));
}

#[test]
fn parses_dict_and_ordered_map() {
    assert_eq!(
        eval_literal("{'a': 1, 'b': 2}").unwrap(),
        serde_json::json!({"a": 1, "b": 2})
    );
    assert_eq!(
        eval_literal("OrderedMap(a=1, b=2)").unwrap(),
        serde_json::json!({"a": 1, "b": 2})
    );
}

#[test]
fn set_deduplicates() {
    let v = eval_literal("{1, 1, 2}").unwrap();
    assert_eq!(v, serde_json::json!([1, 2]));
}

#[test]
fn rejects_arbitrary_function_calls() {
    assert!(eval_literal("eval('1')").is_err());
    assert!(eval_literal("__import__('os')").is_err());
}

#[test]
fn tuple_of_one_unwraps_like_parens() {
    assert_eq!(eval_literal("(1)").unwrap(), serde_json::json!(1));
    assert_eq!(eval_literal("(1,)").unwrap(), serde_json::json!([1]));
}
