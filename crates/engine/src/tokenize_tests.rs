// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn splits_on_whitespace() {
    assert_eq!(split("echo hello world").unwrap(), vec!["echo", "hello", "world"]);
}

#[test]
fn single_quotes_suppress_escaping() {
    assert_eq!(split(r"echo 'a\nb'").unwrap(), vec!["echo", r"a\nb"]);
}

#[test]
fn double_quotes_allow_selective_escapes() {
    assert_eq!(split(r#"echo "a\"b""#).unwrap(), vec!["echo", "a\"b"]);
    assert_eq!(split(r#"echo "a\tb""#).unwrap(), vec!["echo", r"a\tb"]);
}

#[test]
fn unquoted_backslash_escapes_next_char() {
    assert_eq!(split(r"a\ b").unwrap(), vec!["a b"]);
}

#[test]
fn unterminated_quote_errors() {
    assert!(split("echo 'oops").is_err());
}
