// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! POSIX shell-word tokenizing for the `command` handler (§4.5), grounded in
//! `original_source/plugins/command.py`'s `shlex.split(cmd, False, False)`
//! (POSIX mode, no comments). Splits on unquoted whitespace; single quotes
//! suppress all escaping; inside double quotes a backslash escapes only
//! `"`, `\`, `$`, `` ` ``, or newline, and is otherwise kept literally;
//! outside quotes a backslash escapes the following character unconditionally.

#[derive(Debug, PartialEq, Eq)]
pub struct TokenizeError(pub String);

impl std::fmt::Display for TokenizeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

pub fn split(input: &str) -> Result<Vec<String>, TokenizeError> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut in_word = false;
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            c if c.is_whitespace() => {
                if in_word {
                    words.push(std::mem::take(&mut current));
                    in_word = false;
                }
            }
            '\'' => {
                in_word = true;
                loop {
                    match chars.next() {
                        Some('\'') => break,
                        Some(c) => current.push(c),
                        None => return Err(TokenizeError("unterminated single quote".to_string())),
                    }
                }
            }
            '"' => {
                in_word = true;
                loop {
                    match chars.next() {
                        Some('"') => break,
                        Some('\\') => match chars.peek().copied() {
                            Some(next) if matches!(next, '"' | '\\' | '$' | '`' | '\n') => {
                                current.push(next);
                                chars.next();
                            }
                            _ => current.push('\\'),
                        },
                        Some(c) => current.push(c),
                        None => return Err(TokenizeError("unterminated double quote".to_string())),
                    }
                }
            }
            '\\' => {
                in_word = true;
                match chars.next() {
                    Some(next) => current.push(next),
                    None => return Err(TokenizeError("trailing backslash".to_string())),
                }
            }
            c => {
                in_word = true;
                current.push(c);
            }
        }
    }

    if in_word {
        words.push(current);
    }

    Ok(words)
}

#[cfg(test)]
#[path = "tokenize_tests.rs"]
mod tests;
