// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The recursive `{{ expr }}` substitution engine.
//!
//! Grounded in `original_source/rendering/__init__.py`: that module drives a
//! Jinja2 environment whose `finalize()` hook re-renders any substituted
//! value that itself looks like a template, and protects `{% raw %}` blocks
//! across those repeated passes by stamping a sentinel token right after the
//! opening tag before each nested render. We don't carry a general template
//! language, so the same contract — substitute to a fixed point, leave raw
//! blocks untouched no matter how many passes run — is reimplemented here: a
//! `{% raw %}...{% endraw %}` span is swapped out for an opaque placeholder
//! *before* the first substitution pass and only swapped back in once
//! substitution has converged, so its content is never a substitution
//! candidate on any pass.

use std::collections::HashMap;

use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;

use pipewright_core::Frame;

use crate::error::TemplateError;

const MAX_PASSES: usize = 64;

#[allow(clippy::expect_used)]
static VAR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{\s*([A-Za-z_][A-Za-z0-9_]*(?:\.[A-Za-z0-9_]+)*)\s*\}\}")
        .expect("constant regex pattern is valid")
});

#[allow(clippy::expect_used)]
static RAW_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)\{%\s*raw\s*%\}(.*?)\{%\s*endraw\s*%\}")
        .expect("constant regex pattern is valid")
});

/// Render `template` against `bindings`, re-expanding any `{{ }}` that an
/// indirected value introduces until no more appear (or `MAX_PASSES` is
/// reached, at which point the last pass's text is returned as-is).
pub fn render(template: &str, bindings: &Frame) -> Result<String, TemplateError> {
    let (masked, raws) = mask_raw_blocks(template);

    let mut current = masked;
    for _ in 0..MAX_PASSES {
        let next = substitute_once(&current, bindings)?;
        if next == current {
            break;
        }
        current = next;
        if !contains_directive(&current) {
            break;
        }
    }

    Ok(restore_raw_blocks(&current, &raws))
}

/// True if `s` has no `{{`, `}}`, `{%`, or `%}` left to expand — used by the
/// boolean-expression evaluator to reject unexpanded directives outright.
pub fn contains_directive(s: &str) -> bool {
    s.contains("{{") || s.contains("}}") || s.contains("{%") || s.contains("%}")
}

fn mask_raw_blocks(template: &str) -> (String, Vec<String>) {
    let mut raws = Vec::new();
    let masked = RAW_RE
        .replace_all(template, |caps: &regex::Captures| {
            raws.push(caps[1].to_string());
            format!("\u{0}PIPEWRIGHT_RAW_{}\u{0}", raws.len() - 1)
        })
        .into_owned();
    (masked, raws)
}

fn restore_raw_blocks(s: &str, raws: &[String]) -> String {
    let mut out = s.to_string();
    for (i, content) in raws.iter().enumerate() {
        let token = format!("\u{0}PIPEWRIGHT_RAW_{i}\u{0}");
        out = out.replace(&token, content);
    }
    out
}

fn substitute_once(s: &str, bindings: &Frame) -> Result<String, TemplateError> {
    let mut err = None;
    let replaced = VAR_RE
        .replace_all(s, |caps: &regex::Captures| {
            if err.is_some() {
                return String::new();
            }
            let path = &caps[1];
            match lookup(path, bindings) {
                Ok(text) => text,
                Err(e) => {
                    err = Some(e);
                    String::new()
                }
            }
        })
        .into_owned();
    match err {
        Some(e) => Err(e),
        None => Ok(replaced),
    }
}

/// Resolve a dotted path (`matrix.os`, `item.0.name`) against the bindings
/// frame, descending through JSON objects by key and arrays by numeric index.
pub fn lookup(path: &str, bindings: &Frame) -> Result<String, TemplateError> {
    let mut segments = path.split('.');
    let head = segments.next().unwrap_or(path);

    let stored = bindings
        .get(head)
        .ok_or_else(|| TemplateError::Undefined(head.to_string()))?;

    let mut value = stored.to_json();
    for segment in segments {
        value = descend(&value, segment)
            .ok_or_else(|| TemplateError::Undefined(path.to_string()))?;
    }

    Ok(match value {
        Value::String(s) => s,
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    })
}

fn descend(value: &Value, segment: &str) -> Option<Value> {
    match value {
        Value::Object(map) => map.get(segment).cloned(),
        Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i).cloned()),
        _ => None,
    }
}

/// Lookup a raw JSON value (as opposed to its rendered string form), used by
/// the boolean evaluator and `with_items` for non-string comparisons.
pub fn lookup_json(path: &str, bindings: &Frame) -> Result<Value, TemplateError> {
    let mut segments = path.split('.');
    let head = segments.next().unwrap_or(path);
    let stored = bindings
        .get(head)
        .ok_or_else(|| TemplateError::Undefined(head.to_string()))?;
    let mut value = stored.to_json();
    for segment in segments {
        value = descend(&value, segment).ok_or_else(|| TemplateError::Undefined(path.to_string()))?;
    }
    Ok(value)
}

/// Rebind a frame into a plain `HashMap<String, Value>` view, for callers
/// (like the literal evaluator) that only need JSON, not `StoredValue`.
pub fn json_view(bindings: &Frame) -> HashMap<String, Value> {
    bindings.iter().map(|(k, v)| (k.clone(), v.to_json())).collect()
}

#[cfg(test)]
#[path = "render_tests.rs"]
mod tests;
