// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::registry::Registry;
use pipewright_procrunner::ProcessRunner;
use std::collections::HashSet;

fn run_via_factory(yaml: &str, matrix_tag_patterns: Vec<String>) -> TaskResult {
    let registry = Registry::builtin();
    let doc: Yaml = serde_yaml::from_str(yaml).unwrap();
    let node = node::build_node(
        &doc,
        &registry,
        &[],
        Arc::new(ProcessRunner::start()),
        Arc::new(EnvOverlay::new()),
    )
    .unwrap();
    let mut ctx = ExecutionContext::new(HashSet::new(), matrix_tag_patterns);
    node.run(&mut ctx).unwrap()
}

#[test]
fn runs_once_per_tag() {
    let result = run_via_factory("matrix:\n  tags: [m1, m2]\n  tasks:\n    - echo: '{{ matrix_tag }}'\n", vec![]);
    assert!(result.is_truthy());
}

#[test]
fn positional_glob_filters_entries() {
    let result = run_via_factory(
        "matrix:\n  tags: [m1, m2]\n  tasks:\n    - fail: 'should not run for m2'\n",
        vec!["m1".to_string()],
    );
    assert!(result.is_truthy());
}

#[test]
fn mapping_form_sets_and_clears_env() {
    let result = run_via_factory(
        "matrix:\n  tags:\n    m1:\n      STAGE: prod\n  tasks:\n    - echo: '{{ matrix_tag }}'\n",
        vec![],
    );
    assert!(result.is_truthy());
}
