// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use pipewright_procrunner::ProcessRunner;

fn runner() -> Arc<ProcessRunner> {
    Arc::new(ProcessRunner::start())
}

fn env() -> Arc<EnvOverlay> {
    Arc::new(EnvOverlay::new())
}

#[test]
fn unknown_key_is_unknown_node() {
    let registry = Registry::builtin();
    let doc: Yaml = serde_yaml::from_str("bogus_task_kind: hello").unwrap();
    let err = build_node(&doc, &registry, &[], runner(), env()).unwrap_err();
    assert!(matches!(err, ValidationError::UnknownNode(_)));
}

#[test]
fn attempts_below_one_is_invalid() {
    let registry = Registry::builtin();
    let doc: Yaml = serde_yaml::from_str("echo: hi\nattempts: 0").unwrap();
    let err = build_node(&doc, &registry, &[], runner(), env()).unwrap_err();
    assert!(matches!(err, ValidationError::InvalidNode { .. }));
}

#[test]
fn tags_inherit_from_caller() {
    let registry = Registry::builtin();
    let doc: Yaml = serde_yaml::from_str("echo: hi\ntags: [a]").unwrap();
    let node = build_node(&doc, &registry, &["b".to_string()], runner(), env()).unwrap();
    assert_eq!(node.tags, vec!["a".to_string(), "b".to_string()]);
}

#[test]
fn name_defaults_to_tag() {
    let registry = Registry::builtin();
    let doc: Yaml = serde_yaml::from_str("echo: hi").unwrap();
    let node = build_node(&doc, &registry, &[], runner(), env()).unwrap();
    assert_eq!(node.name, "echo");
}

#[test]
fn aliased_key_matches_by_substring() {
    let registry = Registry::builtin();
    // "run_command" contains the registered tag "command".
    let doc: Yaml = serde_yaml::from_str("run_command: 'true'").unwrap();
    assert!(build_node(&doc, &registry, &[], runner(), env()).is_ok());
}

#[test]
fn body_undefined_variable_is_a_failure_outcome_not_an_error() {
    let registry = Registry::builtin();
    let doc: Yaml = serde_yaml::from_str("echo: '{{ missing }}'").unwrap();
    let node = build_node(&doc, &registry, &[], runner(), env()).unwrap();
    let mut ctx = ExecutionContext::new(Default::default(), vec![]);
    let result = node.run(&mut ctx).unwrap();
    assert_eq!(result.outcome, Outcome::Failure);
}

#[test]
fn when_gate_undefined_variable_is_a_failure_outcome_not_an_error() {
    let registry = Registry::builtin();
    let doc: Yaml = serde_yaml::from_str("echo: hi\nwhen: '{{ missing }}'").unwrap();
    let node = build_node(&doc, &registry, &[], runner(), env()).unwrap();
    let mut ctx = ExecutionContext::new(Default::default(), vec![]);
    let result = node.run(&mut ctx).unwrap();
    assert_eq!(result.outcome, Outcome::Failure);
}

#[test]
fn with_items_undefined_variable_is_a_failure_outcome_not_an_error() {
    let registry = Registry::builtin();
    let doc: Yaml = serde_yaml::from_str("echo: hi\nwith_items: '{{ missing }}'").unwrap();
    let node = build_node(&doc, &registry, &[], runner(), env()).unwrap();
    let mut ctx = ExecutionContext::new(Default::default(), vec![]);
    let result = node.run(&mut ctx).unwrap();
    assert_eq!(result.outcome, Outcome::Failure);
}

/// A body whose every attempt raises `UndefinedVariable`, counting how many
/// times it was actually invoked.
struct AlwaysUndefined {
    calls: std::sync::Arc<std::sync::atomic::AtomicU32>,
}

impl Execute for AlwaysUndefined {
    fn execute(&self, _ctx: &mut ExecutionContext) -> Result<TaskResult, ExecuteError> {
        self.calls.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        Err(ExecuteError::UndefinedVariable("missing".to_string()))
    }
}

#[test]
fn retry_loop_runs_to_exhaustion_on_persistent_undefined_variable() {
    let calls = std::sync::Arc::new(std::sync::atomic::AtomicU32::new(0));
    let node = Node {
        name: "flaky".to_string(),
        when: None,
        with_items: None,
        attempts: 2,
        tags: Vec::new(),
        register: None,
        body: Box::new(AlwaysUndefined { calls: std::sync::Arc::clone(&calls) }),
    };
    let mut ctx = ExecutionContext::new(Default::default(), vec![]);
    let result = node.run(&mut ctx).unwrap();
    assert_eq!(result.outcome, Outcome::Failure);
    assert_eq!(calls.load(std::sync::atomic::Ordering::SeqCst), 2, "both attempts should have run");
}
