//! End-to-end pipeline scenarios (S1-S9 of `SPEC_FULL.md` §8), exercised
//! directly against the engine's public driver rather than a CLI
//! subprocess — this crate has no daemon process for a black-box harness
//! to attach to, so the driver is called as a library the way the
//! teacher's own lower-level crates test themselves.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use std::collections::HashSet;
use std::io::Write as _;
use std::sync::{Arc, Mutex};

use pipewright_core::{ExecutionContext, Outcome, TaskResult};
use pipewright_engine::{EnvOverlay, Pipeline, Registry};
use pipewright_procrunner::ProcessRunner;
use serde_yaml::Value as Yaml;

#[derive(Clone, Default)]
struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl std::io::Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }
    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for LogBuffer {
    type Writer = LogBuffer;
    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

/// Run `f` under a subscriber scoped to this call, returning its result
/// alongside every log line emitted during the call.
fn capture_logs<T>(f: impl FnOnce() -> T) -> (T, String) {
    let buffer = LogBuffer::default();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(buffer.clone())
        .with_max_level(tracing::Level::DEBUG)
        .without_time()
        .with_target(false)
        .with_level(false)
        .finish();
    let result = tracing::subscriber::with_default(subscriber, f);
    let bytes = buffer.0.lock().unwrap().clone();
    (result, String::from_utf8_lossy(&bytes).into_owned())
}

/// Write `yaml` to a scratch file and read it back as a parsed document —
/// exercises the same path a CLI invocation takes, without shelling out to
/// the `pipewright` binary.
fn load_document(yaml: &str) -> Yaml {
    let mut file = tempfile::NamedTempFile::new().expect("create scratch pipeline file");
    file.write_all(yaml.as_bytes()).expect("write scratch pipeline file");
    let contents = std::fs::read_to_string(file.path()).expect("read back scratch pipeline file");
    serde_yaml::from_str(&contents).expect("parse scratch pipeline file")
}

fn run_pipeline(yaml: &str, selected_tags: HashSet<String>, matrix_tag_patterns: Vec<String>) -> (TaskResult, String) {
    let document = load_document(yaml);
    let registry = Registry::builtin();
    let runner = Arc::new(ProcessRunner::start());
    let env = Arc::new(EnvOverlay::new());
    let pipeline = Pipeline::build(&document, &registry, runner, env).expect("pipeline builds");

    capture_logs(|| {
        let mut ctx = ExecutionContext::new(selected_tags, matrix_tag_patterns);
        pipeline.execute(&mut ctx).expect("pipeline executes without error")
    })
}

#[test]
fn s1_echo_logs_and_succeeds() {
    let (result, log) = run_pipeline("- echo: Hello\n", HashSet::new(), vec![]);
    assert!(log.contains("| Hello"), "log was:\n{log}");
    assert_eq!(result.outcome, Outcome::Success);
}

#[test]
fn s2_fail_logs_and_fails() {
    let (result, log) = run_pipeline("- fail: bye\n", HashSet::new(), vec![]);
    assert!(log.contains("bye"), "log was:\n{log}");
    assert_eq!(result.outcome, Outcome::Failure);
}

#[test]
fn s3_set_then_echo_renders_bound_variable() {
    let (_, log) = run_pipeline(
        "- set: {a: benden}\n- echo: \"{{ a }}\"\n",
        HashSet::new(),
        vec![],
    );
    assert!(log.contains("| benden"), "log was:\n{log}");
}

#[test]
fn s4_matrix_runs_every_tag() {
    let (result, log) = run_pipeline(
        "- matrix: {tags: [m1, m2], tasks: [{echo: \"e-{{ matrix_tag }}\"}]}\n",
        HashSet::new(),
        vec![],
    );
    assert!(log.contains("| e-m1"), "log was:\n{log}");
    assert!(log.contains("| e-m2"), "log was:\n{log}");
    assert_eq!(result.outcome, Outcome::Success);
}

#[test]
fn s5_matrix_short_circuits_on_failure() {
    let (result, log) = run_pipeline(
        "- matrix: {tags: [m1, m2], tasks: [{fail: X}]}\n",
        HashSet::new(),
        vec![],
    );
    assert!(log.contains("entry: m1"), "log was:\n{log}");
    assert!(log.contains('X'), "log was:\n{log}");
    assert!(!log.contains("entry: m2"), "log was:\n{log}");
    assert_eq!(result.outcome, Outcome::Failure);
}

#[test]
fn s6_continue_short_circuits_enclosing_stage() {
    let (_, log) = run_pipeline(
        "- stage: {tasks: [{continue: {when: ['1 == 1']}}, {echo: Bad}]}\n- echo: Good\n",
        HashSet::new(),
        vec![],
    );
    assert!(log.contains("Good"), "log was:\n{log}");
    assert!(!log.contains("Bad"), "log was:\n{log}");
}

#[test]
fn s7_matrix_tag_filter_skips_non_matching_entries() {
    let (result, log) = run_pipeline(
        "- matrix: {tags: [a, b], tasks: [{echo: \"seen-{{ matrix_tag }}\"}]}\n",
        HashSet::new(),
        vec!["a".to_string()],
    );
    assert!(log.contains("seen-a"), "log was:\n{log}");
    assert!(!log.contains("seen-b"), "log was:\n{log}");
    assert_eq!(result.outcome, Outcome::Success);
}

#[test]
fn s8_command_missing_binary_is_failure() {
    let (result, log) = run_pipeline("- command: /nonexistent\n", HashSet::new(), vec![]);
    assert!(log.to_lowercase().contains("terminated") || log.to_lowercase().contains("failure"), "log was:\n{log}");
    assert_eq!(result.outcome, Outcome::Failure);
}

#[test]
fn s9_with_items_iterates_each_element() {
    let (_, log) = run_pipeline(
        "- echo: \"{{ item }}\"\n  with_items: [a, b, c]\n",
        HashSet::new(),
        vec![],
    );
    assert!(log.contains("| a"), "log was:\n{log}");
    assert!(log.contains("| b"), "log was:\n{log}");
    assert!(log.contains("| c"), "log was:\n{log}");
}

#[test]
fn tag_gate_skips_disjoint_nodes() {
    let selected: HashSet<String> = ["prod".to_string()].into_iter().collect();
    let (result, log) = run_pipeline(
        "- echo: should-be-skipped\n  tags: [staging]\n",
        selected,
        vec![],
    );
    assert!(!log.contains("should-be-skipped"), "log was:\n{log}");
    assert_eq!(result.outcome, Outcome::Success);
}

#[test]
fn variable_store_height_is_restored_after_a_failing_run() {
    let document = load_document("- matrix: {tags: [m1, m2], tasks: [{fail: boom}]}\n");
    let registry = Registry::builtin();
    let runner = Arc::new(ProcessRunner::start());
    let env = Arc::new(EnvOverlay::new());
    let pipeline = Pipeline::build(&document, &registry, runner, env).unwrap();
    let mut ctx = ExecutionContext::new(HashSet::new(), vec![]);
    let start_height = ctx.variables.height();
    let (_, _log) = capture_logs(|| pipeline.execute(&mut ctx).unwrap());
    assert_eq!(ctx.variables.height(), start_height);
}

#[test]
fn scoped_stage_does_not_leak_bindings() {
    let document = load_document(
        "- stage: {scope: true, tasks: [{set: {leaked: yes}}]}\n- echo: \"{{ leaked }}\"\n",
    );
    let registry = Registry::builtin();
    let runner = Arc::new(ProcessRunner::start());
    let env = Arc::new(EnvOverlay::new());
    let pipeline = Pipeline::build(&document, &registry, runner, env).unwrap();
    let mut ctx = ExecutionContext::new(HashSet::new(), vec![]);
    let (outcome, _log) = capture_logs(|| pipeline.execute(&mut ctx));
    let result = outcome.expect("undefined variable is a failure outcome, not an error");
    assert_eq!(
        result.outcome,
        Outcome::Failure,
        "'leaked' should not be visible past the scoped stage"
    );
}

#[test]
fn unscoped_stage_bindings_are_visible_to_later_siblings() {
    let (_, log) = run_pipeline(
        "- stage: {scope: false, tasks: [{set: {visible: yes}}]}\n- echo: \"{{ visible }}\"\n",
        HashSet::new(),
        vec![],
    );
    assert!(log.contains("| yes"), "log was:\n{log}");
}
