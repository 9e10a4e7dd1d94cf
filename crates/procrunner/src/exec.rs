// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The async core: spawns a child, streams its stdout/stderr line-by-line
//! into the log, and enforces an optional timeout with a graceful-then-hard
//! kill. Grounded in the line-streaming + `info_span`-per-invocation idiom
//! used by the teacher's own shell executor, adapted from a single buffered
//! `wait_with_output` into incremental `BufReader` line relays so each line
//! can be logged as it arrives rather than only after the child exits.

use std::io::Write as _;
use std::process::Stdio;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tracing::{info, info_span, warn, Instrument};

/// What to run and how to run it.
pub struct SpawnRequest {
    pub argv: Vec<String>,
    pub cwd: Option<std::path::PathBuf>,
    pub timeout: Option<Duration>,
    pub capture_stdout: bool,
    /// When true, stdout/stderr lines are buffered to a temp file instead of
    /// logged live, and only dumped to the log if the run fails.
    pub silent: bool,
    /// Environment variables to add or override on top of the inherited
    /// parent environment (the `env` task's `set`, §4.5).
    pub env_set: Vec<(String, String)>,
    /// Environment variables to strip from the child's inherited environment
    /// (the `env` task's `unset`, §4.5).
    pub env_remove: Vec<String>,
}

/// Exit code used when the binary itself could not be spawned (§4.2).
pub const BINARY_NOT_FOUND_EXIT_CODE: i32 = 1;
/// Exit code used when a run is killed after a timeout (§4.2, §5).
pub const TIMEOUT_EXIT_CODE: i32 = 124;

pub async fn run_process(req: SpawnRequest) -> crate::ProcRunnerOutcome {
    let Some(program) = req.argv.first() else {
        return crate::ProcRunnerOutcome::terminated(BINARY_NOT_FOUND_EXIT_CODE);
    };

    let mut cmd = Command::new(program);
    cmd.args(&req.argv[1..]);
    if let Some(cwd) = &req.cwd {
        cmd.current_dir(cwd);
    }
    cmd.stdout(Stdio::piped());
    cmd.stderr(Stdio::piped());
    cmd.stdin(Stdio::null());
    for (key, value) in &req.env_set {
        cmd.env(key, value);
    }
    for key in &req.env_remove {
        cmd.env_remove(key);
    }

    let span = info_span!("process", program = %program);
    let mut child = match cmd.spawn() {
        Ok(child) => child,
        Err(_) => return crate::ProcRunnerOutcome::terminated(BINARY_NOT_FOUND_EXIT_CODE),
    };

    let stdout = child.stdout.take();
    let stderr = child.stderr.take();

    let silent_buffer = if req.silent {
        Some(tempfile::NamedTempFile::new())
    } else {
        None
    };

    let stdout_task = spawn_relay(stdout, req.capture_stdout, silent_buffer.as_ref(), true);
    let stderr_task = spawn_relay(stderr, false, silent_buffer.as_ref(), false);

    let wait_future = async {
        let exit = child.wait().await;
        let stdout_text = stdout_task.await.unwrap_or_default();
        let _ = stderr_task.await;
        (exit, stdout_text)
    }
    .instrument(span);

    let (exit, stdout_text) = match req.timeout {
        None => wait_future.await,
        Some(duration) => match tokio::time::timeout(duration, wait_future).await {
            Ok(result) => result,
            Err(_) => {
                terminate_gracefully(&mut child).await;
                if let Some(buffer) = &silent_buffer {
                    dump_buffer(buffer);
                }
                return crate::ProcRunnerOutcome::terminated(TIMEOUT_EXIT_CODE);
            }
        },
    };

    let exit_code = match exit {
        Ok(status) => status.code().unwrap_or(1),
        Err(_) => BINARY_NOT_FOUND_EXIT_CODE,
    };

    if exit_code != 0 {
        if let Some(buffer) = &silent_buffer {
            dump_buffer(buffer);
        }
    }

    crate::ProcRunnerOutcome {
        exit_code,
        stdout: if req.capture_stdout { Some(stdout_text) } else { None },
    }
}

fn spawn_relay<R>(
    pipe: Option<R>,
    capture: bool,
    silent_buffer: Option<&Result<tempfile::NamedTempFile, std::io::Error>>,
    is_stdout: bool,
) -> tokio::task::JoinHandle<String>
where
    R: tokio::io::AsyncRead + Unpin + Send + 'static,
{
    let buffer_path = silent_buffer
        .and_then(|b| b.as_ref().ok())
        .map(|f| f.path().to_path_buf());

    tokio::spawn(async move {
        let mut captured = String::new();
        let Some(pipe) = pipe else { return captured };
        let mut lines = BufReader::new(pipe).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            if capture {
                captured.push_str(&line);
                captured.push('\n');
            }
            match &buffer_path {
                Some(path) => append_buffered(path, &line),
                None if is_stdout => info!("| {line}"),
                None => warn!("! {line}"),
            }
        }
        captured
    })
}

fn append_buffered(path: &std::path::Path, line: &str) {
    if let Ok(mut file) = std::fs::OpenOptions::new().append(true).open(path) {
        let _ = writeln!(file, "{line}");
    }
}

fn dump_buffer(buffer: &Result<tempfile::NamedTempFile, std::io::Error>) {
    let Ok(file) = buffer else { return };
    if let Ok(contents) = std::fs::read_to_string(file.path()) {
        for line in contents.lines() {
            info!("| {line}");
        }
    }
}

/// SIGTERM (via the `kill` binary, portable across the targets this runs on
/// without pulling in a signals crate) followed by a grace period, then a
/// hard kill through tokio's own `start_kill`.
async fn terminate_gracefully(child: &mut tokio::process::Child) {
    if let Some(pid) = child.id() {
        let _ = std::process::Command::new("kill")
            .args(["-TERM", &pid.to_string()])
            .status();
    }
    tokio::time::sleep(crate::ProcessRunner::TERMINATION_GRACE).await;
    let _ = child.start_kill();
    let _ = child.wait().await;
}
