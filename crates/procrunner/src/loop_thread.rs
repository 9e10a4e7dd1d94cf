// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The background event-loop thread that is the sole owner of child-process
//! I/O, per §5's concurrency model. Started once at process initialization,
//! stopped at teardown. The caller thread posts a [`Job`] and blocks on a
//! oneshot reply, so from the caller's perspective `ProcessRunner::run` is
//! synchronous even though the loop itself is async.

use std::thread::JoinHandle;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot};

use crate::exec::{run_process, SpawnRequest};
use crate::ProcRunnerOutcome;

struct Job {
    request: SpawnRequest,
    reply: oneshot::Sender<ProcRunnerOutcome>,
}

/// Owns the background thread and the channel into it. Dropping it stops
/// the loop and joins the thread.
pub struct ProcessRunner {
    tx: Option<mpsc::UnboundedSender<Job>>,
    handle: Option<JoinHandle<()>>,
}

impl ProcessRunner {
    /// Start the event-loop thread.
    #[allow(clippy::expect_used)]
    pub fn start() -> Self {
        let (tx, mut rx) = mpsc::unbounded_channel::<Job>();
        let handle = std::thread::Builder::new()
            .name("pipewright-procrunner".to_string())
            .spawn(move || {
                let rt = tokio::runtime::Builder::new_current_thread()
                    .enable_all()
                    .build()
                    .expect("failed to build procrunner tokio runtime");
                rt.block_on(async move {
                    while let Some(job) = rx.recv().await {
                        let outcome = run_process(job.request).await;
                        let _ = job.reply.send(outcome);
                    }
                });
            })
            .expect("failed to spawn procrunner background thread");

        ProcessRunner {
            tx: Some(tx),
            handle: Some(handle),
        }
    }

    /// Post `request` to the loop and block the calling thread until the
    /// child completes (or is killed on timeout).
    pub fn run(&self, request: SpawnRequest) -> ProcRunnerOutcome {
        let (reply_tx, reply_rx) = oneshot::channel();
        let job = Job { request, reply: reply_tx };
        match self.tx.as_ref() {
            Some(tx) if tx.send(job).is_ok() => reply_rx
                .blocking_recv()
                .unwrap_or(ProcRunnerOutcome::terminated(1)),
            _ => ProcRunnerOutcome::terminated(1),
        }
    }

    /// Grace period allowed between the graceful-termination signal and the
    /// hard kill, when a run times out.
    pub const TERMINATION_GRACE: Duration = Duration::from_millis(500);
}

impl Drop for ProcessRunner {
    fn drop(&mut self) {
        self.tx.take();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}
