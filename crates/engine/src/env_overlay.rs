// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The process-environment diff the `env` task accumulates (§4.5). Kept as
//! an explicit overlay rather than mutated into the running process's own
//! environment — `std::env::set_var` is a process-wide, thread-unsafe
//! operation, and every place that actually needs these variables
//! (`command`/`shell` subprocess spawns) can simply apply the diff on top
//! of its own inherited environment when it builds a `SpawnRequest`.

use std::collections::HashMap;
use std::sync::Mutex;

/// `Some(value)` records a `set`; `None` records an `unset` (§4.5's `env`
/// task, whose `unset` removes named keys — snapshotting the key list up
/// front before writing means a document that sets and unsets in the same
/// pass never observes its own in-flight edits).
#[derive(Default)]
pub struct EnvOverlay {
    entries: Mutex<HashMap<String, Option<String>>>,
}

impl EnvOverlay {
    pub fn new() -> Self {
        EnvOverlay::default()
    }

    pub fn set(&self, key: String, value: String) {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.insert(key, Some(value));
    }

    pub fn unset(&self, keys: &[String]) {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        for key in keys {
            entries.insert(key.clone(), None);
        }
    }

    /// Split the accumulated diff into `(overrides, removals)` for a
    /// subprocess spawn.
    pub fn snapshot(&self) -> (Vec<(String, String)>, Vec<String>) {
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        let mut overrides = Vec::new();
        let mut removals = Vec::new();
        for (key, value) in entries.iter() {
            match value {
                Some(v) => overrides.push((key.clone(), v.clone())),
                None => removals.push(key.clone()),
            }
        }
        (overrides, removals)
    }

    /// The logical environment as the `env` task's `unset` glob patterns
    /// see it: the host process environment with this overlay's diff
    /// already applied, so a pattern can match a key an earlier `env` task
    /// in the same pipeline set (not just one inherited from the host).
    pub fn current_view(&self) -> HashMap<String, String> {
        let mut view: HashMap<String, String> = std::env::vars().collect();
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        for (key, value) in entries.iter() {
            match value {
                Some(v) => {
                    view.insert(key.clone(), v.clone());
                }
                None => {
                    view.remove(key);
                }
            }
        }
        view
    }
}

#[cfg(test)]
#[path = "env_overlay_tests.rs"]
mod tests;
