// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The baseline templating frame, populated from the host environment.
//!
//! Exposed keys mirror `original_source/context.py`'s `Context.__init__`:
//! `nbcpus`, `node`, `platform`, the `is_*` platform/CI flags, and `env`.

use std::collections::HashMap;

use serde_json::Value;

use crate::vars::Frame;

/// Build the baseline variable frame from the current host environment.
pub fn baseline_frame() -> Frame {
    let mut frame = Frame::new();

    frame.insert("nbcpus".into(), Value::from(detect_ncpus()).into());
    frame.insert("node".into(), Value::from(hostname()).into());

    let platform = platform_name();
    frame.insert("is_linux".into(), Value::from(platform.starts_with("linux")).into());
    frame.insert("is_bsd".into(), Value::from(platform.contains("bsd")).into());
    frame.insert("is_darwin".into(), Value::from(platform.starts_with("macos") || platform.starts_with("darwin")).into());
    frame.insert("is_windows".into(), Value::from(platform.starts_with("windows") || platform.starts_with("win")).into());
    frame.insert("platform".into(), Value::from(platform).into());

    frame.insert("is_travis".into(), Value::from(std::env::var("TRAVIS").is_ok()).into());
    frame.insert("is_appveyor".into(), Value::from(std::env::var("APPVEYOR").is_ok()).into());
    frame.insert(
        "is_ci".into(),
        Value::from(std::env::var("CI").is_ok() || std::env::var("CONTINUOUS_INTEGRATION").is_ok()).into(),
    );

    let env_map: HashMap<String, String> = std::env::vars().collect();
    frame.insert(
        "env".into(),
        serde_json::to_value(env_map).unwrap_or(Value::Object(Default::default())).into(),
    );

    frame
}

/// Detect the number of logical CPUs; defaults to 1 when undetectable.
fn detect_ncpus() -> u64 {
    std::thread::available_parallelism()
        .map(|n| n.get() as u64)
        .unwrap_or(1)
}

fn hostname() -> String {
    // `hostname` isn't in std; shell out the way a small CLI would, falling
    // back to the HOSTNAME/COMPUTERNAME env vars used by most shells.
    if let Ok(name) = std::env::var("HOSTNAME") {
        return name;
    }
    if let Ok(name) = std::env::var("COMPUTERNAME") {
        return name;
    }
    std::process::Command::new("hostname")
        .output()
        .ok()
        .and_then(|out| String::from_utf8(out.stdout).ok())
        .map(|s| s.trim().to_string())
        .unwrap_or_else(|| "localhost".to_string())
}

fn platform_name() -> String {
    std::env::consts::OS.to_lowercase()
}

#[cfg(test)]
#[path = "baseline_tests.rs"]
mod tests;
