// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! CLI exit codes (§6): `0` success, `1` handler failure at runtime,
//! `2` document invalid, `3` bad option combination.

use std::process::ExitCode;

pub enum ExitReason {
    Success,
    HandlerFailure,
    InvalidDocument,
    BadOptions,
}

impl From<ExitReason> for ExitCode {
    fn from(reason: ExitReason) -> Self {
        match reason {
            ExitReason::Success => ExitCode::from(0),
            ExitReason::HandlerFailure => ExitCode::from(1),
            ExitReason::InvalidDocument => ExitCode::from(2),
            ExitReason::BadOptions => ExitCode::from(3),
        }
    }
}
