// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! pipewright-core: the data model shared by every other crate — the
//! [`TaskResult`]/[`Outcome`] pair, the scoped [`VariableStore`], the
//! [`ExecutionContext`], the host-environment baseline frame, and the
//! validation/execution error taxonomy.

mod baseline;
mod context;
mod error;
mod result;
mod vars;

pub use baseline::baseline_frame;
pub use context::ExecutionContext;
pub use error::{ExecuteError, ValidationError};
pub use result::{Outcome, TaskResult};
pub use vars::{Frame, StoredValue, VariableStore};
