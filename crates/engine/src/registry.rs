// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The node factory registry: every built-in task kind (§4.5) registered in
//! a fixed order, consulted by [`crate::node::find_handler_key`] via
//! substring containment.

use crate::handlers;
use crate::node::HandlerFactory;

pub struct Registry {
    factories: Vec<Box<dyn HandlerFactory>>,
}

impl Registry {
    /// The registry of built-in task kinds, in the order they're probed for
    /// a substring match against a node's keys.
    pub fn builtin() -> Self {
        Registry {
            factories: vec![
                Box::new(handlers::echo::EchoFactory),
                Box::new(handlers::fail::FailFactory),
                Box::new(handlers::set::SetFactory),
                Box::new(handlers::env::EnvFactory),
                Box::new(handlers::command::CommandFactory),
                Box::new(handlers::shell::ShellFactory),
                Box::new(handlers::continue_task::ContinueFactory),
                Box::new(handlers::stage::StageFactory),
                Box::new(handlers::matrix::MatrixFactory),
            ],
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn HandlerFactory> {
        self.factories.iter().map(|f| f.as_ref())
    }

    pub fn lookup(&self, tag: &str) -> Option<&dyn HandlerFactory> {
        self.factories.iter().map(|f| f.as_ref()).find(|f| f.tag() == tag)
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
