// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! pipewright - a declarative deployment-pipeline executor.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod exit_code;

use std::collections::HashSet;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use pipewright_core::{ExecutionContext, Outcome};
use pipewright_engine::{EnvOverlay, Pipeline, Registry};
use pipewright_procrunner::ProcessRunner;
use serde_yaml::Value as Yaml;
use tracing::{error, info};

use exit_code::ExitReason;

#[derive(Parser)]
#[command(name = "pipewright", version, about = "Run and validate deployment pipelines")]
struct Cli {
    /// Verbose logging.
    #[arg(short = 'd', long, global = true)]
    debug: bool,

    /// Only errors/fatals.
    #[arg(long, global = true)]
    silent: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse and validate every pipeline file.
    Validate {
        /// Pipeline document paths.
        paths: Vec<PathBuf>,
    },
    /// Validate then execute every pipeline file.
    Exec {
        /// Pipeline document paths.
        paths: Vec<PathBuf>,

        /// Restrict execution to nodes carrying one of these tags
        /// (repeatable; falls back to comma-separated `DEPLOYER_TAG`).
        #[arg(long = "tag")]
        tag: Vec<String>,

        /// Comma-separated glob patterns for positional matrix-tag
        /// filtering (falls back to `DEPLOYER_MATRIX_TAGS`).
        #[arg(long = "matrix-tags")]
        matrix_tags: Option<String>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.debug, cli.silent);

    let reason = match &cli.command {
        Commands::Validate { paths } => run_validate(paths),
        Commands::Exec { paths, tag, matrix_tags } => run_exec(paths, tag, matrix_tags.as_deref()),
    };

    match reason {
        Ok(reason) => reason.into(),
        Err(err) => {
            error!("{err:#}");
            ExitReason::HandlerFailure.into()
        }
    }
}

fn init_logging(debug: bool, silent: bool) {
    let level = if debug {
        "debug"
    } else if silent {
        "warn"
    } else {
        "info"
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(level))
        .without_time()
        .try_init();
}

fn run_validate(paths: &[PathBuf]) -> Result<ExitReason> {
    if paths.is_empty() {
        return Ok(ExitReason::BadOptions);
    }

    let registry = Registry::builtin();
    let runner = Arc::new(ProcessRunner::start());
    let env = Arc::new(EnvOverlay::new());

    for path in paths {
        let document = match load_document(path)? {
            Ok(document) => document,
            Err(e) => {
                error!(path = %path.display(), "{e}");
                return Ok(ExitReason::InvalidDocument);
            }
        };
        if let Err(e) = Pipeline::validate(&document, &registry, Arc::clone(&runner), Arc::clone(&env)) {
            error!(path = %path.display(), "{e}");
            return Ok(ExitReason::InvalidDocument);
        }
        info!(path = %path.display(), "document is valid");
    }
    Ok(ExitReason::Success)
}

fn run_exec(paths: &[PathBuf], tag: &[String], matrix_tags: Option<&str>) -> Result<ExitReason> {
    if paths.is_empty() {
        return Ok(ExitReason::BadOptions);
    }

    let selected_tags = resolve_tags(tag);
    let matrix_tag_patterns = resolve_matrix_tags(matrix_tags);

    let registry = Registry::builtin();
    let runner = Arc::new(ProcessRunner::start());
    let env = Arc::new(EnvOverlay::new());

    for path in paths {
        let document = match load_document(path)? {
            Ok(document) => document,
            Err(e) => {
                error!(path = %path.display(), "{e}");
                return Ok(ExitReason::InvalidDocument);
            }
        };
        let pipeline = match Pipeline::build(&document, &registry, Arc::clone(&runner), Arc::clone(&env)) {
            Ok(pipeline) => pipeline,
            Err(e) => {
                error!(path = %path.display(), "{e}");
                return Ok(ExitReason::InvalidDocument);
            }
        };

        let mut ctx = ExecutionContext::new(selected_tags.clone(), matrix_tag_patterns.clone());
        let result = pipeline
            .execute(&mut ctx)
            .with_context(|| format!("executing {}", path.display()))?;

        if result.outcome == Outcome::Failure {
            error!(path = %path.display(), "pipeline returned failure");
            return Ok(ExitReason::HandlerFailure);
        }
    }

    Ok(ExitReason::Success)
}

/// Reads `path` (an I/O error is a hard CLI failure) then parses it as YAML
/// (a parse error is treated the same as a validation failure — an invalid
/// document, exit code 2).
fn load_document(path: &PathBuf) -> Result<std::result::Result<Yaml, serde_yaml::Error>> {
    let contents = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    Ok(serde_yaml::from_str(&contents))
}

fn resolve_tags(tag: &[String]) -> HashSet<String> {
    if !tag.is_empty() {
        return tag.iter().cloned().collect();
    }
    std::env::var("DEPLOYER_TAG")
        .ok()
        .map(|csv| csv.split(',').map(str::trim).filter(|s| !s.is_empty()).map(str::to_string).collect())
        .unwrap_or_default()
}

fn resolve_matrix_tags(matrix_tags: Option<&str>) -> Vec<String> {
    let csv = matrix_tags.map(str::to_string).or_else(|| std::env::var("DEPLOYER_MATRIX_TAGS").ok());
    csv.map(|csv| csv.split(',').map(str::to_string).collect()).unwrap_or_default()
}

#[cfg(test)]
#[path = "main_tests.rs"]
mod tests;
