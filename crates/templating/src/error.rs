// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Errors raised while rendering templates or evaluating `when`/`with_items`
//! expressions.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("undefined variable: {0}")]
    Undefined(String),
    #[error("invalid expression: {0}")]
    InvalidExpression(String),
}

impl From<TemplateError> for pipewright_core::ExecuteError {
    fn from(e: TemplateError) -> Self {
        match e {
            TemplateError::Undefined(name) => pipewright_core::ExecuteError::UndefinedVariable(name),
            TemplateError::InvalidExpression(msg) => pipewright_core::ExecuteError::UndefinedVariable(
                format!("invalid expression: {msg}"),
            ),
        }
    }
}

impl From<TemplateError> for pipewright_core::ValidationError {
    fn from(e: TemplateError) -> Self {
        match e {
            TemplateError::Undefined(name) => {
                pipewright_core::ValidationError::InvalidExpression(format!("undefined: {name}"))
            }
            TemplateError::InvalidExpression(msg) => {
                pipewright_core::ValidationError::InvalidExpression(msg)
            }
        }
    }
}
