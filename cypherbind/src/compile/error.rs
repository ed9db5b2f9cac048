// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Compilation error types
//!
//! Every variant is raised before any I/O occurs. Nothing here is a
//! warning: an expression or operator combination the compiler cannot
//! render fails the whole compile.

use thiserror::Error;

/// Compilation errors
#[derive(Error, Debug)]
pub enum CompileError {
    #[error("unsupported expression: {0}")]
    UnsupportedExpression(String),

    #[error("unsupported operator combination: {0}")]
    UnsupportedOperatorCombination(String),

    #[error("unresolved alias: {0}")]
    UnresolvedAlias(String),

    #[error("invalid identifier: {0}")]
    InvalidIdentifier(String),

    #[error("cannot determine RETURN clause: {0}")]
    EmptyReturn(String),
}
