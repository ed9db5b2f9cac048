// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Top-level error type
//!
//! Compile-time errors are raised before any I/O occurs; driver and
//! materialization errors surface during execution.

use crate::compile::CompileError;
use crate::exec::driver::DriverError;
use crate::exec::error::MaterializeError;
use crate::schema::ConversionError;
use thiserror::Error;

/// Errors surfaced by query compilation, execution, and materialization
#[derive(Error, Debug)]
pub enum GraphError {
    #[error("compile error: {0}")]
    Compile(#[from] CompileError),

    #[error("driver error: {0}")]
    Driver(#[from] DriverError),

    #[error("materialization error: {0}")]
    Materialize(#[from] MaterializeError),

    #[error("conversion error: {0}")]
    Conversion(#[from] ConversionError),

    #[error("runtime error: {0}")]
    Runtime(String),
}
