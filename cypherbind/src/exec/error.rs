// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Materialization error types
//!
//! A conversion failure on one row aborts the whole result rather than
//! silently skipping it, so a partial collection can never be mistaken
//! for a complete one. Shape-identification failures are the one
//! per-row exception: the row is dropped with a diagnostic and the count
//! mismatch stays observable to the caller.

use crate::schema::ConversionError;
use thiserror::Error;

/// Materialization errors
#[derive(Error, Debug)]
pub enum MaterializeError {
    #[error("query expected at most one result but matched more than one row")]
    MultiplicityViolation,

    #[error("query returned no rows where one was required: {0}")]
    EmptyResult(String),

    #[error("result row is missing column: {0}")]
    MissingColumn(String),

    #[error("column {column} holds a {actual} where a {expected} was expected")]
    UnexpectedColumnType {
        column: String,
        expected: &'static str,
        actual: &'static str,
    },

    #[error("conversion failed: {0}")]
    Conversion(#[from] ConversionError),
}
