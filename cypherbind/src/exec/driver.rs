// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Driver boundary: statement execution and row streaming
//!
//! The core treats the driver as an opaque row source: it hands over
//! statement text plus bound parameters and consumes rows as they
//! stream. Transactions are caller-supplied handles; the core is
//! stateless with respect to their lifetime.

use crate::model::{CypherValue, Row};
use async_trait::async_trait;
use thiserror::Error;

/// Driver-side errors
#[derive(Error, Debug)]
pub enum DriverError {
    #[error("connection error: {0}")]
    Connection(String),

    #[error("statement error: {0}")]
    Statement(String),

    #[error("transaction error: {0}")]
    Transaction(String),
}

/// Opaque handle to a driver-managed transaction or session
///
/// Created and closed by the driver collaborator; the core only passes
/// it through.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionHandle {
    id: String,
}

impl TransactionHandle {
    /// Wrap a driver-assigned transaction identifier
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }

    /// The driver-assigned identifier
    pub fn id(&self) -> &str {
        &self.id
    }
}

/// Incremental row source for one executed statement
#[async_trait]
pub trait RowStream: Send {
    /// Next row, or `None` once the stream is exhausted
    async fn next_row(&mut self) -> Result<Option<Row>, DriverError>;
}

/// Executes statements against the remote graph database
#[async_trait]
pub trait GraphDriver: Send + Sync {
    /// Run a parameterized statement and stream its rows
    async fn run(
        &self,
        statement: &str,
        parameters: &[(String, CypherValue)],
        transaction: Option<&TransactionHandle>,
    ) -> Result<Box<dyn RowStream>, DriverError>;
}
