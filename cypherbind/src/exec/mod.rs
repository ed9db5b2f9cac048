// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Statement execution against the driver boundary
//!
//! Compilation stays synchronous CPU work; execution is asynchronous and
//! cancellable. The blocking entry points are a synchronous wait over the
//! asynchronous path — never a second code path — so both behave
//! identically.

pub mod driver;
pub mod error;
pub mod materializer;

pub use driver::{DriverError, GraphDriver, RowStream, TransactionHandle};
pub use error::MaterializeError;
pub use materializer::Materializer;

use crate::compile::CompiledStatement;
use crate::error::GraphError;
use log::debug;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

/// Executes compiled statements through a driver
#[derive(Clone)]
pub struct QueryExecutor {
    driver: Arc<dyn GraphDriver>,
    timeout: Option<Duration>,
}

impl QueryExecutor {
    /// Create an executor over a driver
    pub fn new(driver: Arc<dyn GraphDriver>) -> Self {
        Self {
            driver,
            timeout: None,
        }
    }

    /// Apply a per-statement execution timeout
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// The underlying driver
    pub fn driver(&self) -> &Arc<dyn GraphDriver> {
        &self.driver
    }

    /// Run a compiled statement, returning its row stream
    pub async fn run(
        &self,
        statement: &CompiledStatement,
        transaction: Option<&TransactionHandle>,
    ) -> Result<Box<dyn RowStream>, GraphError> {
        self.run_raw(&statement.text, &statement.parameters, transaction)
            .await
    }

    /// Run raw statement text, for the facade's fixed CRUD statements
    pub async fn run_raw(
        &self,
        text: &str,
        parameters: &[(String, crate::model::CypherValue)],
        transaction: Option<&TransactionHandle>,
    ) -> Result<Box<dyn RowStream>, GraphError> {
        debug!("executing statement: {} ({} parameters)", text, parameters.len());
        let run = self.driver.run(text, parameters, transaction);
        let stream = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, run).await.map_err(|_| {
                GraphError::Runtime(format!("statement timed out after {:?}", limit))
            })??,
            None => run.await?,
        };
        Ok(stream)
    }
}

/// Synchronously wait on the asynchronous execution path
///
/// Builds a one-shot current-thread runtime; calling this from inside an
/// async context is a caller error.
pub fn block_on<T>(future: impl Future<Output = Result<T, GraphError>>) -> Result<T, GraphError> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| GraphError::Runtime(e.to_string()))?;
    runtime.block_on(future)
}
