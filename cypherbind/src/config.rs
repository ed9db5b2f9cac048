// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Connection and execution configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for a graph connection
///
/// Deserializable so callers can load it from their own config source;
/// the crate does not read files or environment variables itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphConfig {
    /// Bolt endpoint, e.g. `bolt://localhost:7687`
    pub uri: String,
    /// Database name; the driver default when empty
    #[serde(default)]
    pub database: String,
    /// Rows requested per fetch from the driver
    #[serde(default = "default_fetch_size")]
    pub fetch_size: usize,
    /// Per-statement execution timeout in milliseconds; 0 disables
    #[serde(default)]
    pub statement_timeout_ms: u64,
}

fn default_fetch_size() -> usize {
    1000
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            uri: "bolt://localhost:7687".to_string(),
            database: String::new(),
            fetch_size: default_fetch_size(),
            statement_timeout_ms: 0,
        }
    }
}

impl GraphConfig {
    /// The statement timeout as a duration, when one is configured
    pub fn statement_timeout(&self) -> Option<Duration> {
        if self.statement_timeout_ms == 0 {
            None
        } else {
            Some(Duration::from_millis(self.statement_timeout_ms))
        }
    }
}
