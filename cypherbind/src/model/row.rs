// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Result rows streamed from the driver
//!
//! A row is an ordered sequence of named columns. Column order is
//! significant: the path-tuple materializer falls back to encounter-order
//! identification when no compiler-assigned column roles are available.

use crate::model::value::CypherValue;
use serde::{Deserialize, Serialize};

/// A single result row with ordered, named columns
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Row {
    columns: Vec<(String, CypherValue)>,
}

impl Row {
    /// Create an empty row
    pub fn new() -> Self {
        Self {
            columns: Vec::new(),
        }
    }

    /// Create a row from ordered column pairs
    pub fn from_columns(columns: Vec<(String, CypherValue)>) -> Self {
        Self { columns }
    }

    /// Append a column, preserving order
    pub fn push(&mut self, name: impl Into<String>, value: CypherValue) {
        self.columns.push((name.into(), value));
    }

    /// Get a column value by name
    pub fn get(&self, name: &str) -> Option<&CypherValue> {
        self.columns
            .iter()
            .find(|(col, _)| col == name)
            .map(|(_, value)| value)
    }

    /// Get a column value by position
    pub fn get_index(&self, index: usize) -> Option<&CypherValue> {
        self.columns.get(index).map(|(_, value)| value)
    }

    /// Column names in declaration order
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(name, _)| name.as_str())
    }

    /// Iterate over columns in declaration order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &CypherValue)> {
        self.columns
            .iter()
            .map(|(name, value)| (name.as_str(), value))
    }

    /// Number of columns
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Check whether the row has no columns
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Consume the row into its ordered columns
    pub fn into_columns(self) -> Vec<(String, CypherValue)> {
        self.columns
    }
}
