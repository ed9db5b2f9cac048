// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Graph element values as returned by the driver
//!
//! Nodes and relationships cross the driver boundary as property bags with
//! identity metadata. Typed entities are reconstructed from these by the
//! materializer through the schema converter.

use crate::model::value::CypherValue;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Property bag shared by nodes, relationships, and map-shaped rows
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PropertyBag {
    entries: HashMap<String, CypherValue>,
}

impl PropertyBag {
    /// Create an empty property bag
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Create a bag from raw entries
    pub fn from_entries(entries: HashMap<String, CypherValue>) -> Self {
        Self { entries }
    }

    /// Insert a property value
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<CypherValue>) {
        self.entries.insert(key.into(), value.into());
    }

    /// Get a property value
    pub fn get(&self, key: &str) -> Option<&CypherValue> {
        self.entries.get(key)
    }

    /// Remove and return a property value
    pub fn take(&mut self, key: &str) -> Option<CypherValue> {
        self.entries.remove(key)
    }

    /// Check whether a property is present
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Number of properties in the bag
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check whether the bag is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over the entries
    pub fn iter(&self) -> impl Iterator<Item = (&String, &CypherValue)> {
        self.entries.iter()
    }

    /// Consume the bag into its raw entries
    pub fn into_entries(self) -> HashMap<String, CypherValue> {
        self.entries
    }
}

impl FromIterator<(String, CypherValue)> for PropertyBag {
    fn from_iter<I: IntoIterator<Item = (String, CypherValue)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

/// Graph node with identity, labels, and properties
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeValue {
    pub id: String,
    pub labels: Vec<String>,
    pub properties: PropertyBag,
}

impl NodeValue {
    /// Create a new node value
    pub fn new(id: impl Into<String>, labels: Vec<String>, properties: PropertyBag) -> Self {
        Self {
            id: id.into(),
            labels,
            properties,
        }
    }

    /// Check if the node carries a specific label
    pub fn has_label(&self, label: &str) -> bool {
        self.labels.iter().any(|l| l == label)
    }
}

/// Graph relationship with identity, type, endpoints, and properties
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelationshipValue {
    pub id: String,
    pub rel_type: String,
    pub start_id: String,
    pub end_id: String,
    pub properties: PropertyBag,
}

impl RelationshipValue {
    /// Create a new relationship value
    pub fn new(
        id: impl Into<String>,
        rel_type: impl Into<String>,
        start_id: impl Into<String>,
        end_id: impl Into<String>,
        properties: PropertyBag,
    ) -> Self {
        Self {
            id: id.into(),
            rel_type: rel_type.into(),
            start_id: start_id.into(),
            end_id: end_id.into(),
            properties,
        }
    }
}
