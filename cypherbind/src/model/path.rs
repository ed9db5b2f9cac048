// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Traversal path values
//!
//! A traversal path is an alternating sequence of nodes and relationships.
//! Path-shaped queries over a single hop materialize into typed
//! [`PathSegment`] values; variable-depth traversals keep the raw
//! [`TraversalPath`] with the full relationship list intact.

use crate::model::element::{NodeValue, RelationshipValue};
use serde::{Deserialize, Serialize};

/// A complete path through the graph: nodes joined by relationships
///
/// Invariant: `relationships.len() == nodes.len() - 1` and the path holds
/// at least one node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraversalPath {
    nodes: Vec<NodeValue>,
    relationships: Vec<RelationshipValue>,
}

impl TraversalPath {
    /// Create a path, validating the node/relationship count invariant
    pub fn new(
        nodes: Vec<NodeValue>,
        relationships: Vec<RelationshipValue>,
    ) -> Result<Self, String> {
        if nodes.is_empty() {
            return Err("path must contain at least one node".to_string());
        }
        if relationships.len() != nodes.len() - 1 {
            return Err(format!(
                "path with {} nodes must have exactly {} relationships, got {}",
                nodes.len(),
                nodes.len() - 1,
                relationships.len()
            ));
        }
        Ok(Self {
            nodes,
            relationships,
        })
    }

    /// The sequence of nodes in the path
    pub fn nodes(&self) -> &[NodeValue] {
        &self.nodes
    }

    /// The sequence of relationships connecting the nodes
    pub fn relationships(&self) -> &[RelationshipValue] {
        &self.relationships
    }

    /// Path length in hops
    pub fn length(&self) -> usize {
        self.relationships.len()
    }

    /// First node of the path
    pub fn start(&self) -> &NodeValue {
        &self.nodes[0]
    }

    /// Last node of the path
    pub fn end(&self) -> &NodeValue {
        &self.nodes[self.nodes.len() - 1]
    }
}

/// A single-hop path tuple with typed source, relationship, and target
#[derive(Debug, Clone, PartialEq)]
pub struct PathSegment<S, R, T> {
    pub source: S,
    pub relationship: R,
    pub target: T,
}

impl<S, R, T> PathSegment<S, R, T> {
    /// Create a new path segment
    pub fn new(source: S, relationship: R, target: T) -> Self {
        Self {
            source,
            relationship,
            target,
        }
    }
}
