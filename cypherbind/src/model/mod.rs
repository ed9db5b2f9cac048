// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Driver-facing data model
//!
//! Defines the value space exchanged with the graph database driver:
//! scalar values, temporal wrappers, nodes, relationships, result rows,
//! and traversal paths.

pub mod element;
pub mod path;
pub mod row;
pub mod value;

// Re-export the main types for convenience
pub use element::{NodeValue, PropertyBag, RelationshipValue};
pub use path::{PathSegment, TraversalPath};
pub use row::Row;
pub use value::CypherValue;
