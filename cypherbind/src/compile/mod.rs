// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Query compilation: operator sequences to parameterized Cypher
//!
//! The operator compiler consumes a query plan in order, mutating a
//! single-query build context through the expression translator, and the
//! assembler renders the frozen context into the final statement text in
//! fixed clause order. Compilation is synchronous, pure CPU work;
//! compile-time errors surface before any I/O.

pub mod assembler;
pub mod context;
pub mod error;
pub mod functions;
pub mod operators;
pub mod translator;

pub use context::{BuildContext, ColumnRole, ResultShape};
pub use error::CompileError;
pub use operators::compile;

use crate::model::CypherValue;
use crate::query::plan::TerminalKind;
use crate::schema::{EntityShape, GraphEntity};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;

/// Labels, relationship types, aliases, and property names cannot be
/// parameterized in Cypher; anything else is rejected rather than quoted.
static IDENTIFIER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("identifier pattern"));

/// Validate a name that will be emitted verbatim into statement text
pub fn validate_identifier(name: &str) -> Result<(), CompileError> {
    if IDENTIFIER.is_match(name) {
        Ok(())
    } else {
        Err(CompileError::InvalidIdentifier(name.to_string()))
    }
}

/// Shape descriptors available to one compile pass, keyed by entity type
/// name
///
/// The builders collect the root shape plus every traversal target and
/// relationship shape the plan references.
#[derive(Debug, Clone, Default)]
pub struct ShapeTable {
    entries: HashMap<&'static str, &'static EntityShape>,
}

impl ShapeTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an entity type's shape
    pub fn register<T: GraphEntity>(&mut self) {
        let shape = T::shape();
        self.entries.insert(shape.type_name, shape);
    }

    /// Insert a shape directly
    pub fn insert(&mut self, shape: &'static EntityShape) {
        self.entries.insert(shape.type_name, shape);
    }

    /// Look up a shape by entity type name, falling back to the
    /// process-wide registry
    pub fn get(&self, type_name: &str) -> Option<&'static EntityShape> {
        self.entries
            .get(type_name)
            .copied()
            .or_else(|| crate::schema::lookup_shape(type_name))
    }
}

/// A fully compiled statement: text, parameters, and the result-shape
/// metadata the materializer interprets rows with
#[derive(Debug, Clone)]
pub struct CompiledStatement {
    /// Statement text, sent verbatim to the database
    pub text: String,
    /// Bound parameters in first-seen registration order
    pub parameters: Vec<(String, CypherValue)>,
    pub shape: ResultShape,
    /// Column-role map recorded during compilation, in RETURN order
    pub columns: Vec<(String, ColumnRole)>,
    /// Terminal reducer the materializer enforces, when one was compiled
    pub terminal: Option<TerminalKind>,
    /// The projection must be applied in memory after materialization
    pub post_fetch: bool,
}

impl CompiledStatement {
    /// The parameter table as a name-keyed map (driver-facing view)
    pub fn parameter_map(&self) -> HashMap<String, CypherValue> {
        self.parameters.iter().cloned().collect()
    }

    /// Look up the column recorded for a role
    pub fn column_for(&self, role: &ColumnRole) -> Option<&str> {
        self.columns
            .iter()
            .find(|(_, r)| r == role)
            .map(|(name, _)| name.as_str())
    }
}
