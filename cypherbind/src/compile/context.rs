// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Build context: mutable, single-query-scoped compilation state
//!
//! One context is allocated per compile pass, mutated only by the
//! operator compiler and the expression translator, then frozen into a
//! [`CompiledStatement`](crate::compile::CompiledStatement) by the
//! assembler. Contexts are never shared across queries.

use crate::model::CypherValue;
use crate::query::plan::{QueryRoot, TerminalKind};
use crate::schema::{EntityKind, EntityShape};
use std::collections::HashMap;

/// Compiler-computed tag describing how returned rows are interpreted
///
/// Computed during compilation, never inferred from returned rows: a
/// single-column row alone cannot distinguish a node from a relationship
/// from a scalar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum ResultShape {
    EntityList,
    SingleEntity,
    Scalar,
    Boolean,
    GroupedProjection,
    PathTuple,
}

/// Role of one returned column, recorded at compile time
///
/// The materializer identifies columns by role; runtime type inspection
/// is only a fallback for rows whose roles could not be assigned.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum ColumnRole {
    /// The root or post-traversal entity
    Entity,
    /// Source node of a path tuple
    SourceNode,
    /// Relationship (or relationship list, for variable depth) of a path tuple
    Relationship,
    /// Target node of a path tuple
    TargetNode,
    /// Identifier of a relationship's start node, returned alongside it
    StartId,
    /// Identifier of a relationship's end node, returned alongside it
    EndId,
    /// Node sequence of a whole-path query
    PathNodes,
    /// Relationship sequence of a whole-path query
    PathRelationships,
    /// A single projected scalar value
    Scalar,
    /// A named field of a projected record
    Field(String),
}

/// One rendered RETURN item
#[derive(Debug, Clone)]
pub struct ReturnItem {
    pub fragment: String,
    /// Rendered `AS` alias, when one is emitted
    pub alias: Option<String>,
    pub role: ColumnRole,
}

impl ReturnItem {
    /// The column name the driver will report for this item
    pub fn column_name(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.fragment)
    }
}

/// One accumulated order key
#[derive(Debug, Clone)]
pub struct OrderKey {
    pub fragment: String,
    pub descending: bool,
}

/// Aliases generated by a grouping rewrite
#[derive(Debug, Clone)]
pub struct GroupContext {
    pub key_alias: String,
    pub members_alias: String,
    /// Shape of the collected members, for selector resolution
    pub member_shape: Option<&'static EntityShape>,
}

/// Aliases generated by a single-hop path-shaped traversal
///
/// Variable-depth path queries bind a whole path variable instead and
/// return its node/relationship sequences.
#[derive(Debug, Clone)]
pub struct PathAliases {
    pub source: String,
    pub relationship: String,
    pub target: String,
}

/// Mutable, single-query-scoped compilation state
pub struct BuildContext {
    pub root: QueryRoot,
    /// Alias stack with the shape bound at each level; the top is the
    /// "current alias" every Current-rooted property resolves against
    alias_stack: Vec<(String, Option<&'static EntityShape>)>,
    /// Comprehension item bindings currently in scope
    binding_stack: Vec<String>,
    node_alias_count: usize,
    rel_alias_count: usize,
    /// The single pattern being extended by traversal steps; empty until
    /// a traversal runs, in which case the assembler synthesizes the base
    /// pattern from the root
    pub match_pattern: String,
    /// Optional path alias prefix (`p = shortestPath(...)`)
    pub path_binding: Option<String>,
    pub where_fragments: Vec<String>,
    pub with_fragment: Option<String>,
    pub return_items: Vec<ReturnItem>,
    pub order_keys: Vec<OrderKey>,
    pub skip: Option<u64>,
    pub limit: Option<u64>,
    pub distinct: bool,
    /// Invert every accumulated order direction at render time
    pub invert_order: bool,
    parameters: Vec<(String, CypherValue)>,
    pub shape: ResultShape,
    pub terminal: Option<TerminalKind>,
    pub post_fetch: bool,
    pub group: Option<GroupContext>,
    pub path: Option<PathAliases>,
}

impl BuildContext {
    /// Create a context for one compile pass, binding the root alias
    pub fn new(root: QueryRoot, root_shape: Option<&'static EntityShape>) -> Self {
        let root_alias = match root.kind {
            EntityKind::Node => "n".to_string(),
            EntityKind::Relationship => "r".to_string(),
        };
        Self {
            root,
            alias_stack: vec![(root_alias, root_shape)],
            binding_stack: Vec::new(),
            node_alias_count: 0,
            rel_alias_count: 0,
            match_pattern: String::new(),
            path_binding: None,
            where_fragments: Vec::new(),
            with_fragment: None,
            return_items: Vec::new(),
            order_keys: Vec::new(),
            skip: None,
            limit: None,
            distinct: false,
            invert_order: false,
            parameters: Vec::new(),
            shape: ResultShape::EntityList,
            terminal: None,
            post_fetch: false,
            group: None,
            path: None,
        }
    }

    /// The alias Current-rooted property accesses resolve against
    pub fn current_alias(&self) -> &str {
        // The stack is never empty: new() seeds it and pops are paired
        // with pushes.
        &self.alias_stack.last().expect("alias stack underflow").0
    }

    /// The shape bound to the current alias, when one is known
    pub fn current_shape(&self) -> Option<&'static EntityShape> {
        self.alias_stack.last().and_then(|(_, shape)| *shape)
    }

    /// Temporarily rebind the current alias (traversal filter discipline);
    /// every push must be paired with a pop
    pub fn push_alias(&mut self, alias: impl Into<String>, shape: Option<&'static EntityShape>) {
        self.alias_stack.push((alias.into(), shape));
    }

    /// Restore the previously bound alias
    pub fn pop_alias(&mut self) {
        self.alias_stack.pop();
    }

    /// Permanently move the current alias to a traversal's far endpoint
    pub fn rebind_current(&mut self, alias: impl Into<String>, shape: Option<&'static EntityShape>) {
        self.alias_stack.pop();
        self.alias_stack.push((alias.into(), shape));
    }

    /// Whether `name` is a pattern alias visible to the query
    pub fn has_alias(&self, name: &str) -> bool {
        self.alias_stack.iter().any(|(alias, _)| alias == name)
    }

    /// Bring a comprehension item binding into scope
    pub fn push_binding(&mut self, binding: impl Into<String>) {
        self.binding_stack.push(binding.into());
    }

    /// Drop the innermost comprehension binding
    pub fn pop_binding(&mut self) {
        self.binding_stack.pop();
    }

    /// Whether `name` is a comprehension binding currently in scope
    pub fn has_binding(&self, name: &str) -> bool {
        self.binding_stack.iter().any(|b| b == name)
    }

    /// Fresh alias for a traversal's far endpoint node
    pub fn fresh_node_alias(&mut self) -> String {
        self.node_alias_count += 1;
        format!("n{}", self.node_alias_count)
    }

    /// Fresh alias for a traversal's relationship
    pub fn fresh_rel_alias(&mut self) -> String {
        self.rel_alias_count += 1;
        format!("r{}", self.rel_alias_count)
    }

    /// Register a captured value, returning its parameter name
    ///
    /// Names are generated `p0, p1, …` in first-seen order; the table is
    /// append-only.
    pub fn add_parameter(&mut self, value: CypherValue) -> String {
        let name = format!("p{}", self.parameters.len());
        self.parameters.push((name.clone(), value));
        name
    }

    /// The accumulated parameter table in registration order
    pub fn parameters(&self) -> &[(String, CypherValue)] {
        &self.parameters
    }

    /// Consume the context's parameter table
    pub fn take_parameters(&mut self) -> Vec<(String, CypherValue)> {
        std::mem::take(&mut self.parameters)
    }

    /// The parameter table as a name-keyed map (driver-facing view)
    pub fn parameter_map(&self) -> HashMap<String, CypherValue> {
        self.parameters.iter().cloned().collect()
    }
}
