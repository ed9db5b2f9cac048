// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Query operator sequences
//!
//! A query plan is the root descriptor plus the ordered operator list the
//! fluent builders accumulate. Plans are data: built incrementally, then
//! handed to the operator compiler once and never mutated afterwards.

use crate::query::expr::{AggregateKind, Direction, Expr};
use crate::schema::EntityKind;
use serde::{Deserialize, Serialize};

/// Depth range for a traversal step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepthRange {
    pub min: u32,
    pub max: u32,
}

impl DepthRange {
    /// Exactly one hop, the default
    pub const fn single() -> Self {
        Self { min: 1, max: 1 }
    }

    /// Exactly `n` hops
    pub const fn exactly(n: u32) -> Self {
        Self { min: n, max: n }
    }

    /// Between `min` and `max` hops inclusive
    pub const fn between(min: u32, max: u32) -> Self {
        Self { min, max }
    }

    /// Whether this range denotes a plain single hop
    pub fn is_single_hop(&self) -> bool {
        self.min == 1 && self.max == 1
    }
}

/// Terminal reducers that end an operator sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TerminalKind {
    First,
    FirstOrDefault,
    Single,
    SingleOrDefault,
    Last,
    LastOrDefault,
    Any,
    All,
}

impl TerminalKind {
    /// Whether the terminal tolerates an empty result
    pub fn is_defaulting(&self) -> bool {
        matches!(
            self,
            TerminalKind::FirstOrDefault
                | TerminalKind::SingleOrDefault
                | TerminalKind::LastOrDefault
        )
    }

    /// Whether the terminal must detect multiplicity > 1
    pub fn checks_multiplicity(&self) -> bool {
        matches!(self, TerminalKind::Single | TerminalKind::SingleOrDefault)
    }

    /// Whether the terminal inverts the accumulated order direction
    pub fn inverts_order(&self) -> bool {
        matches!(self, TerminalKind::Last | TerminalKind::LastOrDefault)
    }
}

/// One relationship hop in a traversal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraversalStep {
    /// Relationship type to follow
    pub rel_type: String,
    /// Relationship entity type name, for shape lookup and diagnostics
    pub rel_type_name: String,
    /// Structural label of the far endpoint
    pub target_label: String,
    /// Target entity type name, for shape lookup and diagnostics
    pub target_type: String,
    pub direction: Direction,
    pub depth: DepthRange,
    /// Filter applied against the relationship alias
    pub rel_filter: Option<Expr>,
    /// Filter applied against the far endpoint alias
    pub target_filter: Option<Expr>,
}

impl TraversalStep {
    /// Single hop with no filters
    pub fn new(
        rel_type: impl Into<String>,
        rel_type_name: impl Into<String>,
        target_label: impl Into<String>,
        target_type: impl Into<String>,
        direction: Direction,
    ) -> Self {
        Self {
            rel_type: rel_type.into(),
            rel_type_name: rel_type_name.into(),
            target_label: target_label.into(),
            target_type: target_type.into(),
            direction,
            depth: DepthRange::single(),
            rel_filter: None,
            target_filter: None,
        }
    }
}

/// One operator in a query sequence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum QueryOp {
    /// Conjunctive predicate over the current alias
    Filter(Expr),
    /// Native projection into named fields
    Project(Vec<(String, Expr)>),
    /// Native projection into a single unnamed value
    ProjectValue(Expr),
    /// Projection applied in memory after materialization; the selector
    /// itself lives with the builder, outside the serializable plan
    ProjectPostFetch,
    OrderBy {
        key: Expr,
        descending: bool,
    },
    Skip(u64),
    Take(u64),
    Distinct,
    /// Group rows by a key expression; must be followed by a Project
    /// whose fields use GroupKey/Aggregate expressions
    GroupBy(Expr),
    /// Standalone aggregate reduction over the current stream
    Aggregate {
        kind: AggregateKind,
        selector: Option<Expr>,
    },
    /// Terminal reducer, optionally carrying a predicate (Any/All)
    Terminal {
        kind: TerminalKind,
        predicate: Option<Expr>,
    },
    /// Relationship hop producing a stream of far-endpoint nodes
    Traverse(TraversalStep),
    /// Relationship hop producing source/relationship/target tuples
    TraversePath(TraversalStep),
    /// Shortest path between the current pattern and the far endpoint
    ShortestPath(TraversalStep),
}

/// Root of a query: the entity type the pattern starts from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryRoot {
    /// Entity type name, for diagnostics
    pub type_name: String,
    /// Structural label (node label or relationship type)
    pub label: String,
    pub kind: EntityKind,
}

/// A complete query: root plus ordered operators
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryPlan {
    pub root: QueryRoot,
    pub ops: Vec<QueryOp>,
}

impl QueryPlan {
    /// Start a plan from a root descriptor
    pub fn new(root: QueryRoot) -> Self {
        Self {
            root,
            ops: Vec::new(),
        }
    }

    /// Append an operator, preserving encounter order
    pub fn push(&mut self, op: QueryOp) {
        self.ops.push(op);
    }
}
