// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Typed, composable query representation
//!
//! `expr` holds the sub-expression tree and its fluent constructors,
//! `plan` the operator sequence, and `builder` the typed queryables that
//! accumulate a plan and execute it through the driver boundary.

pub mod builder;
pub mod expr;
pub mod plan;

pub use builder::{
    GroupedQuery, NodeQuery, PathQuery, ProjectedQuery, RecordQuery, RelationshipQuery,
    TraversalQuery, ValueQuery, WholePathQuery,
};
pub use expr::{agg, agg_count, alias_prop, case, group_key, group_members, item, lit, now, prop, rels};
pub use expr::{AggregateKind, BinaryOp, Direction, Expr, PropertyRoot, UnaryOp};
pub use plan::{DepthRange, QueryOp, QueryPlan, QueryRoot, TerminalKind, TraversalStep};
