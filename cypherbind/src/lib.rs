// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! CypherBind - Typed Cypher query compilation and result mapping
//!
//! CypherBind lets application code express graph-database queries through
//! a composable, typed query representation, compiles each query into a
//! parameterized Cypher statement, and materializes the heterogeneous
//! rows returned by the database back into typed values.
//!
//! # Features
//!
//! - **Typed queryables**: fluent filter, project, sort, group, aggregate,
//!   and multi-hop traversal over declared entity types
//! - **Parameterized compilation**: captured values are never inlined as
//!   statement text; every compile yields deterministic text and
//!   parameter order
//! - **Shape-directed materialization**: the compiler records how rows
//!   are to be interpreted, so a single-column row is never guessed at
//! - **Entity shapes**: explicitly registered field tables with storage
//!   classification, no runtime reflection
//! - **Async execution**: statements run against an opaque driver
//!   boundary; blocking entry points wait on the same async path
//!
//! # Usage
//!
//! ```rust,ignore
//! let graph = Graph::new(driver);
//!
//! let adults = graph
//!     .nodes::<Person>()
//!     .where_(prop("age").ge(lit(18)))
//!     .order_by(prop("name"))
//!     .take(20)
//!     .to_list()
//!     .await?;
//!
//! let count = graph.nodes::<Person>().count().await?;
//! ```

// Public modules - exposed to external users
pub mod compile;
pub mod config;
pub mod error;
pub mod exec;
pub mod graph;
pub mod model;
pub mod query;
pub mod schema;

// Re-export the public API surface
pub use compile::{ColumnRole, CompileError, CompiledStatement, ResultShape, ShapeTable};
pub use config::GraphConfig;
pub use error::GraphError;
pub use exec::{DriverError, GraphDriver, MaterializeError, QueryExecutor, RowStream};
pub use exec::{Materializer, TransactionHandle};
pub use graph::{new_element_id, Graph};
pub use model::{CypherValue, NodeValue, PathSegment, PropertyBag, RelationshipValue, Row};
pub use model::TraversalPath;
pub use query::{lit, prop, DepthRange, Direction, Expr, NodeQuery, RelationshipQuery};
pub use schema::{ConversionError, EntityKind, EntityShape, FieldDef, FieldKind};
pub use schema::{FromCypherValue, FromRecord, GraphEntity, NodeEntity, RelationshipEntity};

/// CypherBind version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// CypherBind crate name
pub const CRATE_NAME: &str = env!("CARGO_PKG_NAME");
