// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Fluent, typed query builders
//!
//! Builders accumulate a query plan operator by operator; terminal
//! executors compile the plan, run it through the driver boundary, and
//! materialize the streamed rows. Every blocking entry point is a
//! synchronous wait over the corresponding async path, never a separate
//! code path.

use crate::compile::{compile, CompileError, CompiledStatement, ShapeTable};
use crate::error::GraphError;
use crate::exec::{block_on, Materializer, QueryExecutor, RowStream, TransactionHandle};
use crate::exec::error::MaterializeError;
use crate::model::{PathSegment, TraversalPath};
use crate::query::expr::{AggregateKind, Direction, Expr};
use crate::query::plan::{DepthRange, QueryOp, QueryPlan, QueryRoot, TerminalKind, TraversalStep};
use crate::schema::{FromCypherValue, FromRecord, GraphEntity, NodeEntity, RelationshipEntity};
use std::marker::PhantomData;
use std::sync::Arc;

/// Shared builder state: executor, shape table, accumulated plan, and the
/// optional caller-supplied transaction
#[derive(Clone)]
struct QueryCore {
    executor: QueryExecutor,
    shapes: ShapeTable,
    plan: QueryPlan,
    transaction: Option<TransactionHandle>,
}

impl QueryCore {
    fn start<T: GraphEntity>(executor: QueryExecutor) -> Self {
        let shape = T::shape();
        let mut shapes = ShapeTable::new();
        shapes.register::<T>();
        let root = QueryRoot {
            type_name: shape.type_name.to_string(),
            label: shape.label.to_string(),
            kind: shape.kind,
        };
        Self {
            executor,
            shapes,
            plan: QueryPlan::new(root),
            transaction: None,
        }
    }

    fn push(&mut self, op: QueryOp) {
        self.plan.push(op);
    }

    fn compile(&self) -> Result<CompiledStatement, CompileError> {
        compile(&self.plan, &self.shapes)
    }

    /// Compile the plan with trailing operators appended, leaving the
    /// accumulated plan untouched
    fn compile_with(&self, extra: Vec<QueryOp>) -> Result<CompiledStatement, CompileError> {
        let mut plan = self.plan.clone();
        for op in extra {
            plan.push(op);
        }
        compile(&plan, &self.shapes)
    }

    async fn run(&self, statement: &CompiledStatement) -> Result<Box<dyn RowStream>, GraphError> {
        self.executor.run(statement, self.transaction.as_ref()).await
    }
}

/// Queryable over nodes of one entity type
pub struct NodeQuery<T: NodeEntity> {
    core: QueryCore,
    _entity: PhantomData<fn() -> T>,
}

impl<T: NodeEntity> NodeQuery<T> {
    /// Start a query over all nodes of `T`
    pub fn new(executor: QueryExecutor) -> Self {
        Self {
            core: QueryCore::start::<T>(executor),
            _entity: PhantomData,
        }
    }

    fn from_core(core: QueryCore) -> Self {
        Self {
            core,
            _entity: PhantomData,
        }
    }

    /// Run terminal executors under a caller-supplied transaction
    pub fn in_transaction(mut self, transaction: TransactionHandle) -> Self {
        self.core.transaction = Some(transaction);
        self
    }

    /// Filter by a predicate; multiple filters are conjoined in order
    pub fn where_(mut self, predicate: Expr) -> Self {
        self.core.push(QueryOp::Filter(predicate));
        self
    }

    /// Order ascending by a key expression
    pub fn order_by(mut self, key: Expr) -> Self {
        self.core.push(QueryOp::OrderBy {
            key,
            descending: false,
        });
        self
    }

    /// Order descending by a key expression
    pub fn order_by_descending(mut self, key: Expr) -> Self {
        self.core.push(QueryOp::OrderBy {
            key,
            descending: true,
        });
        self
    }

    /// Add a secondary ascending order key
    pub fn then_by(self, key: Expr) -> Self {
        self.order_by(key)
    }

    /// Add a secondary descending order key
    pub fn then_by_descending(self, key: Expr) -> Self {
        self.order_by_descending(key)
    }

    /// Skip the first `n` results
    pub fn skip(mut self, n: u64) -> Self {
        self.core.push(QueryOp::Skip(n));
        self
    }

    /// Keep only the first `n` results
    pub fn take(mut self, n: u64) -> Self {
        self.core.push(QueryOp::Take(n));
        self
    }

    /// Deduplicate returned rows
    pub fn distinct(mut self) -> Self {
        self.core.push(QueryOp::Distinct);
        self
    }

    /// Project each entity into a named-field record
    ///
    /// The projection compiles natively when every field is expressible;
    /// otherwise, with a fallback registered, the whole projection is
    /// applied in memory after materialization. Never partially applied.
    pub fn select<P: FromRecord>(self, fields: Vec<(&str, Expr)>) -> ProjectedQuery<T, P> {
        ProjectedQuery {
            core: self.core,
            fields: fields
                .into_iter()
                .map(|(name, expr)| (name.to_string(), expr))
                .collect(),
            fallback: None,
            _entity: PhantomData,
        }
    }

    /// Project each entity into a single value
    pub fn select_value<V: FromCypherValue>(mut self, expr: Expr) -> ValueQuery<V> {
        self.core.push(QueryOp::ProjectValue(expr));
        ValueQuery {
            core: self.core,
            _value: PhantomData,
        }
    }

    /// Group by a key expression; must be followed by a grouped projection
    pub fn group_by(self, key: Expr) -> GroupedQuery<T> {
        GroupedQuery {
            core: self.core,
            key,
            _entity: PhantomData,
        }
    }

    /// Follow relationships of type `R` to nodes of type `U`
    pub fn traverse<R: RelationshipEntity, U: NodeEntity>(
        self,
        direction: Direction,
    ) -> TraversalQuery<T, R, U> {
        TraversalQuery::new(self.core, direction)
    }

    /// Compile the accumulated plan without executing it
    pub fn compile(&self) -> Result<CompiledStatement, CompileError> {
        self.core.compile()
    }

    /// Execute and return all matching entities
    pub async fn to_list(&self) -> Result<Vec<T>, GraphError> {
        let statement = self.core.compile()?;
        let mut stream = self.core.run(&statement).await?;
        Materializer::new(&statement)
            .node_list(stream.as_mut())
            .await
    }

    /// Blocking form of [`to_list`](Self::to_list)
    pub fn to_list_blocking(&self) -> Result<Vec<T>, GraphError> {
        block_on(self.to_list())
    }

    async fn terminal_entity(&self, kind: TerminalKind) -> Result<Option<T>, GraphError> {
        let statement = self.core.compile_with(vec![QueryOp::Terminal {
            kind,
            predicate: None,
        }])?;
        let mut stream = self.core.run(&statement).await?;
        Materializer::new(&statement)
            .single_node(stream.as_mut())
            .await
    }

    /// First matching entity; error when none match
    pub async fn first(&self) -> Result<T, GraphError> {
        self.terminal_entity(TerminalKind::First)
            .await?
            .ok_or_else(|| empty("first()"))
    }

    /// First matching entity, or `None`
    pub async fn first_or_default(&self) -> Result<Option<T>, GraphError> {
        self.terminal_entity(TerminalKind::FirstOrDefault).await
    }

    /// Blocking form of [`first_or_default`](Self::first_or_default)
    pub fn first_or_default_blocking(&self) -> Result<Option<T>, GraphError> {
        block_on(self.first_or_default())
    }

    /// The only matching entity; error when none or more than one match
    pub async fn single(&self) -> Result<T, GraphError> {
        self.terminal_entity(TerminalKind::Single)
            .await?
            .ok_or_else(|| empty("single()"))
    }

    /// The only matching entity, or `None`; error when more than one match
    pub async fn single_or_default(&self) -> Result<Option<T>, GraphError> {
        self.terminal_entity(TerminalKind::SingleOrDefault).await
    }

    /// Blocking form of [`single_or_default`](Self::single_or_default)
    pub fn single_or_default_blocking(&self) -> Result<Option<T>, GraphError> {
        block_on(self.single_or_default())
    }

    /// Last matching entity under the accumulated order; error when none
    pub async fn last(&self) -> Result<T, GraphError> {
        self.terminal_entity(TerminalKind::Last)
            .await?
            .ok_or_else(|| empty("last()"))
    }

    /// Last matching entity under the accumulated order, or `None`
    pub async fn last_or_default(&self) -> Result<Option<T>, GraphError> {
        self.terminal_entity(TerminalKind::LastOrDefault).await
    }

    async fn reduce_bool(
        &self,
        kind: TerminalKind,
        predicate: Option<Expr>,
    ) -> Result<bool, GraphError> {
        let statement = self
            .core
            .compile_with(vec![QueryOp::Terminal { kind, predicate }])?;
        let mut stream = self.core.run(&statement).await?;
        Materializer::new(&statement).boolean(stream.as_mut()).await
    }

    /// Whether any entity matches the accumulated filters
    pub async fn any(&self) -> Result<bool, GraphError> {
        self.reduce_bool(TerminalKind::Any, None).await
    }

    /// Whether any entity matches an additional predicate
    pub async fn any_where(&self, predicate: Expr) -> Result<bool, GraphError> {
        self.reduce_bool(TerminalKind::Any, Some(predicate)).await
    }

    /// Blocking form of [`any`](Self::any)
    pub fn any_blocking(&self) -> Result<bool, GraphError> {
        block_on(self.any())
    }

    /// Whether the predicate holds for every matching entity
    pub async fn all(&self, predicate: Expr) -> Result<bool, GraphError> {
        self.reduce_bool(TerminalKind::All, Some(predicate)).await
    }

    /// Number of matching entities
    pub async fn count(&self) -> Result<i64, GraphError> {
        let statement = self.core.compile_with(vec![QueryOp::Aggregate {
            kind: AggregateKind::Count,
            selector: None,
        }])?;
        let mut stream = self.core.run(&statement).await?;
        Materializer::new(&statement)
            .scalar::<i64>(stream.as_mut())
            .await?
            .ok_or_else(|| empty("count()"))
    }

    /// Blocking form of [`count`](Self::count)
    pub fn count_blocking(&self) -> Result<i64, GraphError> {
        block_on(self.count())
    }

    async fn aggregate<V: FromCypherValue>(
        &self,
        kind: AggregateKind,
        selector: Expr,
    ) -> Result<Option<V>, GraphError> {
        let statement = self.core.compile_with(vec![QueryOp::Aggregate {
            kind,
            selector: Some(selector),
        }])?;
        let mut stream = self.core.run(&statement).await?;
        Materializer::new(&statement).scalar(stream.as_mut()).await
    }

    /// Sum of a property selector over all matching entities
    pub async fn sum<V: FromCypherValue>(&self, selector: Expr) -> Result<Option<V>, GraphError> {
        self.aggregate(AggregateKind::Sum, selector).await
    }

    /// Average of a property selector over all matching entities
    pub async fn avg<V: FromCypherValue>(&self, selector: Expr) -> Result<Option<V>, GraphError> {
        self.aggregate(AggregateKind::Avg, selector).await
    }

    /// Minimum of a property selector over all matching entities
    pub async fn min_of<V: FromCypherValue>(
        &self,
        selector: Expr,
    ) -> Result<Option<V>, GraphError> {
        self.aggregate(AggregateKind::Min, selector).await
    }

    /// Maximum of a property selector over all matching entities
    pub async fn max_of<V: FromCypherValue>(
        &self,
        selector: Expr,
    ) -> Result<Option<V>, GraphError> {
        self.aggregate(AggregateKind::Max, selector).await
    }
}

/// Queryable over relationships of one entity type
pub struct RelationshipQuery<T: RelationshipEntity> {
    core: QueryCore,
    _entity: PhantomData<fn() -> T>,
}

impl<T: RelationshipEntity> RelationshipQuery<T> {
    /// Start a query over all relationships of `T`
    pub fn new(executor: QueryExecutor) -> Self {
        Self {
            core: QueryCore::start::<T>(executor),
            _entity: PhantomData,
        }
    }

    /// Run terminal executors under a caller-supplied transaction
    pub fn in_transaction(mut self, transaction: TransactionHandle) -> Self {
        self.core.transaction = Some(transaction);
        self
    }

    /// Filter by a predicate; multiple filters are conjoined in order
    pub fn where_(mut self, predicate: Expr) -> Self {
        self.core.push(QueryOp::Filter(predicate));
        self
    }

    /// Order ascending by a key expression
    pub fn order_by(mut self, key: Expr) -> Self {
        self.core.push(QueryOp::OrderBy {
            key,
            descending: false,
        });
        self
    }

    /// Order descending by a key expression
    pub fn order_by_descending(mut self, key: Expr) -> Self {
        self.core.push(QueryOp::OrderBy {
            key,
            descending: true,
        });
        self
    }

    /// Add a secondary ascending order key
    pub fn then_by(self, key: Expr) -> Self {
        self.order_by(key)
    }

    /// Skip the first `n` results
    pub fn skip(mut self, n: u64) -> Self {
        self.core.push(QueryOp::Skip(n));
        self
    }

    /// Keep only the first `n` results
    pub fn take(mut self, n: u64) -> Self {
        self.core.push(QueryOp::Take(n));
        self
    }

    /// Compile the accumulated plan without executing it
    pub fn compile(&self) -> Result<CompiledStatement, CompileError> {
        self.core.compile()
    }

    /// Execute and return all matching relationships
    pub async fn to_list(&self) -> Result<Vec<T>, GraphError> {
        let statement = self.core.compile()?;
        let mut stream = self.core.run(&statement).await?;
        Materializer::new(&statement)
            .relationship_list(stream.as_mut())
            .await
    }

    /// Blocking form of [`to_list`](Self::to_list)
    pub fn to_list_blocking(&self) -> Result<Vec<T>, GraphError> {
        block_on(self.to_list())
    }

    async fn terminal_entity(&self, kind: TerminalKind) -> Result<Option<T>, GraphError> {
        let statement = self.core.compile_with(vec![QueryOp::Terminal {
            kind,
            predicate: None,
        }])?;
        let mut stream = self.core.run(&statement).await?;
        Materializer::new(&statement)
            .single_relationship(stream.as_mut())
            .await
    }

    /// First matching relationship, or `None`
    pub async fn first_or_default(&self) -> Result<Option<T>, GraphError> {
        self.terminal_entity(TerminalKind::FirstOrDefault).await
    }

    /// The only matching relationship, or `None`; error when more than
    /// one matches
    pub async fn single_or_default(&self) -> Result<Option<T>, GraphError> {
        self.terminal_entity(TerminalKind::SingleOrDefault).await
    }

    /// Number of matching relationships
    pub async fn count(&self) -> Result<i64, GraphError> {
        let statement = self.core.compile_with(vec![QueryOp::Aggregate {
            kind: AggregateKind::Count,
            selector: None,
        }])?;
        let mut stream = self.core.run(&statement).await?;
        Materializer::new(&statement)
            .scalar::<i64>(stream.as_mut())
            .await?
            .ok_or_else(|| empty("count()"))
    }
}

/// A projection into a named-field record type
pub struct ProjectedQuery<T: NodeEntity, P: FromRecord> {
    core: QueryCore,
    fields: Vec<(String, Expr)>,
    fallback: Option<Arc<dyn Fn(&T) -> P + Send + Sync>>,
    _entity: PhantomData<fn() -> T>,
}

impl<T: NodeEntity, P: FromRecord> ProjectedQuery<T, P> {
    /// Register the in-memory projection applied when the field
    /// expressions cannot compile natively
    pub fn with_fallback(mut self, project: impl Fn(&T) -> P + Send + Sync + 'static) -> Self {
        self.fallback = Some(Arc::new(project));
        self
    }

    /// Execute and return the projected records
    pub async fn to_list(&self) -> Result<Vec<P>, GraphError> {
        let native = self
            .core
            .compile_with(vec![QueryOp::Project(self.fields.clone())]);
        let statement = match native {
            Ok(statement) => statement,
            Err(CompileError::UnsupportedExpression(reason)) => {
                // Whole-projection fallback: fetch raw entities and apply
                // the registered projection in memory. Either every field
                // compiles natively or none does.
                let Some(project) = &self.fallback else {
                    return Err(CompileError::UnsupportedExpression(reason).into());
                };
                let statement = self.core.compile_with(vec![QueryOp::ProjectPostFetch])?;
                let mut stream = self.core.run(&statement).await?;
                let raw: Vec<T> = Materializer::new(&statement)
                    .node_list(stream.as_mut())
                    .await?;
                return Ok(raw.iter().map(|entity| project(entity)).collect());
            }
            Err(other) => return Err(other.into()),
        };
        let mut stream = self.core.run(&statement).await?;
        let records = Materializer::new(&statement)
            .records(stream.as_mut())
            .await?;
        records
            .iter()
            .map(|record| P::from_record(record).map_err(GraphError::from))
            .collect()
    }

    /// Blocking form of [`to_list`](Self::to_list)
    pub fn to_list_blocking(&self) -> Result<Vec<P>, GraphError> {
        block_on(self.to_list())
    }
}

/// A projection into a single value per row
pub struct ValueQuery<V: FromCypherValue> {
    core: QueryCore,
    _value: PhantomData<fn() -> V>,
}

impl<V: FromCypherValue> ValueQuery<V> {
    /// Compile the accumulated plan without executing it
    pub fn compile(&self) -> Result<CompiledStatement, CompileError> {
        self.core.compile()
    }

    /// Execute and return the projected values
    pub async fn to_list(&self) -> Result<Vec<V>, GraphError> {
        let statement = self.core.compile()?;
        let mut stream = self.core.run(&statement).await?;
        Materializer::new(&statement)
            .scalar_list(stream.as_mut())
            .await
    }

    /// First projected value, or `None`
    pub async fn first_or_default(&self) -> Result<Option<V>, GraphError> {
        let statement = self.core.compile_with(vec![QueryOp::Terminal {
            kind: TerminalKind::FirstOrDefault,
            predicate: None,
        }])?;
        let mut stream = self.core.run(&statement).await?;
        Materializer::new(&statement).scalar(stream.as_mut()).await
    }
}

/// A grouped query awaiting its projection
pub struct GroupedQuery<T: NodeEntity> {
    core: QueryCore,
    key: Expr,
    _entity: PhantomData<fn() -> T>,
}

impl<T: NodeEntity> GroupedQuery<T> {
    /// Project each group into a record; fields address the group through
    /// [`group_key`](crate::query::expr::group_key) and
    /// [`agg`](crate::query::expr::agg) expressions
    pub fn select<P: FromRecord>(mut self, fields: Vec<(&str, Expr)>) -> RecordQuery<P> {
        self.core.push(QueryOp::GroupBy(self.key));
        self.core.push(QueryOp::Project(
            fields
                .into_iter()
                .map(|(name, expr)| (name.to_string(), expr))
                .collect(),
        ));
        RecordQuery {
            core: self.core,
            _record: PhantomData,
        }
    }
}

/// A query producing named-field records
pub struct RecordQuery<P: FromRecord> {
    core: QueryCore,
    _record: PhantomData<fn() -> P>,
}

impl<P: FromRecord> RecordQuery<P> {
    /// Compile the accumulated plan without executing it
    pub fn compile(&self) -> Result<CompiledStatement, CompileError> {
        self.core.compile()
    }

    /// Execute and return the records
    pub async fn to_list(&self) -> Result<Vec<P>, GraphError> {
        let statement = self.core.compile()?;
        let mut stream = self.core.run(&statement).await?;
        let records = Materializer::new(&statement)
            .records(stream.as_mut())
            .await?;
        records
            .iter()
            .map(|record| P::from_record(record).map_err(GraphError::from))
            .collect()
    }

    /// Blocking form of [`to_list`](Self::to_list)
    pub fn to_list_blocking(&self) -> Result<Vec<P>, GraphError> {
        block_on(self.to_list())
    }
}

/// A relationship hop under construction
pub struct TraversalQuery<S: NodeEntity, R: RelationshipEntity, U: NodeEntity> {
    core: QueryCore,
    step: TraversalStep,
    _marker: PhantomData<fn() -> (S, R, U)>,
}

impl<S: NodeEntity, R: RelationshipEntity, U: NodeEntity> TraversalQuery<S, R, U> {
    fn new(mut core: QueryCore, direction: Direction) -> Self {
        core.shapes.register::<R>();
        core.shapes.register::<U>();
        let rel = R::shape();
        let target = U::shape();
        let step = TraversalStep::new(
            rel.label,
            rel.type_name,
            target.label,
            target.type_name,
            direction,
        );
        Self {
            core,
            step,
            _marker: PhantomData,
        }
    }

    /// Set the hop depth; exactly one by default
    pub fn with_depth(mut self, depth: DepthRange) -> Self {
        self.step.depth = depth;
        self
    }

    /// Filter against the traversed relationship
    pub fn where_relationship(mut self, predicate: Expr) -> Self {
        self.step.rel_filter = Some(predicate);
        self
    }

    /// Filter against the far endpoint
    pub fn where_target(mut self, predicate: Expr) -> Self {
        self.step.target_filter = Some(predicate);
        self
    }

    /// Continue the query over the far-endpoint nodes
    pub fn nodes(mut self) -> NodeQuery<U> {
        self.core.push(QueryOp::Traverse(self.step));
        NodeQuery::from_core(self.core)
    }

    /// Return source/relationship/target tuples instead of a node stream
    pub fn paths(mut self) -> PathQuery<S, R, U> {
        let depth = self.step.depth;
        self.core.push(QueryOp::TraversePath(self.step));
        PathQuery {
            core: self.core,
            depth,
            _marker: PhantomData,
        }
    }

    /// Return the shortest paths between the current pattern and the far
    /// endpoint
    pub fn shortest_paths(mut self) -> WholePathQuery {
        self.core.push(QueryOp::ShortestPath(self.step));
        WholePathQuery { core: self.core }
    }
}

/// A path-shaped query over one traversal hop
pub struct PathQuery<S: NodeEntity, R: RelationshipEntity, U: NodeEntity> {
    core: QueryCore,
    depth: DepthRange,
    _marker: PhantomData<fn() -> (S, R, U)>,
}

impl<S: NodeEntity, R: RelationshipEntity, U: NodeEntity> PathQuery<S, R, U> {
    /// Compile the accumulated plan without executing it
    pub fn compile(&self) -> Result<CompiledStatement, CompileError> {
        self.core.compile()
    }

    /// Execute and return typed source/relationship/target tuples
    ///
    /// Variable-depth hops cannot be squeezed into a single-hop tuple;
    /// use [`to_paths`](Self::to_paths) for them.
    pub async fn to_list(&self) -> Result<Vec<PathSegment<S, R, U>>, GraphError> {
        if !self.depth.is_single_hop() {
            return Err(CompileError::UnsupportedOperatorCombination(
                "typed path tuples require a single-hop traversal".to_string(),
            )
            .into());
        }
        let statement = self.core.compile()?;
        let mut stream = self.core.run(&statement).await?;
        Materializer::new(&statement)
            .path_segments(stream.as_mut())
            .await
    }

    /// Blocking form of [`to_list`](Self::to_list)
    pub fn to_list_blocking(&self) -> Result<Vec<PathSegment<S, R, U>>, GraphError> {
        block_on(self.to_list())
    }

    /// Execute and return raw whole paths, keeping every relationship of
    /// a variable-depth hop
    pub async fn to_paths(&self) -> Result<Vec<TraversalPath>, GraphError> {
        let statement = self.core.compile()?;
        let mut stream = self.core.run(&statement).await?;
        Materializer::new(&statement)
            .traversal_paths(stream.as_mut())
            .await
    }
}

/// A query producing raw whole paths
pub struct WholePathQuery {
    core: QueryCore,
}

impl WholePathQuery {
    /// Compile the accumulated plan without executing it
    pub fn compile(&self) -> Result<CompiledStatement, CompileError> {
        self.core.compile()
    }

    /// Execute and return the discovered paths
    pub async fn to_list(&self) -> Result<Vec<TraversalPath>, GraphError> {
        let statement = self.core.compile()?;
        let mut stream = self.core.run(&statement).await?;
        Materializer::new(&statement)
            .traversal_paths(stream.as_mut())
            .await
    }
}

fn empty(what: &str) -> GraphError {
    MaterializeError::EmptyResult(format!("{} over an empty result", what)).into()
}
