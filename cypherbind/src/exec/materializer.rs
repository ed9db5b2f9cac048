// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Result materializer: streamed rows to typed values
//!
//! A state machine over the compiled statement's result-shape descriptor.
//! Columns are identified by the compiler-recorded role map; runtime type
//! inspection of column values is only the documented best-effort
//! fallback for path tuples. Rows are converted incrementally as they
//! stream in, never buffered first, except where a terminal's semantics
//! require a second row (multiplicity detection).

use crate::compile::{ColumnRole, CompiledStatement};
use crate::error::GraphError;
use crate::exec::driver::RowStream;
use crate::exec::error::MaterializeError;
use crate::model::{CypherValue, NodeValue, PropertyBag, RelationshipValue, Row, TraversalPath};
use crate::model::PathSegment;
use crate::schema::{FromCypherValue, NodeEntity, RelationshipEntity};
use log::warn;

/// Converts one statement's row stream into typed results
pub struct Materializer<'a> {
    statement: &'a CompiledStatement,
}

impl<'a> Materializer<'a> {
    /// Create a materializer for a compiled statement
    pub fn new(statement: &'a CompiledStatement) -> Self {
        Self { statement }
    }

    fn column<'r>(&self, row: &'r Row, role: &ColumnRole) -> Option<&'r CypherValue> {
        self.statement
            .column_for(role)
            .and_then(|name| row.get(name))
    }

    /// The designated entity column: the recorded role, falling back to
    /// the first column
    fn entity_value<'r>(&self, row: &'r Row) -> Result<&'r CypherValue, MaterializeError> {
        self.column(row, &ColumnRole::Entity)
            .or_else(|| row.get_index(0))
            .ok_or_else(|| MaterializeError::MissingColumn("entity".to_string()))
    }

    fn endpoint_ids(
        &self,
        row: &Row,
        relationship: &RelationshipValue,
    ) -> Result<(String, String), MaterializeError> {
        let start = match self.column(row, &ColumnRole::StartId) {
            Some(value) => String::from_cypher(value)?,
            None => relationship.start_id.clone(),
        };
        let end = match self.column(row, &ColumnRole::EndId) {
            Some(value) => String::from_cypher(value)?,
            None => relationship.end_id.clone(),
        };
        Ok((start, end))
    }

    /// Materialize a stream of node entities
    pub async fn node_list<T: NodeEntity>(
        &self,
        stream: &mut dyn RowStream,
    ) -> Result<Vec<T>, GraphError> {
        let mut entities = Vec::new();
        while let Some(row) = stream.next_row().await? {
            entities.push(self.node_from_row(&row)?);
        }
        Ok(entities)
    }

    /// Materialize a single node entity, enforcing terminal multiplicity
    pub async fn single_node<T: NodeEntity>(
        &self,
        stream: &mut dyn RowStream,
    ) -> Result<Option<T>, GraphError> {
        let first = match stream.next_row().await? {
            Some(row) => self.node_from_row(&row)?,
            None => return Ok(None),
        };
        self.check_multiplicity(stream).await?;
        Ok(Some(first))
    }

    /// Materialize a stream of relationship entities
    pub async fn relationship_list<T: RelationshipEntity>(
        &self,
        stream: &mut dyn RowStream,
    ) -> Result<Vec<T>, GraphError> {
        let mut entities = Vec::new();
        while let Some(row) = stream.next_row().await? {
            entities.push(self.relationship_from_row(&row)?);
        }
        Ok(entities)
    }

    /// Materialize a single relationship entity, enforcing terminal
    /// multiplicity
    pub async fn single_relationship<T: RelationshipEntity>(
        &self,
        stream: &mut dyn RowStream,
    ) -> Result<Option<T>, GraphError> {
        let first = match stream.next_row().await? {
            Some(row) => self.relationship_from_row(&row)?,
            None => return Ok(None),
        };
        self.check_multiplicity(stream).await?;
        Ok(Some(first))
    }

    /// Materialize a single scalar value, `None` when no row was returned
    pub async fn scalar<V: FromCypherValue>(
        &self,
        stream: &mut dyn RowStream,
    ) -> Result<Option<V>, GraphError> {
        let row = match stream.next_row().await? {
            Some(row) => row,
            None => return Ok(None),
        };
        let value = self
            .column(&row, &ColumnRole::Scalar)
            .or_else(|| row.get_index(0))
            .ok_or_else(|| MaterializeError::MissingColumn("scalar".to_string()))?;
        let converted = V::from_cypher(value).map_err(MaterializeError::from)?;
        self.check_multiplicity(stream).await?;
        Ok(Some(converted))
    }

    /// Materialize a stream of scalar values
    pub async fn scalar_list<V: FromCypherValue>(
        &self,
        stream: &mut dyn RowStream,
    ) -> Result<Vec<V>, GraphError> {
        let mut values = Vec::new();
        while let Some(row) = stream.next_row().await? {
            let value = self
                .column(&row, &ColumnRole::Scalar)
                .or_else(|| row.get_index(0))
                .ok_or_else(|| MaterializeError::MissingColumn("scalar".to_string()))?;
            values.push(V::from_cypher(value).map_err(MaterializeError::from)?);
        }
        Ok(values)
    }

    /// Materialize a boolean reduction; a missing row is an error, never
    /// an absent value
    pub async fn boolean(&self, stream: &mut dyn RowStream) -> Result<bool, GraphError> {
        let row = stream.next_row().await?.ok_or_else(|| {
            MaterializeError::EmptyResult("boolean reduction returned no rows".to_string())
        })?;
        let value = self
            .column(&row, &ColumnRole::Scalar)
            .or_else(|| row.get_index(0))
            .ok_or_else(|| MaterializeError::MissingColumn("boolean".to_string()))?;
        value
            .as_boolean()
            .ok_or_else(|| {
                MaterializeError::UnexpectedColumnType {
                    column: "boolean".to_string(),
                    expected: "Boolean",
                    actual: value.type_name(),
                }
                .into()
            })
    }

    /// Materialize projected or grouped rows as records
    pub async fn records(
        &self,
        stream: &mut dyn RowStream,
    ) -> Result<Vec<PropertyBag>, GraphError> {
        let mut records = Vec::new();
        while let Some(row) = stream.next_row().await? {
            records.push(PropertyBag::from_iter(row.into_columns()));
        }
        Ok(records)
    }

    /// Materialize single-hop path tuples with typed source,
    /// relationship, and target
    ///
    /// Rows whose columns cannot be identified are dropped with a
    /// diagnostic; the count mismatch is observable to the caller.
    pub async fn path_segments<S, R, T>(
        &self,
        stream: &mut dyn RowStream,
    ) -> Result<Vec<PathSegment<S, R, T>>, GraphError>
    where
        S: NodeEntity,
        R: RelationshipEntity,
        T: NodeEntity,
    {
        let mut segments = Vec::new();
        while let Some(row) = stream.next_row().await? {
            let (source, relationship, target) = match self.identify_path_columns(&row) {
                Some(columns) => columns,
                None => {
                    warn!("dropping path row: could not identify source/relationship/target columns");
                    continue;
                }
            };
            let source = S::from_bag(&source.properties).map_err(MaterializeError::from)?;
            let target = T::from_bag(&target.properties).map_err(MaterializeError::from)?;
            let mut rel = R::from_bag(&relationship.properties).map_err(MaterializeError::from)?;
            let (start, end) = self.endpoint_ids(&row, relationship)?;
            rel.set_endpoints(start, end);
            segments.push(PathSegment::new(source, rel, target));
        }
        Ok(segments)
    }

    /// Materialize whole-path rows into raw traversal paths
    ///
    /// Expects the node and relationship sequence columns of a bound path
    /// variable; single-hop tuple rows (source, relationship, target) are
    /// accepted as a one-hop path.
    pub async fn traversal_paths(
        &self,
        stream: &mut dyn RowStream,
    ) -> Result<Vec<TraversalPath>, GraphError> {
        let mut paths = Vec::new();
        while let Some(row) = stream.next_row().await? {
            match self.path_from_row(&row) {
                Some(path) => paths.push(path),
                None => {
                    warn!("dropping path row: could not identify path columns");
                }
            }
        }
        Ok(paths)
    }

    fn path_from_row(&self, row: &Row) -> Option<TraversalPath> {
        let nodes_value = self
            .column(row, &ColumnRole::PathNodes)
            .or_else(|| row.get_index(0));
        let rels_value = self
            .column(row, &ColumnRole::PathRelationships)
            .or_else(|| row.get_index(1));
        if let (Some(nodes_value), Some(rels_value)) = (nodes_value, rels_value) {
            if let (Some(nodes), Some(relationships)) =
                (collect_nodes(nodes_value), collect_relationships(rels_value))
            {
                match TraversalPath::new(nodes, relationships) {
                    Ok(path) => return Some(path),
                    Err(reason) => {
                        warn!("dropping path row: {}", reason);
                        return None;
                    }
                }
            }
        }
        // Single-hop tuple row: a one-hop path
        let (source, relationship, target) = self.identify_path_columns(row)?;
        TraversalPath::new(
            vec![source.clone(), target.clone()],
            vec![relationship.clone()],
        )
        .ok()
    }

    /// Identify the three path-tuple columns
    ///
    /// Compiler-recorded roles first; when absent, runtime inspection in
    /// encounter order: the first node seen is the source, the first
    /// relationship the relationship, the second node the target. A
    /// relationship-list column is accepted only when it holds exactly
    /// one relationship; multi-relationship lists are rejected here (the
    /// single-hop tuple cannot represent them).
    fn identify_path_columns<'r>(
        &self,
        row: &'r Row,
    ) -> Option<(&'r NodeValue, &'r RelationshipValue, &'r NodeValue)> {
        let by_role = (
            self.column(row, &ColumnRole::SourceNode).and_then(CypherValue::as_node),
            self.column(row, &ColumnRole::Relationship).and_then(single_relationship_value),
            self.column(row, &ColumnRole::TargetNode).and_then(CypherValue::as_node),
        );
        if let (Some(source), Some(rel), Some(target)) = by_role {
            return Some((source, rel, target));
        }

        let mut source = None;
        let mut relationship = None;
        let mut target = None;
        for (_, value) in row.iter() {
            if let Some(node) = value.as_node() {
                if source.is_none() {
                    source = Some(node);
                } else if target.is_none() {
                    target = Some(node);
                }
            } else if relationship.is_none() {
                if let Some(rel) = single_relationship_value(value) {
                    relationship = Some(rel);
                }
            }
        }
        match (source, relationship, target) {
            (Some(s), Some(r), Some(t)) => Some((s, r, t)),
            _ => None,
        }
    }

    fn node_from_row<T: NodeEntity>(&self, row: &Row) -> Result<T, MaterializeError> {
        let value = self.entity_value(row)?;
        let node = value
            .as_node()
            .ok_or_else(|| MaterializeError::UnexpectedColumnType {
                column: "entity".to_string(),
                expected: "Node",
                actual: value.type_name(),
            })?;
        Ok(T::from_bag(&node.properties)?)
    }

    fn relationship_from_row<T: RelationshipEntity>(
        &self,
        row: &Row,
    ) -> Result<T, MaterializeError> {
        let value = self.entity_value(row)?;
        let relationship =
            value
                .as_relationship()
                .ok_or_else(|| MaterializeError::UnexpectedColumnType {
                    column: "entity".to_string(),
                    expected: "Relationship",
                    actual: value.type_name(),
                })?;
        let mut entity = T::from_bag(&relationship.properties)?;
        let (start, end) = self.endpoint_ids(row, relationship)?;
        entity.set_endpoints(start, end);
        Ok(entity)
    }

    /// Fail when a single-result terminal sees a second row
    async fn check_multiplicity(&self, stream: &mut dyn RowStream) -> Result<(), GraphError> {
        let checks = self
            .statement
            .terminal
            .map(|t| t.checks_multiplicity())
            .unwrap_or(false);
        if checks && stream.next_row().await?.is_some() {
            return Err(MaterializeError::MultiplicityViolation.into());
        }
        Ok(())
    }
}

/// A relationship column value: a bare relationship, or a list holding
/// exactly one
fn single_relationship_value(value: &CypherValue) -> Option<&RelationshipValue> {
    match value {
        CypherValue::Relationship(rel) => Some(rel),
        CypherValue::List(items) if items.len() == 1 => items[0].as_relationship(),
        _ => None,
    }
}

fn collect_nodes(value: &CypherValue) -> Option<Vec<NodeValue>> {
    let items = value.as_list()?;
    items
        .iter()
        .map(|item| item.as_node().cloned())
        .collect()
}

fn collect_relationships(value: &CypherValue) -> Option<Vec<RelationshipValue>> {
    let items = value.as_list()?;
    items
        .iter()
        .map(|item| item.as_relationship().cloned())
        .collect()
}
