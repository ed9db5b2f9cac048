// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Typed graph facade
//!
//! The entry point applications hold: fluent query roots over nodes and
//! relationships, plus CRUD for single entities. Every operation emits
//! parameterized Cypher through the same driver boundary the query
//! compiler uses; transactions are caller-supplied handles passed
//! through untouched.

use crate::compile::validate_identifier;
use crate::config::GraphConfig;
use crate::error::GraphError;
use crate::exec::error::MaterializeError;
use crate::exec::{GraphDriver, QueryExecutor, RowStream, TransactionHandle};
use crate::model::CypherValue;
use crate::query::builder::{NodeQuery, RelationshipQuery};
use crate::query::expr::{lit, prop};
use crate::schema::{NodeEntity, RelationshipEntity};
use std::sync::Arc;
use uuid::Uuid;

/// Relationship type naming convention for complex-property links
const PROPERTY_REL_PREFIX: &str = "__PROPERTY__";
const PROPERTY_REL_SUFFIX: &str = "__";

/// Relationship type under which a complex property's nodes are linked
pub fn property_relationship_type(property_name: &str) -> String {
    format!(
        "{}{}{}",
        PROPERTY_REL_PREFIX, property_name, PROPERTY_REL_SUFFIX
    )
}

/// Recover the property name from a complex-property relationship type
///
/// Returns `None` for relationship types outside the naming convention.
pub fn property_name_from_relationship_type(rel_type: &str) -> Option<&str> {
    rel_type
        .strip_prefix(PROPERTY_REL_PREFIX)
        .and_then(|rest| rest.strip_suffix(PROPERTY_REL_SUFFIX))
}

/// Fresh client-assigned element identifier
pub fn new_element_id() -> String {
    Uuid::new_v4().to_string()
}

/// Typed entry point over one graph database
pub struct Graph {
    executor: QueryExecutor,
    config: GraphConfig,
}

impl Graph {
    /// Open a graph over a driver with default configuration
    pub fn new(driver: Arc<dyn GraphDriver>) -> Self {
        Self::with_config(driver, GraphConfig::default())
    }

    /// Open a graph over a driver with explicit configuration
    pub fn with_config(driver: Arc<dyn GraphDriver>, config: GraphConfig) -> Self {
        let executor = QueryExecutor::new(driver).with_timeout(config.statement_timeout());
        Self { executor, config }
    }

    /// The active configuration
    pub fn config(&self) -> &GraphConfig {
        &self.config
    }

    /// The statement executor, for advanced callers
    pub fn executor(&self) -> &QueryExecutor {
        &self.executor
    }

    /// Queryable over all nodes of `T`
    pub fn nodes<T: NodeEntity>(&self) -> NodeQuery<T> {
        NodeQuery::new(self.executor.clone())
    }

    /// Queryable over all relationships of `R`
    pub fn relationships<R: RelationshipEntity>(&self) -> RelationshipQuery<R> {
        RelationshipQuery::new(self.executor.clone())
    }

    /// Create a node from an entity's property bag
    pub async fn create_node<T: NodeEntity>(
        &self,
        entity: &T,
        transaction: Option<&TransactionHandle>,
    ) -> Result<T, GraphError> {
        let shape = T::shape();
        validate_identifier(shape.label)?;
        let text = format!("CREATE (n:{} $p0) RETURN n", shape.label);
        let parameters = vec![(
            "p0".to_string(),
            CypherValue::Map(entity.to_bag().into_entries()),
        )];
        let mut stream = self.executor.run_raw(&text, &parameters, transaction).await?;
        first_node(stream.as_mut())
            .await?
            .ok_or_else(|| no_row("create_node"))
    }

    /// Retrieve a node by its identifier
    pub async fn get_node<T: NodeEntity>(
        &self,
        node_id: &str,
        transaction: Option<&TransactionHandle>,
    ) -> Result<Option<T>, GraphError> {
        let mut query = self.nodes::<T>().where_(prop("id").eq(lit(node_id)));
        if let Some(tx) = transaction {
            query = query.in_transaction(tx.clone());
        }
        query.single_or_default().await
    }

    /// Overwrite an existing node's properties from the entity's bag
    pub async fn update_node<T: NodeEntity>(
        &self,
        entity: &T,
        transaction: Option<&TransactionHandle>,
    ) -> Result<T, GraphError> {
        let shape = T::shape();
        validate_identifier(shape.label)?;
        let text = format!(
            "MATCH (n:{}) WHERE n.id = $p0 SET n = $p1 RETURN n",
            shape.label
        );
        let parameters = vec![
            ("p0".to_string(), CypherValue::from(entity.element_id())),
            (
                "p1".to_string(),
                CypherValue::Map(entity.to_bag().into_entries()),
            ),
        ];
        let mut stream = self.executor.run_raw(&text, &parameters, transaction).await?;
        first_node(stream.as_mut())
            .await?
            .ok_or_else(|| no_row("update_node"))
    }

    /// Delete a node and its attached relationships by identifier
    ///
    /// Returns whether a node was actually deleted.
    pub async fn delete_node<T: NodeEntity>(
        &self,
        node_id: &str,
        transaction: Option<&TransactionHandle>,
    ) -> Result<bool, GraphError> {
        let shape = T::shape();
        validate_identifier(shape.label)?;
        let text = format!(
            "MATCH (n:{}) WHERE n.id = $p0 DETACH DELETE n RETURN count(n) AS deleted",
            shape.label
        );
        let parameters = vec![("p0".to_string(), CypherValue::from(node_id))];
        let mut stream = self.executor.run_raw(&text, &parameters, transaction).await?;
        deleted_count(stream.as_mut()).await
    }

    /// Create a relationship between two existing nodes
    ///
    /// The entity's endpoint identifiers select the nodes to connect.
    pub async fn create_relationship<R: RelationshipEntity>(
        &self,
        entity: &R,
        transaction: Option<&TransactionHandle>,
    ) -> Result<R, GraphError> {
        let shape = R::shape();
        validate_identifier(shape.label)?;
        let text = format!(
            "MATCH (a), (b) WHERE a.id = $p0 AND b.id = $p1 CREATE (a)-[r:{} $p2]->(b) RETURN r",
            shape.label
        );
        let parameters = vec![
            ("p0".to_string(), CypherValue::from(entity.start_id())),
            ("p1".to_string(), CypherValue::from(entity.end_id())),
            (
                "p2".to_string(),
                CypherValue::Map(entity.to_bag().into_entries()),
            ),
        ];
        let mut stream = self.executor.run_raw(&text, &parameters, transaction).await?;
        first_relationship(stream.as_mut())
            .await?
            .ok_or_else(|| no_row("create_relationship"))
    }

    /// Retrieve a relationship by its identifier
    pub async fn get_relationship<R: RelationshipEntity>(
        &self,
        relationship_id: &str,
        transaction: Option<&TransactionHandle>,
    ) -> Result<Option<R>, GraphError> {
        let mut query = self
            .relationships::<R>()
            .where_(prop("id").eq(lit(relationship_id)));
        if let Some(tx) = transaction {
            query = query.in_transaction(tx.clone());
        }
        query.single_or_default().await
    }

    /// Overwrite an existing relationship's properties from the entity's
    /// bag
    pub async fn update_relationship<R: RelationshipEntity>(
        &self,
        entity: &R,
        transaction: Option<&TransactionHandle>,
    ) -> Result<R, GraphError> {
        let shape = R::shape();
        validate_identifier(shape.label)?;
        let text = format!(
            "MATCH ()-[r:{}]->() WHERE r.id = $p0 SET r = $p1 RETURN r",
            shape.label
        );
        let parameters = vec![
            ("p0".to_string(), CypherValue::from(entity.element_id())),
            (
                "p1".to_string(),
                CypherValue::Map(entity.to_bag().into_entries()),
            ),
        ];
        let mut stream = self.executor.run_raw(&text, &parameters, transaction).await?;
        first_relationship(stream.as_mut())
            .await?
            .ok_or_else(|| no_row("update_relationship"))
    }

    /// Delete a relationship by identifier
    ///
    /// Returns whether a relationship was actually deleted.
    pub async fn delete_relationship<R: RelationshipEntity>(
        &self,
        relationship_id: &str,
        transaction: Option<&TransactionHandle>,
    ) -> Result<bool, GraphError> {
        let shape = R::shape();
        validate_identifier(shape.label)?;
        let text = format!(
            "MATCH ()-[r:{}]->() WHERE r.id = $p0 DELETE r RETURN count(r) AS deleted",
            shape.label
        );
        let parameters = vec![("p0".to_string(), CypherValue::from(relationship_id))];
        let mut stream = self.executor.run_raw(&text, &parameters, transaction).await?;
        deleted_count(stream.as_mut()).await
    }

    /// Load the nodes linked to a complex property of one node
    ///
    /// Complex properties are stored as separate nodes connected by a
    /// relationship named by the `__PROPERTY__{name}__` convention.
    pub async fn related_nodes<U: NodeEntity>(
        &self,
        node_id: &str,
        property_name: &str,
        transaction: Option<&TransactionHandle>,
    ) -> Result<Vec<U>, GraphError> {
        let rel_type = property_relationship_type(property_name);
        validate_identifier(&rel_type)?;
        let shape = U::shape();
        validate_identifier(shape.label)?;
        let text = format!(
            "MATCH (a)-[:{}]->(b:{}) WHERE a.id = $p0 RETURN b",
            rel_type, shape.label
        );
        let parameters = vec![("p0".to_string(), CypherValue::from(node_id))];
        let mut stream = self.executor.run_raw(&text, &parameters, transaction).await?;
        let mut entities = Vec::new();
        while let Some(entity) = first_node::<U>(stream.as_mut()).await? {
            entities.push(entity);
        }
        Ok(entities)
    }
}

/// Read the next row's first column as a node entity
async fn first_node<T: NodeEntity>(
    stream: &mut dyn RowStream,
) -> Result<Option<T>, GraphError> {
    let Some(row) = stream.next_row().await? else {
        return Ok(None);
    };
    let value = row
        .get_index(0)
        .ok_or_else(|| MaterializeError::MissingColumn("entity".to_string()))?;
    let node = value
        .as_node()
        .ok_or_else(|| MaterializeError::UnexpectedColumnType {
            column: "entity".to_string(),
            expected: "Node",
            actual: value.type_name(),
        })?;
    Ok(Some(
        T::from_bag(&node.properties).map_err(MaterializeError::from)?,
    ))
}

/// Read the next row's first column as a relationship entity, populating
/// endpoints from the driver value
async fn first_relationship<R: RelationshipEntity>(
    stream: &mut dyn RowStream,
) -> Result<Option<R>, GraphError> {
    let Some(row) = stream.next_row().await? else {
        return Ok(None);
    };
    let value = row
        .get_index(0)
        .ok_or_else(|| MaterializeError::MissingColumn("entity".to_string()))?;
    let relationship =
        value
            .as_relationship()
            .ok_or_else(|| MaterializeError::UnexpectedColumnType {
                column: "entity".to_string(),
                expected: "Relationship",
                actual: value.type_name(),
            })?;
    let mut entity = R::from_bag(&relationship.properties).map_err(MaterializeError::from)?;
    entity.set_endpoints(
        relationship.start_id.clone(),
        relationship.end_id.clone(),
    );
    Ok(Some(entity))
}

async fn deleted_count(stream: &mut dyn RowStream) -> Result<bool, GraphError> {
    let Some(row) = stream.next_row().await? else {
        return Ok(false);
    };
    let deleted = row
        .get("deleted")
        .or_else(|| row.get_index(0))
        .and_then(CypherValue::as_integer)
        .unwrap_or(0);
    Ok(deleted > 0)
}

fn no_row(operation: &str) -> GraphError {
    MaterializeError::EmptyResult(format!("{} returned no row", operation)).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_property_relationship_type_round_trip() {
        let rel_type = property_relationship_type("addresses");
        assert_eq!(rel_type, "__PROPERTY__addresses__");
        assert_eq!(
            property_name_from_relationship_type(&rel_type),
            Some("addresses")
        );
        assert_eq!(property_name_from_relationship_type("KNOWS"), None);
    }

    #[test]
    fn test_new_element_ids_are_unique() {
        assert_ne!(new_element_id(), new_element_id());
    }
}
