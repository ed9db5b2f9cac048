// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Entity shape descriptors and the entity traits
//!
//! A shape is declared once per entity type as a `static` and reused for
//! every compile and every materialized row. There is no runtime member
//! lookup: each entity implements `from_bag`/`to_bag` against its own
//! fields, and the shape carries the metadata the compiler needs (storage
//! label, field classification, storage property keys).

use crate::model::PropertyBag;
use crate::schema::convert::ConversionError;
use serde::{Deserialize, Serialize};

/// Whether an entity occupies a node or a relationship pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntityKind {
    Node,
    Relationship,
}

/// Native-storage classification of a declared field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldKind {
    /// Stored directly: string, integer, float, boolean
    Primitive,
    /// Stored as a driver temporal value, decoded preserving the UTC instant
    Temporal,
    /// Stored as its string representation
    Enum,
    /// Homogeneous list of primitives
    PrimitiveList,
    /// Nested record stored as a JSON string property
    Embedded,
}

/// One declared field of an entity shape
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDef {
    /// Field name as written in queries
    pub name: &'static str,
    /// Storage property key, when it differs from the field name
    pub storage_name: Option<&'static str>,
    pub kind: FieldKind,
}

impl FieldDef {
    /// Declare a field stored under its own name
    pub const fn new(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            storage_name: None,
            kind,
        }
    }

    /// Declare a field with a custom storage property key
    pub const fn with_storage_name(
        name: &'static str,
        storage_name: &'static str,
        kind: FieldKind,
    ) -> Self {
        Self {
            name,
            storage_name: Some(storage_name),
            kind,
        }
    }

    /// The property key this field is stored under
    pub fn property_key(&self) -> &'static str {
        self.storage_name.unwrap_or(self.name)
    }
}

/// Shape descriptor for one entity type
///
/// Declared as a `static` per entity type and returned by
/// [`GraphEntity::shape`], so the descriptor is built once and shared.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntityShape {
    /// Entity type name, for diagnostics
    pub type_name: &'static str,
    /// Node label or relationship type in the stored graph
    pub label: &'static str,
    pub kind: EntityKind,
    pub fields: &'static [FieldDef],
}

impl EntityShape {
    /// Look up a declared field by its query-facing name
    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Resolve a field name to its storage property key
    ///
    /// Undeclared names pass through unchanged so queries can reach
    /// properties outside the declared shape.
    pub fn property_key<'a>(&self, name: &'a str) -> &'a str {
        self.field(name)
            .map(|f| f.property_key())
            .unwrap_or(name)
    }
}

/// Core contract for any entity that maps onto a graph element
///
/// Implementations convert between the typed value and its stored
/// property bag. The `id` property is part of the bag and identifies the
/// element across round trips.
pub trait GraphEntity: Sized + Send + Sync + 'static {
    /// The static shape descriptor for this type
    fn shape() -> &'static EntityShape;

    /// Rebuild a typed value from a stored property bag
    fn from_bag(bag: &PropertyBag) -> Result<Self, ConversionError>;

    /// Render this value as a stored property bag
    fn to_bag(&self) -> PropertyBag;

    /// Element identifier
    fn element_id(&self) -> &str;
}

/// Marker for entities stored as nodes
pub trait NodeEntity: GraphEntity {}

/// Entities stored as relationships carry endpoint identifiers
///
/// Endpoints are not part of the property bag; the materializer populates
/// them from sibling columns arranged by the compiler.
pub trait RelationshipEntity: GraphEntity {
    fn start_id(&self) -> &str;

    fn end_id(&self) -> &str;

    fn set_endpoints(&mut self, start_id: String, end_id: String);
}
