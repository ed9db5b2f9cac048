// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Process-wide entity shape registry
//!
//! Shapes are keyed once per type and reused across every compile; the
//! registry lets plans reference entity types that were registered
//! anywhere in the process, not just through the builder that compiles
//! them.

use crate::schema::shape::{EntityShape, GraphEntity};
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use std::collections::HashMap;

static GLOBAL_SHAPES: Lazy<RwLock<HashMap<&'static str, &'static EntityShape>>> =
    Lazy::new(|| RwLock::new(HashMap::new()));

/// Register an entity type's shape process-wide
///
/// Registration is idempotent; later registrations of the same type name
/// overwrite earlier ones.
pub fn register_shape<T: GraphEntity>() {
    let shape = T::shape();
    GLOBAL_SHAPES.write().insert(shape.type_name, shape);
}

/// Look up a registered shape by entity type name
pub fn lookup_shape(type_name: &str) -> Option<&'static EntityShape> {
    GLOBAL_SHAPES.read().get(type_name).copied()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::PropertyBag;
    use crate::schema::convert::ConversionError;
    use crate::schema::shape::{EntityKind, FieldDef, FieldKind, NodeEntity};

    struct Marker;

    static MARKER_FIELDS: &[FieldDef] = &[FieldDef::new("id", FieldKind::Primitive)];

    static MARKER_SHAPE: EntityShape = EntityShape {
        type_name: "RegistryMarker",
        label: "RegistryMarker",
        kind: EntityKind::Node,
        fields: MARKER_FIELDS,
    };

    impl GraphEntity for Marker {
        fn shape() -> &'static EntityShape {
            &MARKER_SHAPE
        }

        fn from_bag(_bag: &PropertyBag) -> Result<Self, ConversionError> {
            Ok(Marker)
        }

        fn to_bag(&self) -> PropertyBag {
            PropertyBag::new()
        }

        fn element_id(&self) -> &str {
            ""
        }
    }

    impl NodeEntity for Marker {}

    #[test]
    fn test_register_and_lookup() {
        assert!(lookup_shape("RegistryMarker").is_none());
        register_shape::<Marker>();
        let shape = lookup_shape("RegistryMarker").unwrap();
        assert_eq!(shape.label, "RegistryMarker");
        register_shape::<Marker>();
    }
}
