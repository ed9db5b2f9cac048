// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Entity shape declarations and value conversion
//!
//! Shapes describe how a typed entity maps onto stored properties: field
//! names, storage classification, and the structural label. The compiler
//! resolves property names and root patterns through shapes; the
//! materializer rebuilds typed values through the converter.

pub mod convert;
pub mod registry;
pub mod shape;

pub use convert::{ConversionError, FromCypherValue, FromRecord};
pub use registry::{lookup_shape, register_shape};
pub use shape::{EntityKind, EntityShape, FieldDef, FieldKind};
pub use shape::{GraphEntity, NodeEntity, RelationshipEntity};
