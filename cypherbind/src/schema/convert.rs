// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Value conversion between driver-native and target-native representations
//!
//! Implements the coercion rules the materializer relies on:
//! - integer representations widen to the target field width, never
//!   silently truncate
//! - driver temporal wrappers decode to the target temporal type
//!   preserving the UTC instant
//! - collections convert element-wise
//! - embedded records round-trip through JSON string properties

use crate::model::{CypherValue, PropertyBag};
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

/// Conversion failures, wrapped with source and target type names
#[derive(Error, Debug)]
pub enum ConversionError {
    #[error("cannot convert {from} to {to}")]
    TypeMismatch { from: &'static str, to: &'static str },

    #[error("integer value {value} does not fit in {target}")]
    IntegerOverflow { value: i64, target: &'static str },

    #[error("missing required property: {0}")]
    MissingProperty(String),

    #[error("invalid embedded JSON in property {property}: {message}")]
    EmbeddedJson { property: String, message: String },

    #[error("invalid enum value {value} for {target}")]
    InvalidEnumValue { value: String, target: &'static str },

    #[error("unknown timezone name: {0}")]
    UnknownTimezone(String),
}

/// Conversion from a driver-native value to a target-native one
pub trait FromCypherValue: Sized {
    fn from_cypher(value: &CypherValue) -> Result<Self, ConversionError>;
}

impl FromCypherValue for bool {
    fn from_cypher(value: &CypherValue) -> Result<Self, ConversionError> {
        value.as_boolean().ok_or(ConversionError::TypeMismatch {
            from: value.type_name(),
            to: "bool",
        })
    }
}

impl FromCypherValue for i64 {
    fn from_cypher(value: &CypherValue) -> Result<Self, ConversionError> {
        value.as_integer().ok_or(ConversionError::TypeMismatch {
            from: value.type_name(),
            to: "i64",
        })
    }
}

impl FromCypherValue for i32 {
    fn from_cypher(value: &CypherValue) -> Result<Self, ConversionError> {
        let wide = i64::from_cypher(value)?;
        i32::try_from(wide).map_err(|_| ConversionError::IntegerOverflow {
            value: wide,
            target: "i32",
        })
    }
}

impl FromCypherValue for i16 {
    fn from_cypher(value: &CypherValue) -> Result<Self, ConversionError> {
        let wide = i64::from_cypher(value)?;
        i16::try_from(wide).map_err(|_| ConversionError::IntegerOverflow {
            value: wide,
            target: "i16",
        })
    }
}

impl FromCypherValue for u32 {
    fn from_cypher(value: &CypherValue) -> Result<Self, ConversionError> {
        let wide = i64::from_cypher(value)?;
        u32::try_from(wide).map_err(|_| ConversionError::IntegerOverflow {
            value: wide,
            target: "u32",
        })
    }
}

impl FromCypherValue for u64 {
    fn from_cypher(value: &CypherValue) -> Result<Self, ConversionError> {
        let wide = i64::from_cypher(value)?;
        u64::try_from(wide).map_err(|_| ConversionError::IntegerOverflow {
            value: wide,
            target: "u64",
        })
    }
}

impl FromCypherValue for f64 {
    fn from_cypher(value: &CypherValue) -> Result<Self, ConversionError> {
        // Integers widen to float
        value.as_float().ok_or(ConversionError::TypeMismatch {
            from: value.type_name(),
            to: "f64",
        })
    }
}

impl FromCypherValue for String {
    fn from_cypher(value: &CypherValue) -> Result<Self, ConversionError> {
        value
            .as_string()
            .map(str::to_string)
            .ok_or(ConversionError::TypeMismatch {
                from: value.type_name(),
                to: "String",
            })
    }
}

impl FromCypherValue for DateTime<Utc> {
    fn from_cypher(value: &CypherValue) -> Result<Self, ConversionError> {
        value
            .as_datetime_utc()
            .ok_or(ConversionError::TypeMismatch {
                from: value.type_name(),
                to: "DateTime<Utc>",
            })
    }
}

impl FromCypherValue for DateTime<FixedOffset> {
    fn from_cypher(value: &CypherValue) -> Result<Self, ConversionError> {
        match value {
            CypherValue::DateTimeOffset(dt) => Ok(*dt),
            CypherValue::DateTime(dt) => Ok(dt.fixed_offset()),
            CypherValue::DateTimeZoned(_, dt) => Ok(dt.fixed_offset()),
            _ => Err(ConversionError::TypeMismatch {
                from: value.type_name(),
                to: "DateTime<FixedOffset>",
            }),
        }
    }
}

impl FromCypherValue for NaiveDate {
    fn from_cypher(value: &CypherValue) -> Result<Self, ConversionError> {
        value.as_date().ok_or(ConversionError::TypeMismatch {
            from: value.type_name(),
            to: "NaiveDate",
        })
    }
}

impl FromCypherValue for NaiveTime {
    fn from_cypher(value: &CypherValue) -> Result<Self, ConversionError> {
        value.as_local_time().ok_or(ConversionError::TypeMismatch {
            from: value.type_name(),
            to: "NaiveTime",
        })
    }
}

impl<T: FromCypherValue> FromCypherValue for Vec<T> {
    fn from_cypher(value: &CypherValue) -> Result<Self, ConversionError> {
        let items = value.as_list().ok_or(ConversionError::TypeMismatch {
            from: value.type_name(),
            to: "Vec",
        })?;
        items.iter().map(T::from_cypher).collect()
    }
}

impl<T: FromCypherValue> FromCypherValue for Option<T> {
    fn from_cypher(value: &CypherValue) -> Result<Self, ConversionError> {
        if value.is_null() {
            Ok(None)
        } else {
            T::from_cypher(value).map(Some)
        }
    }
}

/// Decode a named-zone temporal value into its IANA zone
///
/// The UTC instant is preserved; only the presentation zone changes.
/// Plain UTC values decode as `UTC`; fixed-offset values have no zone
/// name to resolve and are rejected.
pub fn zoned_datetime(value: &CypherValue) -> Result<DateTime<chrono_tz::Tz>, ConversionError> {
    match value {
        CypherValue::DateTimeZoned(zone, instant) => {
            let tz: chrono_tz::Tz = zone
                .parse()
                .map_err(|_| ConversionError::UnknownTimezone(zone.clone()))?;
            Ok(instant.with_timezone(&tz))
        }
        CypherValue::DateTime(instant) => Ok(instant.with_timezone(&chrono_tz::UTC)),
        _ => Err(ConversionError::TypeMismatch {
            from: value.type_name(),
            to: "DateTime<Tz>",
        }),
    }
}

/// Read a required property from a bag, applying coercion
pub fn require<T: FromCypherValue>(bag: &PropertyBag, key: &str) -> Result<T, ConversionError> {
    match bag.get(key) {
        Some(value) if !value.is_null() => T::from_cypher(value),
        _ => Err(ConversionError::MissingProperty(key.to_string())),
    }
}

/// Read an optional property from a bag, applying coercion
///
/// Absent and null properties both read as `None`.
pub fn optional<T: FromCypherValue>(
    bag: &PropertyBag,
    key: &str,
) -> Result<Option<T>, ConversionError> {
    match bag.get(key) {
        Some(value) if !value.is_null() => T::from_cypher(value).map(Some),
        _ => Ok(None),
    }
}

/// Read an enum-as-string property through its `FromStr` implementation
pub fn enum_field<T: std::str::FromStr>(
    bag: &PropertyBag,
    key: &str,
    target: &'static str,
) -> Result<T, ConversionError> {
    let raw: String = require(bag, key)?;
    raw.parse::<T>()
        .map_err(|_| ConversionError::InvalidEnumValue { value: raw, target })
}

/// Read an embedded record stored as a JSON string property
pub fn embedded<T: DeserializeOwned>(
    bag: &PropertyBag,
    key: &str,
) -> Result<Option<T>, ConversionError> {
    let raw = match bag.get(key) {
        Some(CypherValue::String(s)) => s,
        Some(CypherValue::Null) | None => return Ok(None),
        Some(other) => {
            return Err(ConversionError::TypeMismatch {
                from: other.type_name(),
                to: "embedded JSON string",
            })
        }
    };
    serde_json::from_str(raw)
        .map(Some)
        .map_err(|e| ConversionError::EmbeddedJson {
            property: key.to_string(),
            message: e.to_string(),
        })
}

/// Render an embedded record as its JSON string property value
pub fn embedded_value<T: Serialize>(value: &T) -> Result<CypherValue, ConversionError> {
    serde_json::to_string(value)
        .map(CypherValue::String)
        .map_err(|e| ConversionError::EmbeddedJson {
            property: String::new(),
            message: e.to_string(),
        })
}

/// Typed reconstruction of a projected or grouped record
///
/// Implementations rebuild a target record field-by-field from a
/// column-name-keyed bag, recursing into nested list-of-record fields via
/// [`record_list_field`].
pub trait FromRecord: Sized {
    fn from_record(record: &PropertyBag) -> Result<Self, ConversionError>;
}

/// Read a scalar field of a projected record
pub fn record_field<T: FromCypherValue>(
    record: &PropertyBag,
    key: &str,
) -> Result<T, ConversionError> {
    require(record, key)
}

/// Read a nested list-of-record field of a projected record
///
/// List items may be maps (projected sub-records) or nodes (collected
/// entities); both expose a property bag to recurse into.
pub fn record_list_field<T: FromRecord>(
    record: &PropertyBag,
    key: &str,
) -> Result<Vec<T>, ConversionError> {
    let value = record
        .get(key)
        .ok_or_else(|| ConversionError::MissingProperty(key.to_string()))?;
    let items = value.as_list().ok_or(ConversionError::TypeMismatch {
        from: value.type_name(),
        to: "list of records",
    })?;
    items
        .iter()
        .map(|item| match item {
            CypherValue::Map(entries) => {
                let bag = PropertyBag::from_entries(entries.clone());
                T::from_record(&bag)
            }
            CypherValue::Node(node) => T::from_record(&node.properties),
            other => Err(ConversionError::TypeMismatch {
                from: other.type_name(),
                to: "record",
            }),
        })
        .collect()
}
