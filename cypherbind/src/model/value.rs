// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Value type system for driver-exchanged data
//!
//! Supports the value space a Cypher-family driver can return:
//! - Basic types: String, Integer, Float, Boolean, Null
//! - Temporal types: DateTime (UTC, fixed-offset, named-zone), Date, LocalTime
//! - Collections: List, Map
//! - Graph types: Node, Relationship

use crate::model::element::{NodeValue, RelationshipValue};
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Value types for parameters, properties, and result columns
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CypherValue {
    Null,
    Boolean(bool),
    Integer(i64),
    Float(f64),
    String(String),
    /// UTC instant, the canonical temporal representation
    DateTime(DateTime<Utc>),
    /// Instant carrying a fixed UTC offset as returned by the driver
    DateTimeOffset(DateTime<FixedOffset>),
    /// Instant carrying an IANA zone name alongside the UTC instant
    DateTimeZoned(String, DateTime<Utc>),
    Date(NaiveDate),
    LocalTime(NaiveTime),
    List(Vec<CypherValue>),
    Map(HashMap<String, CypherValue>),
    Node(NodeValue),
    Relationship(RelationshipValue),
}

impl CypherValue {
    /// Extract as boolean if possible
    pub fn as_boolean(&self) -> Option<bool> {
        match self {
            CypherValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Extract as integer if possible
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            CypherValue::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Extract as float if possible (integers widen)
    pub fn as_float(&self) -> Option<f64> {
        match self {
            CypherValue::Float(f) => Some(*f),
            CypherValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// Extract as string if possible
    pub fn as_string(&self) -> Option<&str> {
        match self {
            CypherValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Get any datetime as UTC, converting if necessary
    ///
    /// Fixed-offset and named-zone values are collapsed to their UTC
    /// instant; the instant itself is never shifted.
    pub fn as_datetime_utc(&self) -> Option<DateTime<Utc>> {
        match self {
            CypherValue::DateTime(dt) => Some(*dt),
            CypherValue::DateTimeOffset(dt) => Some(dt.with_timezone(&Utc)),
            CypherValue::DateTimeZoned(_, dt) => Some(*dt),
            _ => None,
        }
    }

    /// Get timezone information if available
    pub fn timezone_info(&self) -> Option<String> {
        match self {
            CypherValue::DateTime(_) => Some("UTC".to_string()),
            CypherValue::DateTimeOffset(dt) => Some(dt.timezone().to_string()),
            CypherValue::DateTimeZoned(zone, _) => Some(zone.clone()),
            _ => None,
        }
    }

    /// Extract as date if possible
    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            CypherValue::Date(d) => Some(*d),
            _ => None,
        }
    }

    /// Extract as local time if possible
    pub fn as_local_time(&self) -> Option<NaiveTime> {
        match self {
            CypherValue::LocalTime(t) => Some(*t),
            _ => None,
        }
    }

    /// Extract as list if possible
    pub fn as_list(&self) -> Option<&Vec<CypherValue>> {
        match self {
            CypherValue::List(items) => Some(items),
            _ => None,
        }
    }

    /// Extract as map if possible
    pub fn as_map(&self) -> Option<&HashMap<String, CypherValue>> {
        match self {
            CypherValue::Map(entries) => Some(entries),
            _ => None,
        }
    }

    /// Extract as node if possible
    pub fn as_node(&self) -> Option<&NodeValue> {
        match self {
            CypherValue::Node(n) => Some(n),
            _ => None,
        }
    }

    /// Extract as relationship if possible
    pub fn as_relationship(&self) -> Option<&RelationshipValue> {
        match self {
            CypherValue::Relationship(r) => Some(r),
            _ => None,
        }
    }

    /// Check if value is null
    pub fn is_null(&self) -> bool {
        matches!(self, CypherValue::Null)
    }

    /// Check if value is a graph element (node or relationship)
    pub fn is_element(&self) -> bool {
        matches!(self, CypherValue::Node(_) | CypherValue::Relationship(_))
    }

    /// Check if value is a list where every item is a relationship
    pub fn is_relationship_list(&self) -> bool {
        match self {
            CypherValue::List(items) => {
                !items.is_empty()
                    && items
                        .iter()
                        .all(|v| matches!(v, CypherValue::Relationship(_)))
            }
            _ => false,
        }
    }

    /// Get the type name of this value
    pub fn type_name(&self) -> &'static str {
        match self {
            CypherValue::Null => "Null",
            CypherValue::Boolean(_) => "Boolean",
            CypherValue::Integer(_) => "Integer",
            CypherValue::Float(_) => "Float",
            CypherValue::String(_) => "String",
            CypherValue::DateTime(_) => "DateTime",
            CypherValue::DateTimeOffset(_) => "DateTimeOffset",
            CypherValue::DateTimeZoned(_, _) => "DateTimeZoned",
            CypherValue::Date(_) => "Date",
            CypherValue::LocalTime(_) => "LocalTime",
            CypherValue::List(_) => "List",
            CypherValue::Map(_) => "Map",
            CypherValue::Node(_) => "Node",
            CypherValue::Relationship(_) => "Relationship",
        }
    }
}

impl fmt::Display for CypherValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CypherValue::Null => write!(f, "null"),
            CypherValue::Boolean(b) => write!(f, "{}", b),
            CypherValue::Integer(i) => write!(f, "{}", i),
            CypherValue::Float(x) => write!(f, "{}", x),
            CypherValue::String(s) => write!(f, "{}", s),
            CypherValue::DateTime(dt) => write!(f, "{}", dt.to_rfc3339()),
            CypherValue::DateTimeOffset(dt) => write!(f, "{}", dt.to_rfc3339()),
            CypherValue::DateTimeZoned(zone, dt) => write!(f, "{}[{}]", dt.to_rfc3339(), zone),
            CypherValue::Date(d) => write!(f, "{}", d),
            CypherValue::LocalTime(t) => write!(f, "{}", t),
            CypherValue::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
            CypherValue::Map(_) => write!(f, "<map>"),
            CypherValue::Node(n) => write!(f, "<node {}>", n.id),
            CypherValue::Relationship(r) => write!(f, "<relationship {}>", r.id),
        }
    }
}

impl From<bool> for CypherValue {
    fn from(v: bool) -> Self {
        CypherValue::Boolean(v)
    }
}

impl From<i32> for CypherValue {
    fn from(v: i32) -> Self {
        CypherValue::Integer(v as i64)
    }
}

impl From<i64> for CypherValue {
    fn from(v: i64) -> Self {
        CypherValue::Integer(v)
    }
}

impl From<f64> for CypherValue {
    fn from(v: f64) -> Self {
        CypherValue::Float(v)
    }
}

impl From<&str> for CypherValue {
    fn from(v: &str) -> Self {
        CypherValue::String(v.to_string())
    }
}

impl From<String> for CypherValue {
    fn from(v: String) -> Self {
        CypherValue::String(v)
    }
}

impl From<DateTime<Utc>> for CypherValue {
    fn from(v: DateTime<Utc>) -> Self {
        CypherValue::DateTime(v)
    }
}

impl From<NaiveDate> for CypherValue {
    fn from(v: NaiveDate) -> Self {
        CypherValue::Date(v)
    }
}

impl<T: Into<CypherValue>> From<Vec<T>> for CypherValue {
    fn from(items: Vec<T>) -> Self {
        CypherValue::List(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<CypherValue>> From<Option<T>> for CypherValue {
    fn from(v: Option<T>) -> Self {
        match v {
            Some(inner) => inner.into(),
            None => CypherValue::Null,
        }
    }
}
