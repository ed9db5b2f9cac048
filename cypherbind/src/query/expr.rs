// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Sub-expression tree for predicates, keys, and projections
//!
//! One scalar or boolean expression is a tagged union over property
//! access, captured literals, operators, method calls, conditionals, and
//! comprehensions. The tree is built by the fluent helpers here and
//! consumed by the expression translator; nothing in this module renders
//! Cypher text.

use crate::model::CypherValue;
use serde::{Deserialize, Serialize};

/// Root a property access resolves against
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PropertyRoot {
    /// The alias currently bound by the operator compiler
    Current,
    /// An explicitly named pattern alias introduced by a traversal step
    Alias(String),
    /// A comprehension item binding
    Binding(String),
}

/// Binary operators with 1:1 Cypher renderings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    And,
    Or,
}

/// Unary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnaryOp {
    Not,
    Neg,
}

/// Traversal direction for relationship navigations and traversal steps
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Outgoing,
    Incoming,
    Both,
}

/// Aggregate kinds usable standalone or against a grouped collection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AggregateKind {
    Count,
    Sum,
    Avg,
    Min,
    Max,
}

/// One scalar/boolean sub-expression
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expr {
    /// Property access, optionally nested (`alias.a.b`)
    Property { root: PropertyRoot, path: Vec<String> },
    /// A captured value; always externalized as a parameter
    Literal(CypherValue),
    /// The current instant; renders as a native temporal call, never a parameter
    CurrentDateTime,
    Binary {
        op: BinaryOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    /// Method call against a target expression, checked against the allowlist
    Call {
        target: Box<Expr>,
        method: String,
        args: Vec<Expr>,
    },
    /// Conditional expression: CASE WHEN test THEN then ELSE otherwise END
    Case {
        test: Box<Expr>,
        then: Box<Expr>,
        otherwise: Box<Expr>,
    },
    /// Comprehension over a collection or relationship navigation
    Comprehension {
        source: Box<Expr>,
        binding: String,
        predicate: Option<Box<Expr>>,
        projection: Option<Box<Expr>>,
    },
    /// The set of relationships of one type from the current node;
    /// only valid as a comprehension source (compiles to a pattern
    /// comprehension, not a list comprehension)
    RelationshipNav {
        rel_type: String,
        direction: Direction,
    },
    /// The grouping key inside a grouped projection
    GroupKey,
    /// The collected members of the group, as a list
    GroupMembers,
    /// Aggregate over the grouped members, optionally narrowed per item
    Aggregate {
        kind: AggregateKind,
        selector: Option<Box<Expr>>,
    },
}

/// Property access on the current alias
pub fn prop(name: impl Into<String>) -> Expr {
    Expr::Property {
        root: PropertyRoot::Current,
        path: vec![name.into()],
    }
}

/// Property access on an explicit pattern alias
pub fn alias_prop(alias: impl Into<String>, name: impl Into<String>) -> Expr {
    Expr::Property {
        root: PropertyRoot::Alias(alias.into()),
        path: vec![name.into()],
    }
}

/// A comprehension item binding reference
pub fn item(binding: impl Into<String>) -> Expr {
    Expr::Property {
        root: PropertyRoot::Binding(binding.into()),
        path: Vec::new(),
    }
}

/// A captured literal value
pub fn lit(value: impl Into<CypherValue>) -> Expr {
    Expr::Literal(value.into())
}

/// The current instant
pub fn now() -> Expr {
    Expr::CurrentDateTime
}

/// The set of relationships of `rel_type` from the current node
pub fn rels(rel_type: impl Into<String>, direction: Direction) -> Expr {
    Expr::RelationshipNav {
        rel_type: rel_type.into(),
        direction,
    }
}

/// The grouping key inside a grouped projection
pub fn group_key() -> Expr {
    Expr::GroupKey
}

/// The collected members of the group, as a list
pub fn group_members() -> Expr {
    Expr::GroupMembers
}

/// Aggregate over grouped members
pub fn agg(kind: AggregateKind, selector: Option<Expr>) -> Expr {
    Expr::Aggregate {
        kind,
        selector: selector.map(Box::new),
    }
}

/// Count of grouped members
pub fn agg_count() -> Expr {
    agg(AggregateKind::Count, None)
}

/// Conditional expression
pub fn case(test: Expr, then: Expr, otherwise: Expr) -> Expr {
    Expr::Case {
        test: Box::new(test),
        then: Box::new(then),
        otherwise: Box::new(otherwise),
    }
}

impl Expr {
    fn binary(self, op: BinaryOp, rhs: impl Into<Expr>) -> Expr {
        Expr::Binary {
            op,
            lhs: Box::new(self),
            rhs: Box::new(rhs.into()),
        }
    }

    fn call(self, method: &str, args: Vec<Expr>) -> Expr {
        Expr::Call {
            target: Box::new(self),
            method: method.to_string(),
            args,
        }
    }

    /// Extend a property access with a nested member
    ///
    /// Member access on anything other than a property chain is not
    /// expressible; it is kept as an unresolvable call so the translator
    /// reports it instead of guessing.
    pub fn prop(self, name: impl Into<String>) -> Expr {
        match self {
            Expr::Property { root, mut path } => {
                path.push(name.into());
                Expr::Property { root, path }
            }
            other => Expr::Call {
                target: Box::new(other),
                method: "__member_access__".to_string(),
                args: vec![Expr::Literal(CypherValue::String(name.into()))],
            },
        }
    }

    pub fn eq(self, rhs: impl Into<Expr>) -> Expr {
        self.binary(BinaryOp::Eq, rhs)
    }

    pub fn ne(self, rhs: impl Into<Expr>) -> Expr {
        self.binary(BinaryOp::Ne, rhs)
    }

    pub fn lt(self, rhs: impl Into<Expr>) -> Expr {
        self.binary(BinaryOp::Lt, rhs)
    }

    pub fn le(self, rhs: impl Into<Expr>) -> Expr {
        self.binary(BinaryOp::Le, rhs)
    }

    pub fn gt(self, rhs: impl Into<Expr>) -> Expr {
        self.binary(BinaryOp::Gt, rhs)
    }

    pub fn ge(self, rhs: impl Into<Expr>) -> Expr {
        self.binary(BinaryOp::Ge, rhs)
    }

    pub fn and(self, rhs: impl Into<Expr>) -> Expr {
        self.binary(BinaryOp::And, rhs)
    }

    pub fn or(self, rhs: impl Into<Expr>) -> Expr {
        self.binary(BinaryOp::Or, rhs)
    }

    pub fn not(self) -> Expr {
        Expr::Unary {
            op: UnaryOp::Not,
            operand: Box::new(self),
        }
    }

    pub fn neg(self) -> Expr {
        Expr::Unary {
            op: UnaryOp::Neg,
            operand: Box::new(self),
        }
    }

    pub fn add(self, rhs: impl Into<Expr>) -> Expr {
        self.binary(BinaryOp::Add, rhs)
    }

    pub fn sub(self, rhs: impl Into<Expr>) -> Expr {
        self.binary(BinaryOp::Sub, rhs)
    }

    pub fn mul(self, rhs: impl Into<Expr>) -> Expr {
        self.binary(BinaryOp::Mul, rhs)
    }

    pub fn div(self, rhs: impl Into<Expr>) -> Expr {
        self.binary(BinaryOp::Div, rhs)
    }

    pub fn rem(self, rhs: impl Into<Expr>) -> Expr {
        self.binary(BinaryOp::Rem, rhs)
    }

    // String methods (allowlisted)

    pub fn to_upper(self) -> Expr {
        self.call("to_upper", Vec::new())
    }

    pub fn to_lower(self) -> Expr {
        self.call("to_lower", Vec::new())
    }

    pub fn trim(self) -> Expr {
        self.call("trim", Vec::new())
    }

    pub fn substring(self, start: impl Into<Expr>, length: impl Into<Expr>) -> Expr {
        self.call("substring", vec![start.into(), length.into()])
    }

    pub fn replace(self, from: impl Into<Expr>, to: impl Into<Expr>) -> Expr {
        self.call("replace", vec![from.into(), to.into()])
    }

    pub fn starts_with(self, prefix: impl Into<Expr>) -> Expr {
        self.call("starts_with", vec![prefix.into()])
    }

    pub fn ends_with(self, suffix: impl Into<Expr>) -> Expr {
        self.call("ends_with", vec![suffix.into()])
    }

    pub fn contains_str(self, needle: impl Into<Expr>) -> Expr {
        self.call("contains", vec![needle.into()])
    }

    pub fn split(self, separator: impl Into<Expr>) -> Expr {
        self.call("split", vec![separator.into()])
    }

    // Math methods (allowlisted)

    pub fn abs(self) -> Expr {
        self.call("abs", Vec::new())
    }

    pub fn ceil(self) -> Expr {
        self.call("ceil", Vec::new())
    }

    pub fn floor(self) -> Expr {
        self.call("floor", Vec::new())
    }

    pub fn round(self) -> Expr {
        self.call("round", Vec::new())
    }

    pub fn sqrt(self) -> Expr {
        self.call("sqrt", Vec::new())
    }

    pub fn sin(self) -> Expr {
        self.call("sin", Vec::new())
    }

    pub fn cos(self) -> Expr {
        self.call("cos", Vec::new())
    }

    pub fn tan(self) -> Expr {
        self.call("tan", Vec::new())
    }

    pub fn atan2(self, x: impl Into<Expr>) -> Expr {
        self.call("atan2", vec![x.into()])
    }

    pub fn exp(self) -> Expr {
        self.call("exp", Vec::new())
    }

    pub fn log(self) -> Expr {
        self.call("log", Vec::new())
    }

    pub fn log10(self) -> Expr {
        self.call("log10", Vec::new())
    }

    pub fn pow(self, exponent: impl Into<Expr>) -> Expr {
        self.call("pow", vec![exponent.into()])
    }

    pub fn min_with(self, other: impl Into<Expr>) -> Expr {
        self.call("min", vec![other.into()])
    }

    pub fn max_with(self, other: impl Into<Expr>) -> Expr {
        self.call("max", vec![other.into()])
    }

    // Temporal add-unit methods (allowlisted)

    pub fn add_years(self, n: impl Into<Expr>) -> Expr {
        self.call("add_years", vec![n.into()])
    }

    pub fn add_months(self, n: impl Into<Expr>) -> Expr {
        self.call("add_months", vec![n.into()])
    }

    pub fn add_days(self, n: impl Into<Expr>) -> Expr {
        self.call("add_days", vec![n.into()])
    }

    pub fn add_hours(self, n: impl Into<Expr>) -> Expr {
        self.call("add_hours", vec![n.into()])
    }

    pub fn add_minutes(self, n: impl Into<Expr>) -> Expr {
        self.call("add_minutes", vec![n.into()])
    }

    pub fn add_seconds(self, n: impl Into<Expr>) -> Expr {
        self.call("add_seconds", vec![n.into()])
    }

    // Collection methods over a bound collection or relationship navigation

    /// Map each item through a projection
    pub fn select_items(self, binding: impl Into<String>, projection: Expr) -> Expr {
        Expr::Comprehension {
            source: Box::new(self),
            binding: binding.into(),
            predicate: None,
            projection: Some(Box::new(projection)),
        }
    }

    /// Keep only items matching a predicate
    pub fn where_items(self, binding: impl Into<String>, predicate: Expr) -> Expr {
        Expr::Comprehension {
            source: Box::new(self),
            binding: binding.into(),
            predicate: Some(Box::new(predicate)),
            projection: None,
        }
    }

    /// Number of items in the collection
    pub fn count_items(self) -> Expr {
        self.call("count_items", Vec::new())
    }

    /// First item of the collection
    pub fn first_item(self) -> Expr {
        self.call("first_item", Vec::new())
    }

    /// Last item of the collection
    pub fn last_item(self) -> Expr {
        self.call("last_item", Vec::new())
    }

    /// First `n` items of the collection
    pub fn take_items(self, n: impl Into<Expr>) -> Expr {
        self.call("take_items", vec![n.into()])
    }

    /// Items after the first `n`
    pub fn skip_items(self, n: impl Into<Expr>) -> Expr {
        self.call("skip_items", vec![n.into()])
    }

    /// The collection in reverse order
    pub fn reverse_items(self) -> Expr {
        self.call("reverse_items", Vec::new())
    }
}

impl From<CypherValue> for Expr {
    fn from(value: CypherValue) -> Self {
        Expr::Literal(value)
    }
}

impl From<bool> for Expr {
    fn from(value: bool) -> Self {
        Expr::Literal(CypherValue::Boolean(value))
    }
}

impl From<i32> for Expr {
    fn from(value: i32) -> Self {
        Expr::Literal(CypherValue::Integer(value as i64))
    }
}

impl From<i64> for Expr {
    fn from(value: i64) -> Self {
        Expr::Literal(CypherValue::Integer(value))
    }
}

impl From<f64> for Expr {
    fn from(value: f64) -> Self {
        Expr::Literal(CypherValue::Float(value))
    }
}

impl From<&str> for Expr {
    fn from(value: &str) -> Self {
        Expr::Literal(CypherValue::String(value.to_string()))
    }
}

impl From<String> for Expr {
    fn from(value: String) -> Self {
        Expr::Literal(CypherValue::String(value))
    }
}
