// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Native function allowlist for method-call translation
//!
//! Maps method names on the expression tree to their Cypher renderings:
//! - string: toUpper, toLower, trim, substring, replace, split and the
//!   STARTS WITH / ENDS WITH / CONTAINS operators
//! - math: abs, ceil, floor, round, sqrt, trigonometry, exp, log, log10,
//!   the `^` power operator, and two-value min/max via CASE
//! - temporal: add-unit methods rendered as duration arithmetic
//! - collections: size, head, last, reverse, and slice renderings
//!
//! A method outside these tables is a translation failure, never a
//! silent fallback.

use once_cell::sync::Lazy;
use std::collections::HashMap;

/// How an allowlisted scalar method renders into Cypher
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarRendering {
    /// `name(target, args...)`
    Function(&'static str),
    /// `(target KEYWORD arg)`, e.g. STARTS WITH
    InfixKeyword(&'static str),
    /// `(target SYMBOL arg)`, e.g. `^`
    InfixSymbol(&'static str),
    /// `(target + duration({unit: arg}))`
    DurationAdd(&'static str),
    /// Two-value comparison via CASE; the operator picks min or max
    CaseCompare(&'static str),
}

/// One allowlist entry: rendering plus expected argument count
/// (excluding the target)
#[derive(Debug, Clone, Copy)]
pub struct ScalarSpec {
    pub rendering: ScalarRendering,
    pub arity: usize,
}

const fn spec(rendering: ScalarRendering, arity: usize) -> ScalarSpec {
    ScalarSpec { rendering, arity }
}

/// Scalar method allowlist
pub static SCALAR_FUNCTIONS: Lazy<HashMap<&'static str, ScalarSpec>> = Lazy::new(|| {
    let mut table = HashMap::new();

    // String functions
    table.insert("to_upper", spec(ScalarRendering::Function("toUpper"), 0));
    table.insert("to_lower", spec(ScalarRendering::Function("toLower"), 0));
    table.insert("trim", spec(ScalarRendering::Function("trim"), 0));
    table.insert("substring", spec(ScalarRendering::Function("substring"), 2));
    table.insert("replace", spec(ScalarRendering::Function("replace"), 2));
    table.insert("split", spec(ScalarRendering::Function("split"), 1));
    table.insert(
        "starts_with",
        spec(ScalarRendering::InfixKeyword("STARTS WITH"), 1),
    );
    table.insert(
        "ends_with",
        spec(ScalarRendering::InfixKeyword("ENDS WITH"), 1),
    );
    table.insert(
        "contains",
        spec(ScalarRendering::InfixKeyword("CONTAINS"), 1),
    );

    // Math functions
    table.insert("abs", spec(ScalarRendering::Function("abs"), 0));
    table.insert("ceil", spec(ScalarRendering::Function("ceil"), 0));
    table.insert("floor", spec(ScalarRendering::Function("floor"), 0));
    table.insert("round", spec(ScalarRendering::Function("round"), 0));
    table.insert("sqrt", spec(ScalarRendering::Function("sqrt"), 0));
    table.insert("sin", spec(ScalarRendering::Function("sin"), 0));
    table.insert("cos", spec(ScalarRendering::Function("cos"), 0));
    table.insert("tan", spec(ScalarRendering::Function("tan"), 0));
    table.insert("atan2", spec(ScalarRendering::Function("atan2"), 1));
    table.insert("exp", spec(ScalarRendering::Function("exp"), 0));
    table.insert("log", spec(ScalarRendering::Function("log"), 0));
    table.insert("log10", spec(ScalarRendering::Function("log10"), 0));
    table.insert("pow", spec(ScalarRendering::InfixSymbol("^"), 1));
    table.insert("min", spec(ScalarRendering::CaseCompare("<"), 1));
    table.insert("max", spec(ScalarRendering::CaseCompare(">"), 1));

    // Temporal add-unit functions
    table.insert("add_years", spec(ScalarRendering::DurationAdd("years"), 1));
    table.insert(
        "add_months",
        spec(ScalarRendering::DurationAdd("months"), 1),
    );
    table.insert("add_days", spec(ScalarRendering::DurationAdd("days"), 1));
    table.insert("add_hours", spec(ScalarRendering::DurationAdd("hours"), 1));
    table.insert(
        "add_minutes",
        spec(ScalarRendering::DurationAdd("minutes"), 1),
    );
    table.insert(
        "add_seconds",
        spec(ScalarRendering::DurationAdd("seconds"), 1),
    );

    table
});

/// How an allowlisted collection method renders into Cypher
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectionRendering {
    /// `size(coll)`
    Size,
    /// `head(coll)`
    Head,
    /// `last(coll)`
    Last,
    /// `reverse(coll)`
    Reverse,
    /// `coll[0..n]`
    TakeSlice,
    /// `coll[n..]`
    SkipSlice,
}

/// Collection method allowlist
pub static COLLECTION_FUNCTIONS: Lazy<HashMap<&'static str, CollectionRendering>> =
    Lazy::new(|| {
        let mut table = HashMap::new();
        table.insert("count_items", CollectionRendering::Size);
        table.insert("first_item", CollectionRendering::Head);
        table.insert("last_item", CollectionRendering::Last);
        table.insert("reverse_items", CollectionRendering::Reverse);
        table.insert("take_items", CollectionRendering::TakeSlice);
        table.insert("skip_items", CollectionRendering::SkipSlice);
        table
    });
