// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Statement assembler: build context to final statement text
//!
//! Deterministic renderer with fixed clause order:
//! MATCH → WHERE → WITH → RETURN [DISTINCT] → ORDER BY → SKIP → LIMIT.
//! When no operator produced a MATCH pattern, the base pattern is
//! synthesized from the recorded root.

use crate::compile::context::{BuildContext, ColumnRole, ReturnItem};
use crate::compile::error::CompileError;
use crate::compile::CompiledStatement;
use crate::query::plan::QueryRoot;
use crate::schema::EntityKind;

/// Base MATCH pattern for a root with no traversal
pub fn base_pattern(root: &QueryRoot, alias: &str) -> String {
    match root.kind {
        EntityKind::Node => format!("({}:{})", alias, root.label),
        EntityKind::Relationship => format!("()-[{}:{}]->()", alias, root.label),
    }
}

/// Render the frozen context into the compiled statement
pub fn assemble(mut ctx: BuildContext) -> Result<CompiledStatement, CompileError> {
    let mut text = String::new();

    // MATCH
    let pattern = if ctx.match_pattern.is_empty() {
        base_pattern(&ctx.root, ctx.current_alias())
    } else {
        ctx.match_pattern.clone()
    };
    match &ctx.path_binding {
        Some(path_alias) => {
            text.push_str("MATCH ");
            text.push_str(path_alias);
            text.push_str(" = ");
            text.push_str(&pattern);
        }
        None => {
            text.push_str("MATCH ");
            text.push_str(&pattern);
        }
    }

    // WHERE: conjunctive fragments in encounter order
    if !ctx.where_fragments.is_empty() {
        text.push_str(" WHERE ");
        text.push_str(&ctx.where_fragments.join(" AND "));
    }

    // Intermediate WITH / grouping clause
    if let Some(with) = &ctx.with_fragment {
        text.push(' ');
        text.push_str(with);
    }

    // RETURN
    let items = return_items(&ctx)?;
    text.push_str(" RETURN ");
    if ctx.distinct {
        text.push_str("DISTINCT ");
    }
    let rendered: Vec<String> = items
        .iter()
        .map(|item| match &item.alias {
            Some(alias) => format!("{} AS {}", item.fragment, alias),
            None => item.fragment.clone(),
        })
        .collect();
    text.push_str(&rendered.join(", "));

    // ORDER BY, with direction inversion for last-style terminals
    if !ctx.order_keys.is_empty() {
        text.push_str(" ORDER BY ");
        let keys: Vec<String> = ctx
            .order_keys
            .iter()
            .map(|key| {
                let descending = key.descending != ctx.invert_order;
                if descending {
                    format!("{} DESC", key.fragment)
                } else {
                    key.fragment.clone()
                }
            })
            .collect();
        text.push_str(&keys.join(", "));
    }

    if let Some(skip) = ctx.skip {
        text.push_str(&format!(" SKIP {}", skip));
    }
    if let Some(limit) = ctx.limit {
        text.push_str(&format!(" LIMIT {}", limit));
    }

    let columns = items
        .iter()
        .map(|item| (item.column_name().to_string(), item.role.clone()))
        .collect();

    Ok(CompiledStatement {
        text,
        parameters: ctx.take_parameters(),
        shape: ctx.shape,
        columns,
        terminal: ctx.terminal,
        post_fetch: ctx.post_fetch,
    })
}

/// Resolve the RETURN items: explicit projection, path columns, or the
/// default entity projection derived from the root
fn return_items(ctx: &BuildContext) -> Result<Vec<ReturnItem>, CompileError> {
    if !ctx.return_items.is_empty() {
        return Ok(ctx.return_items.clone());
    }

    // Whole-path query: return the node and relationship sequences
    if let Some(path_alias) = &ctx.path_binding {
        return Ok(vec![
            ReturnItem {
                fragment: format!("nodes({})", path_alias),
                alias: None,
                role: ColumnRole::PathNodes,
            },
            ReturnItem {
                fragment: format!("relationships({})", path_alias),
                alias: None,
                role: ColumnRole::PathRelationships,
            },
        ]);
    }

    // Single-hop path tuple: source, relationship, target, plus endpoint
    // ids so the relationship entity can be fully populated
    if let Some(path) = &ctx.path {
        return Ok(vec![
            ReturnItem {
                fragment: path.source.clone(),
                alias: None,
                role: ColumnRole::SourceNode,
            },
            ReturnItem {
                fragment: path.relationship.clone(),
                alias: None,
                role: ColumnRole::Relationship,
            },
            ReturnItem {
                fragment: path.target.clone(),
                alias: None,
                role: ColumnRole::TargetNode,
            },
            ReturnItem {
                fragment: format!("startNode({}).id", path.relationship),
                alias: Some("__start_id".to_string()),
                role: ColumnRole::StartId,
            },
            ReturnItem {
                fragment: format!("endNode({}).id", path.relationship),
                alias: Some("__end_id".to_string()),
                role: ColumnRole::EndId,
            },
        ]);
    }

    // Default: the current entity
    let alias = ctx.current_alias();
    if alias.is_empty() {
        return Err(CompileError::EmptyReturn(
            "no root entity and no explicit projection".to_string(),
        ));
    }
    let mut items = vec![ReturnItem {
        fragment: alias.to_string(),
        alias: None,
        role: ColumnRole::Entity,
    }];
    // Relationship roots return endpoint identifiers alongside the
    // relationship; they are not part of its property bag.
    if ctx.root.kind == EntityKind::Relationship && alias == "r" {
        items.push(ReturnItem {
            fragment: format!("startNode({}).id", alias),
            alias: Some("__start_id".to_string()),
            role: ColumnRole::StartId,
        });
        items.push(ReturnItem {
            fragment: format!("endNode({}).id", alias),
            alias: Some("__end_id".to_string()),
            role: ColumnRole::EndId,
        });
    }
    Ok(items)
}
