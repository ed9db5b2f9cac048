// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Expression translator: sub-expression trees to Cypher fragments
//!
//! Pure over the expression tree except for parameter registration into
//! the build context. Captured values are never inlined as text; they are
//! externalized into the parameter table and referenced as `$pN`. The one
//! exception is the static current-instant accessor, which renders as the
//! native `datetime()` call because it carries no caller-supplied value.
//!
//! The match over expression variants is exhaustive; anything the
//! translator cannot render is a structured compile error, never a silent
//! approximation.

use crate::compile::context::BuildContext;
use crate::compile::error::CompileError;
use crate::compile::functions::{
    CollectionRendering, ScalarRendering, COLLECTION_FUNCTIONS, SCALAR_FUNCTIONS,
};
use crate::compile::validate_identifier;
use crate::query::expr::{AggregateKind, BinaryOp, Direction, Expr, PropertyRoot, UnaryOp};
use crate::schema::EntityShape;

/// Translate one sub-expression into a Cypher fragment
pub fn translate(expr: &Expr, ctx: &mut BuildContext) -> Result<String, CompileError> {
    match expr {
        Expr::Property { root, path } => translate_property(root, path, ctx),
        Expr::Literal(value) => {
            let name = ctx.add_parameter(value.clone());
            Ok(format!("${}", name))
        }
        Expr::CurrentDateTime => Ok("datetime()".to_string()),
        Expr::Binary { op, lhs, rhs } => {
            let left = translate(lhs, ctx)?;
            let right = translate(rhs, ctx)?;
            Ok(format!("({} {} {})", left, binary_op_text(*op), right))
        }
        Expr::Unary { op, operand } => {
            let inner = translate(operand, ctx)?;
            match op {
                UnaryOp::Not => Ok(format!("(NOT {})", inner)),
                UnaryOp::Neg => Ok(format!("(-{})", inner)),
            }
        }
        Expr::Call {
            target,
            method,
            args,
        } => translate_call(target, method, args, ctx),
        Expr::Case {
            test,
            then,
            otherwise,
        } => {
            let test_frag = translate(test, ctx)?;
            let then_frag = translate(then, ctx)?;
            let else_frag = translate(otherwise, ctx)?;
            Ok(format!(
                "CASE WHEN {} THEN {} ELSE {} END",
                test_frag, then_frag, else_frag
            ))
        }
        Expr::Comprehension {
            source,
            binding,
            predicate,
            projection,
        } => translate_comprehension(
            source,
            binding,
            predicate.as_deref(),
            projection.as_deref(),
            ctx,
        ),
        Expr::RelationshipNav { .. } => Err(CompileError::UnsupportedExpression(
            "relationship navigation is only valid as a comprehension source".to_string(),
        )),
        Expr::GroupKey => {
            let group = ctx.group.as_ref().ok_or_else(|| {
                CompileError::UnresolvedAlias(
                    "group key referenced outside a grouped projection".to_string(),
                )
            })?;
            Ok(group.key_alias.clone())
        }
        Expr::GroupMembers => {
            let group = ctx.group.as_ref().ok_or_else(|| {
                CompileError::UnresolvedAlias(
                    "group members referenced outside a grouped projection".to_string(),
                )
            })?;
            Ok(group.members_alias.clone())
        }
        Expr::Aggregate { kind, selector } => {
            translate_grouped_aggregate(*kind, selector.as_deref(), ctx)
        }
    }
}

/// Translate an expression with the current alias temporarily rebound
///
/// The save/restore discipline used for traversal filters and grouped
/// aggregate selectors: push, translate, pop — the rebinding never leaks.
pub fn translate_with_alias(
    expr: &Expr,
    ctx: &mut BuildContext,
    alias: &str,
    shape: Option<&'static EntityShape>,
) -> Result<String, CompileError> {
    ctx.push_alias(alias, shape);
    let result = translate(expr, ctx);
    ctx.pop_alias();
    result
}

fn translate_property(
    root: &PropertyRoot,
    path: &[String],
    ctx: &mut BuildContext,
) -> Result<String, CompileError> {
    let (root_name, shape) = match root {
        PropertyRoot::Current => (ctx.current_alias().to_string(), ctx.current_shape()),
        PropertyRoot::Alias(alias) => {
            if !ctx.has_alias(alias) {
                return Err(CompileError::UnresolvedAlias(alias.clone()));
            }
            (alias.clone(), None)
        }
        PropertyRoot::Binding(binding) => {
            if !ctx.has_binding(binding) {
                return Err(CompileError::UnresolvedAlias(binding.clone()));
            }
            (binding.clone(), None)
        }
    };

    if path.is_empty() {
        return Ok(root_name);
    }

    let mut rendered = root_name;
    for (i, segment) in path.iter().enumerate() {
        validate_identifier(segment)?;
        // The first segment resolves through the bound shape's storage
        // keys; nested segments address embedded structure verbatim.
        let key = if i == 0 {
            shape
                .map(|s| s.property_key(segment).to_string())
                .unwrap_or_else(|| segment.clone())
        } else {
            segment.clone()
        };
        rendered.push('.');
        rendered.push_str(&key);
    }
    Ok(rendered)
}

fn binary_op_text(op: BinaryOp) -> &'static str {
    match op {
        BinaryOp::Add => "+",
        BinaryOp::Sub => "-",
        BinaryOp::Mul => "*",
        BinaryOp::Div => "/",
        BinaryOp::Rem => "%",
        BinaryOp::Eq => "=",
        BinaryOp::Ne => "<>",
        BinaryOp::Lt => "<",
        BinaryOp::Le => "<=",
        BinaryOp::Gt => ">",
        BinaryOp::Ge => ">=",
        BinaryOp::And => "AND",
        BinaryOp::Or => "OR",
    }
}

fn translate_call(
    target: &Expr,
    method: &str,
    args: &[Expr],
    ctx: &mut BuildContext,
) -> Result<String, CompileError> {
    if method == "__member_access__" {
        return Err(CompileError::UnsupportedExpression(
            "member access on a non-property expression".to_string(),
        ));
    }

    if let Some(rendering) = COLLECTION_FUNCTIONS.get(method).copied() {
        return translate_collection_call(target, rendering, args, ctx);
    }

    let spec = SCALAR_FUNCTIONS
        .get(method)
        .copied()
        .ok_or_else(|| CompileError::UnsupportedExpression(format!("method call: {}", method)))?;

    if args.len() != spec.arity {
        return Err(CompileError::UnsupportedExpression(format!(
            "{} expects {} argument(s), got {}",
            method,
            spec.arity,
            args.len()
        )));
    }

    let target_frag = translate(target, ctx)?;
    let arg_frags = args
        .iter()
        .map(|a| translate(a, ctx))
        .collect::<Result<Vec<_>, _>>()?;

    match spec.rendering {
        ScalarRendering::Function(name) => {
            let mut rendered = format!("{}({}", name, target_frag);
            for arg in &arg_frags {
                rendered.push_str(", ");
                rendered.push_str(arg);
            }
            rendered.push(')');
            Ok(rendered)
        }
        ScalarRendering::InfixKeyword(keyword) => {
            Ok(format!("({} {} {})", target_frag, keyword, arg_frags[0]))
        }
        ScalarRendering::InfixSymbol(symbol) => {
            Ok(format!("({} {} {})", target_frag, symbol, arg_frags[0]))
        }
        ScalarRendering::DurationAdd(unit) => Ok(format!(
            "({} + duration({{{}: {}}}))",
            target_frag, unit, arg_frags[0]
        )),
        ScalarRendering::CaseCompare(op) => Ok(format!(
            "CASE WHEN ({} {} {}) THEN {} ELSE {} END",
            target_frag, op, arg_frags[0], target_frag, arg_frags[0]
        )),
    }
}

fn translate_collection_call(
    target: &Expr,
    rendering: CollectionRendering,
    args: &[Expr],
    ctx: &mut BuildContext,
) -> Result<String, CompileError> {
    let source = translate_collection_source(target, ctx)?;

    match rendering {
        CollectionRendering::Size => Ok(format!("size({})", source)),
        CollectionRendering::Head => Ok(format!("head({})", source)),
        CollectionRendering::Last => Ok(format!("last({})", source)),
        CollectionRendering::Reverse => Ok(format!("reverse({})", source)),
        CollectionRendering::TakeSlice => {
            let count = args.first().ok_or_else(|| {
                CompileError::UnsupportedExpression("take over a collection needs a count".into())
            })?;
            let count_frag = translate(count, ctx)?;
            Ok(format!("{}[0..{}]", source, count_frag))
        }
        CollectionRendering::SkipSlice => {
            let count = args.first().ok_or_else(|| {
                CompileError::UnsupportedExpression("skip over a collection needs a count".into())
            })?;
            let count_frag = translate(count, ctx)?;
            Ok(format!("{}[{}..]", source, count_frag))
        }
    }
}

/// Render a collection-valued expression usable as a comprehension or
/// list-function source
///
/// A relationship-typed navigation is not an in-memory collection: it
/// must become a pattern comprehension over the graph, never a plain
/// list reference.
fn translate_collection_source(
    source: &Expr,
    ctx: &mut BuildContext,
) -> Result<String, CompileError> {
    match source {
        Expr::RelationshipNav {
            rel_type,
            direction,
        } => {
            let binding = ctx.fresh_node_alias();
            render_pattern_comprehension(rel_type, *direction, &binding, None, &binding, ctx)
        }
        other => translate(other, ctx),
    }
}

fn translate_comprehension(
    source: &Expr,
    binding: &str,
    predicate: Option<&Expr>,
    projection: Option<&Expr>,
    ctx: &mut BuildContext,
) -> Result<String, CompileError> {
    validate_identifier(binding)?;
    if ctx.has_alias(binding) {
        return Err(CompileError::UnresolvedAlias(format!(
            "comprehension binding {} shadows a pattern alias",
            binding
        )));
    }

    if let Expr::RelationshipNav {
        rel_type,
        direction,
    } = source
    {
        ctx.push_binding(binding.to_string());
        let predicate_frag = predicate.map(|p| translate(p, ctx)).transpose()?;
        let projection_frag = match projection {
            Some(p) => translate(p, ctx)?,
            None => binding.to_string(),
        };
        ctx.pop_binding();
        return render_pattern_comprehension(
            rel_type,
            *direction,
            binding,
            predicate_frag.as_deref(),
            &projection_frag,
            ctx,
        );
    }

    // The source is translated outside the binding scope; the item
    // binding is only visible to the predicate and projection.
    let source_frag = translate(source, ctx)?;
    ctx.push_binding(binding.to_string());
    let predicate_frag = predicate.map(|p| translate(p, ctx)).transpose()?;
    let projection_frag = projection.map(|p| translate(p, ctx)).transpose()?;
    ctx.pop_binding();

    let rendered = match (predicate_frag, projection_frag) {
        (Some(pred), Some(proj)) => {
            format!("[{} IN {} WHERE {} | {}]", binding, source_frag, pred, proj)
        }
        (Some(pred), None) => format!("[{} IN {} WHERE {}]", binding, source_frag, pred),
        (None, Some(proj)) => format!("[{} IN {} | {}]", binding, source_frag, proj),
        (None, None) => format!("[{} IN {} | {}]", binding, source_frag, binding),
    };
    Ok(rendered)
}

/// Render a pattern comprehension over one relationship hop from the
/// current alias
fn render_pattern_comprehension(
    rel_type: &str,
    direction: Direction,
    binding: &str,
    predicate: Option<&str>,
    projection: &str,
    ctx: &mut BuildContext,
) -> Result<String, CompileError> {
    validate_identifier(rel_type)?;
    let rel_alias = ctx.fresh_rel_alias();
    let current = ctx.current_alias();
    let pattern = match direction {
        Direction::Outgoing => format!(
            "({})-[{}:{}]->({})",
            current, rel_alias, rel_type, binding
        ),
        Direction::Incoming => format!(
            "({})<-[{}:{}]-({})",
            current, rel_alias, rel_type, binding
        ),
        Direction::Both => format!("({})-[{}:{}]-({})", current, rel_alias, rel_type, binding),
    };
    let rendered = match predicate {
        Some(pred) => format!("[{} WHERE {} | {}]", pattern, pred, projection),
        None => format!("[{} | {}]", pattern, projection),
    };
    Ok(rendered)
}

fn translate_grouped_aggregate(
    kind: AggregateKind,
    selector: Option<&Expr>,
    ctx: &mut BuildContext,
) -> Result<String, CompileError> {
    let (members, member_shape) = {
        let group = ctx.group.as_ref().ok_or_else(|| {
            CompileError::UnresolvedAlias(
                "aggregate referenced outside a grouped projection".to_string(),
            )
        })?;
        (group.members_alias.clone(), group.member_shape)
    };

    match kind {
        AggregateKind::Count => match selector {
            None => Ok(format!("size({})", members)),
            Some(sel) => {
                let item_frag = translate_with_alias(sel, ctx, "x", member_shape)?;
                Ok(format!(
                    "size([x IN {} WHERE {} IS NOT NULL])",
                    members, item_frag
                ))
            }
        },
        AggregateKind::Sum => {
            let sel = require_selector(kind, selector)?;
            let item_frag = translate_with_alias(sel, ctx, "x", member_shape)?;
            Ok(format!(
                "reduce(acc = 0, x IN {} | (acc + {}))",
                members, item_frag
            ))
        }
        AggregateKind::Avg => {
            let sel = require_selector(kind, selector)?;
            let item_frag = translate_with_alias(sel, ctx, "x", member_shape)?;
            Ok(format!(
                "(reduce(acc = 0.0, x IN {} | (acc + {})) / size({}))",
                members, item_frag, members
            ))
        }
        AggregateKind::Min => render_extremum(ctx, &members, member_shape, selector, kind, "<"),
        AggregateKind::Max => render_extremum(ctx, &members, member_shape, selector, kind, ">"),
    }
}

fn render_extremum(
    ctx: &mut BuildContext,
    members: &str,
    member_shape: Option<&'static EntityShape>,
    selector: Option<&Expr>,
    kind: AggregateKind,
    op: &str,
) -> Result<String, CompileError> {
    let sel = require_selector(kind, selector)?;
    let seed_alias = format!("head({})", members);
    let seed_frag = translate_with_alias(sel, ctx, &seed_alias, member_shape)?;
    let item_frag = translate_with_alias(sel, ctx, "x", member_shape)?;
    Ok(format!(
        "reduce(m = {}, x IN {} | CASE WHEN ({} {} m) THEN {} ELSE m END)",
        seed_frag, members, item_frag, op, item_frag
    ))
}

fn require_selector(
    kind: AggregateKind,
    selector: Option<&Expr>,
) -> Result<&Expr, CompileError> {
    selector.ok_or_else(|| {
        CompileError::UnsupportedOperatorCombination(format!(
            "{:?} aggregate requires a property selector",
            kind
        ))
    })
}
