// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Operator compiler: query plans to a populated build context
//!
//! Consumes the ordered operator sequence, the first element always being
//! the query root, delegating sub-expression translation to the
//! expression translator. Unsupported operator combinations are fatal
//! compile errors, not warnings.

use crate::compile::assembler;
use crate::compile::context::{BuildContext, GroupContext, OrderKey, PathAliases, ResultShape};
use crate::compile::context::{ColumnRole, ReturnItem};
use crate::compile::error::CompileError;
use crate::compile::translator::{translate, translate_with_alias};
use crate::compile::{validate_identifier, CompiledStatement, ShapeTable};
use crate::query::expr::{AggregateKind, Direction, Expr};
use crate::query::plan::{QueryOp, QueryPlan, TerminalKind, TraversalStep};
use crate::schema::EntityKind;
use log::debug;

/// How a traversal step shapes the result stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TraversalMode {
    /// Stream of far-endpoint nodes
    Stream,
    /// Source/relationship/target tuples
    Path,
    /// Whole shortest path between root and far endpoint
    Shortest,
}

/// Compile a query plan into a statement
///
/// The same plan compiles to identical statement text and identical
/// parameter ordering on every call.
pub fn compile(plan: &QueryPlan, shapes: &ShapeTable) -> Result<CompiledStatement, CompileError> {
    validate_identifier(&plan.root.label)?;
    let root_shape = shapes.get(&plan.root.type_name);
    let mut ctx = BuildContext::new(plan.root.clone(), root_shape);
    let mut reduced = false;

    for op in &plan.ops {
        if reduced {
            return Err(CompileError::UnsupportedOperatorCombination(
                "operators after a terminal reducer".to_string(),
            ));
        }
        match op {
            QueryOp::Filter(predicate) => compile_filter(&mut ctx, predicate)?,
            QueryOp::Project(fields) => compile_project(&mut ctx, fields)?,
            QueryOp::ProjectValue(expr) => compile_project_value(&mut ctx, expr)?,
            QueryOp::ProjectPostFetch => {
                ctx.post_fetch = true;
            }
            QueryOp::OrderBy { key, descending } => {
                if ctx.group.is_some() {
                    return Err(CompileError::UnsupportedOperatorCombination(
                        "ordering after grouping is not supported".to_string(),
                    ));
                }
                let fragment = translate(key, &mut ctx)?;
                ctx.order_keys.push(OrderKey {
                    fragment,
                    descending: *descending,
                });
            }
            QueryOp::Skip(n) => ctx.skip = Some(*n),
            QueryOp::Take(n) => ctx.limit = Some(*n),
            QueryOp::Distinct => ctx.distinct = true,
            QueryOp::GroupBy(key) => compile_group_by(&mut ctx, key)?,
            QueryOp::Aggregate { kind, selector } => {
                compile_aggregate(&mut ctx, *kind, selector.as_ref())?;
                reduced = true;
            }
            QueryOp::Terminal { kind, predicate } => {
                compile_terminal(&mut ctx, *kind, predicate.as_ref())?;
                reduced = true;
            }
            QueryOp::Traverse(step) => {
                apply_traversal(&mut ctx, shapes, step, TraversalMode::Stream)?
            }
            QueryOp::TraversePath(step) => {
                apply_traversal(&mut ctx, shapes, step, TraversalMode::Path)?
            }
            QueryOp::ShortestPath(step) => {
                apply_traversal(&mut ctx, shapes, step, TraversalMode::Shortest)?
            }
        }
    }

    if ctx.group.is_some() && ctx.return_items.is_empty() {
        return Err(CompileError::UnsupportedOperatorCombination(
            "grouping requires a subsequent projection".to_string(),
        ));
    }

    let compiled = assembler::assemble(ctx)?;
    debug!(
        "compiled {:?} query: {} ({} parameters)",
        compiled.shape,
        compiled.text,
        compiled.parameters.len()
    );
    Ok(compiled)
}

fn compile_filter(ctx: &mut BuildContext, predicate: &Expr) -> Result<(), CompileError> {
    if ctx.group.is_some() {
        return Err(CompileError::UnsupportedOperatorCombination(
            "filtering after grouping is not supported".to_string(),
        ));
    }
    let fragment = translate(predicate, ctx)?;
    ctx.where_fragments.push(fragment);
    Ok(())
}

fn compile_project(
    ctx: &mut BuildContext,
    fields: &[(String, Expr)],
) -> Result<(), CompileError> {
    if fields.is_empty() {
        return Err(CompileError::UnsupportedOperatorCombination(
            "projection with no fields".to_string(),
        ));
    }
    for (name, expr) in fields {
        validate_identifier(name)?;
        let fragment = translate(expr, ctx)?;
        ctx.return_items.push(ReturnItem {
            fragment,
            alias: Some(name.clone()),
            role: ColumnRole::Field(name.clone()),
        });
    }
    ctx.shape = ResultShape::GroupedProjection;
    Ok(())
}

fn compile_project_value(ctx: &mut BuildContext, expr: &Expr) -> Result<(), CompileError> {
    let fragment = translate(expr, ctx)?;
    ctx.return_items.push(ReturnItem {
        fragment,
        alias: None,
        role: ColumnRole::Scalar,
    });
    ctx.shape = ResultShape::Scalar;
    Ok(())
}

fn compile_group_by(ctx: &mut BuildContext, key: &Expr) -> Result<(), CompileError> {
    if ctx.group.is_some() {
        return Err(CompileError::UnsupportedOperatorCombination(
            "nested grouping is not supported".to_string(),
        ));
    }
    let key_fragment = translate(key, ctx)?;
    let current = ctx.current_alias().to_string();
    ctx.with_fragment = Some(format!(
        "WITH {} AS g0, collect({}) AS g1",
        key_fragment, current
    ));
    ctx.group = Some(GroupContext {
        key_alias: "g0".to_string(),
        members_alias: "g1".to_string(),
        member_shape: ctx.current_shape(),
    });
    Ok(())
}

fn compile_aggregate(
    ctx: &mut BuildContext,
    kind: AggregateKind,
    selector: Option<&Expr>,
) -> Result<(), CompileError> {
    if ctx.group.is_some() {
        return Err(CompileError::UnsupportedOperatorCombination(
            "aggregates over groups belong in the grouped projection".to_string(),
        ));
    }
    let current = ctx.current_alias().to_string();
    let fragment = match kind {
        AggregateKind::Count => {
            if selector.is_some() {
                return Err(CompileError::UnsupportedOperatorCombination(
                    "count does not take a selector".to_string(),
                ));
            }
            format!("count({})", current)
        }
        AggregateKind::Sum | AggregateKind::Avg | AggregateKind::Min | AggregateKind::Max => {
            let sel = selector.ok_or_else(|| {
                CompileError::UnsupportedOperatorCombination(format!(
                    "{:?} aggregate requires a property selector",
                    kind
                ))
            })?;
            let sel_fragment = translate(sel, ctx)?;
            let func = match kind {
                AggregateKind::Sum => "sum",
                AggregateKind::Avg => "avg",
                AggregateKind::Min => "min",
                AggregateKind::Max => "max",
                AggregateKind::Count => unreachable!(),
            };
            format!("{}({})", func, sel_fragment)
        }
    };
    ctx.return_items.push(ReturnItem {
        fragment,
        alias: None,
        role: ColumnRole::Scalar,
    });
    ctx.shape = ResultShape::Scalar;
    Ok(())
}

fn compile_terminal(
    ctx: &mut BuildContext,
    kind: TerminalKind,
    predicate: Option<&Expr>,
) -> Result<(), CompileError> {
    match kind {
        TerminalKind::First | TerminalKind::FirstOrDefault => {
            ctx.limit = Some(1);
            narrow_to_single(ctx);
        }
        // LIMIT 2, not 1: the materializer needs a second row to detect
        // and fail on multiplicity > 1 without another round trip.
        TerminalKind::Single | TerminalKind::SingleOrDefault => {
            ctx.limit = Some(2);
            narrow_to_single(ctx);
        }
        TerminalKind::Last | TerminalKind::LastOrDefault => {
            if ctx.order_keys.is_empty() {
                // No explicit order key: fall back to the entity's
                // identity so inversion has a direction to flip.
                let fragment = format!("{}.id", ctx.current_alias());
                ctx.order_keys.push(OrderKey {
                    fragment,
                    descending: false,
                });
            }
            ctx.invert_order = true;
            ctx.limit = Some(1);
            narrow_to_single(ctx);
        }
        TerminalKind::Any => {
            if let Some(p) = predicate {
                let fragment = translate(p, ctx)?;
                ctx.where_fragments.push(fragment);
            }
            let current = ctx.current_alias().to_string();
            ctx.return_items.push(ReturnItem {
                fragment: format!("count({}) > 0", current),
                alias: None,
                role: ColumnRole::Scalar,
            });
            ctx.shape = ResultShape::Boolean;
        }
        TerminalKind::All => {
            // Count the violating rows: the predicate holds for all
            // entities exactly when no entity matches its negation.
            let p = predicate.ok_or_else(|| {
                CompileError::UnsupportedOperatorCombination(
                    "all() requires a predicate".to_string(),
                )
            })?;
            let fragment = translate(p, ctx)?;
            ctx.where_fragments.push(format!("(NOT {})", fragment));
            let current = ctx.current_alias().to_string();
            ctx.return_items.push(ReturnItem {
                fragment: format!("count({}) = 0", current),
                alias: None,
                role: ColumnRole::Scalar,
            });
            ctx.shape = ResultShape::Boolean;
        }
    }
    ctx.terminal = Some(kind);
    Ok(())
}

fn narrow_to_single(ctx: &mut BuildContext) {
    if ctx.shape == ResultShape::EntityList {
        ctx.shape = ResultShape::SingleEntity;
    }
}

fn apply_traversal(
    ctx: &mut BuildContext,
    shapes: &ShapeTable,
    step: &TraversalStep,
    mode: TraversalMode,
) -> Result<(), CompileError> {
    validate_identifier(&step.rel_type)?;
    validate_identifier(&step.target_label)?;
    if ctx.group.is_some() {
        return Err(CompileError::UnsupportedOperatorCombination(
            "traversal after grouping is not supported".to_string(),
        ));
    }
    if ctx.root.kind == EntityKind::Relationship {
        return Err(CompileError::UnsupportedOperatorCombination(
            "traversal from a relationship root".to_string(),
        ));
    }

    let had_traversal = !ctx.match_pattern.is_empty();
    if mode == TraversalMode::Shortest && had_traversal {
        return Err(CompileError::UnsupportedOperatorCombination(
            "shortest path must start from the query root".to_string(),
        ));
    }
    if !had_traversal {
        ctx.match_pattern = assembler::base_pattern(&ctx.root, ctx.current_alias());
    }

    let source_alias = ctx.current_alias().to_string();
    let rel_alias = ctx.fresh_rel_alias();
    let target_alias = ctx.fresh_node_alias();
    let rel_shape = shapes.get(&step.rel_type_name);
    let target_shape = shapes.get(&step.target_type);

    let depth_suffix = if mode == TraversalMode::Shortest {
        // Shortest path is inherently variable-length
        format!("*{}..{}", step.depth.min, step.depth.max)
    } else if step.depth.is_single_hop() {
        String::new()
    } else if step.depth.min == step.depth.max {
        format!("*{}", step.depth.min)
    } else {
        format!("*{}..{}", step.depth.min, step.depth.max)
    };

    let rel_fragment = format!("[{}:{}{}]", rel_alias, step.rel_type, depth_suffix);
    let hop = match step.direction {
        Direction::Outgoing => format!("-{}->({}:{})", rel_fragment, target_alias, step.target_label),
        Direction::Incoming => format!("<-{}-({}:{})", rel_fragment, target_alias, step.target_label),
        Direction::Both => format!("-{}-({}:{})", rel_fragment, target_alias, step.target_label),
    };

    let multi_hop = !step.depth.is_single_hop();
    if mode == TraversalMode::Shortest {
        ctx.path_binding = Some("p".to_string());
        ctx.match_pattern = format!("shortestPath({}{})", ctx.match_pattern, hop);
    } else {
        if mode == TraversalMode::Path && multi_hop {
            // Variable-depth path tuples return the whole path's node and
            // relationship sequences, which requires a bound path variable.
            ctx.path_binding = Some("p".to_string());
        }
        ctx.match_pattern.push_str(&hop);
    }

    // Hop filters run with the current alias temporarily rebound to the
    // relationship or target alias; the rebinding never leaks past the
    // filter's own translation.
    if let Some(rel_filter) = &step.rel_filter {
        if !step.depth.is_single_hop() {
            return Err(CompileError::UnsupportedOperatorCombination(
                "relationship filters require a single-hop traversal".to_string(),
            ));
        }
        let fragment = translate_with_alias(rel_filter, ctx, &rel_alias, rel_shape)?;
        ctx.where_fragments.push(fragment);
    }
    if let Some(target_filter) = &step.target_filter {
        let fragment = translate_with_alias(target_filter, ctx, &target_alias, target_shape)?;
        ctx.where_fragments.push(fragment);
    }

    match mode {
        TraversalMode::Stream => {
            ctx.rebind_current(target_alias, target_shape);
        }
        TraversalMode::Path if !multi_hop => {
            ctx.path = Some(PathAliases {
                source: source_alias,
                relationship: rel_alias,
                target: target_alias.clone(),
            });
            ctx.shape = ResultShape::PathTuple;
            ctx.rebind_current(target_alias, target_shape);
        }
        // Variable-depth and shortest-path queries materialize whole
        // paths from the bound path variable.
        TraversalMode::Path | TraversalMode::Shortest => {
            ctx.shape = ResultShape::PathTuple;
            ctx.rebind_current(target_alias, target_shape);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::CypherValue;
    use crate::query::expr::{agg, agg_count, group_key, lit, prop};
    use crate::query::plan::QueryRoot;
    use crate::schema::{EntityShape, FieldDef, FieldKind};

    static PERSON_FIELDS: &[FieldDef] = &[
        FieldDef::new("id", FieldKind::Primitive),
        FieldDef::with_storage_name("age", "Age", FieldKind::Primitive),
        FieldDef::with_storage_name("name", "Name", FieldKind::Primitive),
        FieldDef::with_storage_name("city", "City", FieldKind::Primitive),
    ];

    static PERSON_SHAPE: EntityShape = EntityShape {
        type_name: "Person",
        label: "Person",
        kind: EntityKind::Node,
        fields: PERSON_FIELDS,
    };

    static COMPANY_FIELDS: &[FieldDef] = &[
        FieldDef::new("id", FieldKind::Primitive),
        FieldDef::with_storage_name("name", "Name", FieldKind::Primitive),
    ];

    static COMPANY_SHAPE: EntityShape = EntityShape {
        type_name: "Company",
        label: "Company",
        kind: EntityKind::Node,
        fields: COMPANY_FIELDS,
    };

    static WORKS_FOR_FIELDS: &[FieldDef] = &[
        FieldDef::new("id", FieldKind::Primitive),
        FieldDef::with_storage_name("salary", "Salary", FieldKind::Primitive),
    ];

    static WORKS_FOR_SHAPE: EntityShape = EntityShape {
        type_name: "WorksFor",
        label: "WORKS_FOR",
        kind: EntityKind::Relationship,
        fields: WORKS_FOR_FIELDS,
    };

    fn shapes() -> ShapeTable {
        let mut table = ShapeTable::new();
        table.insert(&PERSON_SHAPE);
        table.insert(&COMPANY_SHAPE);
        table.insert(&WORKS_FOR_SHAPE);
        table
    }

    fn person_plan() -> QueryPlan {
        QueryPlan::new(QueryRoot {
            type_name: "Person".to_string(),
            label: "Person".to_string(),
            kind: EntityKind::Node,
        })
    }

    fn works_for_step() -> TraversalStep {
        TraversalStep::new("WORKS_FOR", "WorksFor", "Company", "Company", Direction::Outgoing)
    }

    #[test]
    fn test_filter_order_take_scenario() {
        let mut plan = person_plan();
        plan.push(QueryOp::Filter(prop("age").gt(lit(30))));
        plan.push(QueryOp::OrderBy {
            key: prop("name"),
            descending: false,
        });
        plan.push(QueryOp::Take(2));

        let compiled = compile(&plan, &shapes()).unwrap();
        assert_eq!(
            compiled.text,
            "MATCH (n:Person) WHERE (n.Age > $p0) RETURN n ORDER BY n.Name LIMIT 2"
        );
        assert_eq!(
            compiled.parameters,
            vec![("p0".to_string(), CypherValue::Integer(30))]
        );
        assert_eq!(compiled.shape, ResultShape::EntityList);
    }

    #[test]
    fn test_compilation_is_deterministic() {
        let mut plan = person_plan();
        plan.push(QueryOp::Filter(prop("age").gt(lit(30))));
        plan.push(QueryOp::Filter(prop("city").eq(lit("Boston"))));
        plan.push(QueryOp::OrderBy {
            key: prop("name"),
            descending: false,
        });

        let first = compile(&plan, &shapes()).unwrap();
        let second = compile(&plan, &shapes()).unwrap();
        assert_eq!(first.text, second.text);
        assert_eq!(first.parameters, second.parameters);
    }

    #[test]
    fn test_filters_conjoin_in_encounter_order() {
        let mut split = person_plan();
        split.push(QueryOp::Filter(prop("age").gt(lit(30))));
        split.push(QueryOp::Filter(prop("city").eq(lit("Boston"))));

        let mut joined = person_plan();
        joined.push(QueryOp::Filter(
            prop("age").gt(lit(30)).and(prop("city").eq(lit("Boston"))),
        ));

        let split = compile(&split, &shapes()).unwrap();
        let joined = compile(&joined, &shapes()).unwrap();
        // Same conjunctive condition set and parameter order; only the
        // grouping parentheses differ.
        assert!(split.text.contains("(n.Age > $p0) AND (n.City = $p1)"));
        assert!(joined.text.contains("((n.Age > $p0) AND (n.City = $p1))"));
        assert_eq!(split.parameters, joined.parameters);
    }

    #[test]
    fn test_take_with_single_requests_limit_two() {
        for take in [1u64, 5, 100] {
            let mut plan = person_plan();
            plan.push(QueryOp::Take(take));
            plan.push(QueryOp::Terminal {
                kind: TerminalKind::Single,
                predicate: None,
            });
            let compiled = compile(&plan, &shapes()).unwrap();
            assert!(compiled.text.ends_with("LIMIT 2"), "{}", compiled.text);
            assert_eq!(compiled.shape, ResultShape::SingleEntity);
        }
    }

    #[test]
    fn test_last_inverts_explicit_order() {
        let mut plan = person_plan();
        plan.push(QueryOp::OrderBy {
            key: prop("name"),
            descending: false,
        });
        plan.push(QueryOp::Terminal {
            kind: TerminalKind::LastOrDefault,
            predicate: None,
        });
        let compiled = compile(&plan, &shapes()).unwrap();
        assert_eq!(
            compiled.text,
            "MATCH (n:Person) RETURN n ORDER BY n.Name DESC LIMIT 1"
        );
    }

    #[test]
    fn test_last_without_order_falls_back_to_identity() {
        let mut plan = person_plan();
        plan.push(QueryOp::Terminal {
            kind: TerminalKind::Last,
            predicate: None,
        });
        let compiled = compile(&plan, &shapes()).unwrap();
        assert_eq!(
            compiled.text,
            "MATCH (n:Person) RETURN n ORDER BY n.id DESC LIMIT 1"
        );
    }

    #[test]
    fn test_count_reduction() {
        let mut plan = person_plan();
        plan.push(QueryOp::Aggregate {
            kind: AggregateKind::Count,
            selector: None,
        });
        let compiled = compile(&plan, &shapes()).unwrap();
        assert_eq!(compiled.text, "MATCH (n:Person) RETURN count(n)");
        assert_eq!(compiled.shape, ResultShape::Scalar);
    }

    #[test]
    fn test_any_folds_predicate_into_where() {
        let mut plan = person_plan();
        plan.push(QueryOp::Terminal {
            kind: TerminalKind::Any,
            predicate: Some(prop("age").gt(lit(30))),
        });
        let compiled = compile(&plan, &shapes()).unwrap();
        assert_eq!(
            compiled.text,
            "MATCH (n:Person) WHERE (n.Age > $p0) RETURN count(n) > 0"
        );
        assert_eq!(compiled.shape, ResultShape::Boolean);
    }

    #[test]
    fn test_all_counts_violations_of_negated_predicate() {
        let mut plan = person_plan();
        plan.push(QueryOp::Terminal {
            kind: TerminalKind::All,
            predicate: Some(prop("age").ge(lit(18))),
        });
        let compiled = compile(&plan, &shapes()).unwrap();
        assert_eq!(
            compiled.text,
            "MATCH (n:Person) WHERE (NOT (n.Age >= $p0)) RETURN count(n) = 0"
        );
        assert_eq!(compiled.shape, ResultShape::Boolean);
    }

    #[test]
    fn test_distinct_skip_and_limit_render_in_clause_order() {
        let mut plan = person_plan();
        plan.push(QueryOp::Distinct);
        plan.push(QueryOp::Skip(5));
        plan.push(QueryOp::Take(10));
        let compiled = compile(&plan, &shapes()).unwrap();
        assert_eq!(
            compiled.text,
            "MATCH (n:Person) RETURN DISTINCT n SKIP 5 LIMIT 10"
        );
    }

    #[test]
    fn test_sum_without_selector_is_rejected() {
        let mut plan = person_plan();
        plan.push(QueryOp::Aggregate {
            kind: AggregateKind::Sum,
            selector: None,
        });
        assert!(matches!(
            compile(&plan, &shapes()),
            Err(CompileError::UnsupportedOperatorCombination(_))
        ));
    }

    #[test]
    fn test_operators_after_terminal_are_rejected() {
        let mut plan = person_plan();
        plan.push(QueryOp::Terminal {
            kind: TerminalKind::First,
            predicate: None,
        });
        plan.push(QueryOp::Skip(1));
        assert!(matches!(
            compile(&plan, &shapes()),
            Err(CompileError::UnsupportedOperatorCombination(_))
        ));
    }

    #[test]
    fn test_traversal_rebinds_the_current_alias() {
        let mut plan = person_plan();
        let mut step = works_for_step();
        step.target_filter = Some(prop("name").eq(lit("Acme")));
        plan.push(QueryOp::Traverse(step));
        plan.push(QueryOp::Filter(prop("name").ne(lit("Initech"))));
        let compiled = compile(&plan, &shapes()).unwrap();
        assert_eq!(
            compiled.text,
            "MATCH (n:Person)-[r1:WORKS_FOR]->(n1:Company) \
             WHERE (n1.Name = $p0) AND (n1.Name <> $p1) RETURN n1"
        );
    }

    #[test]
    fn test_relationship_filter_uses_the_relationship_alias() {
        let mut plan = person_plan();
        let mut step = works_for_step();
        step.rel_filter = Some(prop("salary").gt(lit(100_000)));
        plan.push(QueryOp::Traverse(step));
        let compiled = compile(&plan, &shapes()).unwrap();
        assert_eq!(
            compiled.text,
            "MATCH (n:Person)-[r1:WORKS_FOR]->(n1:Company) WHERE (r1.Salary > $p0) RETURN n1"
        );
    }

    #[test]
    fn test_path_traversal_returns_tuple_with_endpoint_ids() {
        let mut plan = person_plan();
        plan.push(QueryOp::TraversePath(works_for_step()));
        let compiled = compile(&plan, &shapes()).unwrap();
        assert_eq!(
            compiled.text,
            "MATCH (n:Person)-[r1:WORKS_FOR]->(n1:Company) \
             RETURN n, r1, n1, startNode(r1).id AS __start_id, endNode(r1).id AS __end_id"
        );
        assert_eq!(compiled.shape, ResultShape::PathTuple);
        assert_eq!(compiled.column_for(&ColumnRole::SourceNode), Some("n"));
        assert_eq!(compiled.column_for(&ColumnRole::Relationship), Some("r1"));
        assert_eq!(compiled.column_for(&ColumnRole::TargetNode), Some("n1"));
    }

    #[test]
    fn test_variable_depth_path_binds_a_path_variable() {
        let mut plan = person_plan();
        let mut step = TraversalStep::new("WORKS_FOR", "WorksFor", "Company", "Company", Direction::Outgoing);
        step.depth = crate::query::plan::DepthRange::between(1, 3);
        plan.push(QueryOp::TraversePath(step));
        let compiled = compile(&plan, &shapes()).unwrap();
        assert_eq!(
            compiled.text,
            "MATCH p = (n:Person)-[r1:WORKS_FOR*1..3]->(n1:Company) \
             RETURN nodes(p), relationships(p)"
        );
    }

    #[test]
    fn test_shortest_path_wraps_the_pattern() {
        let mut plan = person_plan();
        let mut step = works_for_step();
        step.depth = crate::query::plan::DepthRange::between(1, 4);
        plan.push(QueryOp::ShortestPath(step));
        let compiled = compile(&plan, &shapes()).unwrap();
        assert_eq!(
            compiled.text,
            "MATCH p = shortestPath((n:Person)-[r1:WORKS_FOR*1..4]->(n1:Company)) \
             RETURN nodes(p), relationships(p)"
        );
    }

    #[test]
    fn test_group_by_rewrites_into_with_and_collect() {
        let mut plan = person_plan();
        plan.push(QueryOp::GroupBy(prop("city")));
        plan.push(QueryOp::Project(vec![
            ("city".to_string(), group_key()),
            ("total".to_string(), agg_count()),
            (
                "oldest".to_string(),
                agg(AggregateKind::Max, Some(prop("age"))),
            ),
        ]));
        let compiled = compile(&plan, &shapes()).unwrap();
        assert_eq!(
            compiled.text,
            "MATCH (n:Person) WITH n.City AS g0, collect(n) AS g1 \
             RETURN g0 AS city, size(g1) AS total, \
             reduce(m = head(g1).Age, x IN g1 | CASE WHEN (x.Age > m) THEN x.Age ELSE m END) AS oldest"
        );
        assert_eq!(compiled.shape, ResultShape::GroupedProjection);
    }

    #[test]
    fn test_group_by_without_projection_is_rejected() {
        let mut plan = person_plan();
        plan.push(QueryOp::GroupBy(prop("city")));
        assert!(matches!(
            compile(&plan, &shapes()),
            Err(CompileError::UnsupportedOperatorCombination(_))
        ));
    }

    #[test]
    fn test_relationship_root_returns_endpoint_ids() {
        let plan = QueryPlan::new(QueryRoot {
            type_name: "WorksFor".to_string(),
            label: "WORKS_FOR".to_string(),
            kind: EntityKind::Relationship,
        });
        let compiled = compile(&plan, &shapes()).unwrap();
        assert_eq!(
            compiled.text,
            "MATCH ()-[r:WORKS_FOR]->() \
             RETURN r, startNode(r).id AS __start_id, endNode(r).id AS __end_id"
        );
        assert_eq!(compiled.column_for(&ColumnRole::StartId), Some("__start_id"));
    }

    #[test]
    fn test_invalid_label_is_rejected() {
        let plan = QueryPlan::new(QueryRoot {
            type_name: "Person".to_string(),
            label: "Person) DETACH DELETE n //".to_string(),
            kind: EntityKind::Node,
        });
        assert!(matches!(
            compile(&plan, &shapes()),
            Err(CompileError::InvalidIdentifier(_))
        ));
    }
}
