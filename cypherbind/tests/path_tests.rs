//! Path-shaped query materialization
//!
//! Column identification by compiler-recorded roles, the runtime
//! inspection fallback, and the single-hop versus variable-depth split.

#[path = "testutils/mod.rs"]
mod testutils;

use cypherbind::model::CypherValue;
use cypherbind::query::{lit, prop, DepthRange, Direction};
use cypherbind::{CompileError, GraphError, Row};
use testutils::entities::{company_node, person_node, works_for_rel, Company, Person, WorksFor};
use testutils::scripted_graph;

fn path_row(rel: CypherValue) -> Row {
    Row::from_columns(vec![
        ("n".to_string(), CypherValue::Node(person_node("1", "Ada", 36, None))),
        ("r1".to_string(), rel),
        (
            "n1".to_string(),
            CypherValue::Node(company_node("c1", "Acme", "Manufacturing")),
        ),
        ("__start_id".to_string(), CypherValue::from("1")),
        ("__end_id".to_string(), CypherValue::from("c1")),
    ])
}

#[tokio::test]
async fn test_path_tuple_materializes_source_relationship_target() {
    let (graph, driver) = scripted_graph();
    driver.enqueue(vec![path_row(CypherValue::Relationship(works_for_rel(
        "w1", "1", "c1", "Engineer", 120_000,
    )))]);

    let segments = graph
        .nodes::<Person>()
        .traverse::<WorksFor, Company>(Direction::Outgoing)
        .paths()
        .to_list()
        .await
        .unwrap();

    assert_eq!(
        driver.last_call().text,
        "MATCH (n:Person)-[r1:WORKS_FOR]->(n1:Company) \
         RETURN n, r1, n1, startNode(r1).id AS __start_id, endNode(r1).id AS __end_id"
    );
    assert_eq!(segments.len(), 1);
    assert_eq!(segments[0].source.name, "Ada");
    assert_eq!(segments[0].relationship.position, "Engineer");
    assert_eq!(segments[0].relationship.start_id, "1");
    assert_eq!(segments[0].relationship.end_id, "c1");
    assert_eq!(segments[0].target.name, "Acme");
}

#[tokio::test]
async fn test_single_element_relationship_list_is_accepted() {
    let (graph, driver) = scripted_graph();
    driver.enqueue(vec![path_row(CypherValue::List(vec![
        CypherValue::Relationship(works_for_rel("w1", "1", "c1", "Engineer", 120_000)),
    ]))]);

    let segments = graph
        .nodes::<Person>()
        .traverse::<WorksFor, Company>(Direction::Outgoing)
        .paths()
        .to_list()
        .await
        .unwrap();

    assert_eq!(segments.len(), 1);
    assert_eq!(segments[0].relationship.id, "w1");
}

#[tokio::test]
async fn test_multi_relationship_list_row_is_dropped_not_coerced() {
    let (graph, driver) = scripted_graph();
    driver.enqueue(vec![
        path_row(CypherValue::List(vec![
            CypherValue::Relationship(works_for_rel("w1", "1", "x", "Engineer", 1)),
            CypherValue::Relationship(works_for_rel("w2", "x", "c1", "Manager", 2)),
        ])),
        path_row(CypherValue::Relationship(works_for_rel(
            "w3", "1", "c1", "Director", 3,
        ))),
    ]);

    let segments = graph
        .nodes::<Person>()
        .traverse::<WorksFor, Company>(Direction::Outgoing)
        .paths()
        .to_list()
        .await
        .unwrap();

    // The two-relationship row cannot fit a single-hop tuple; it is
    // dropped and the count mismatch stays observable
    assert_eq!(segments.len(), 1);
    assert_eq!(segments[0].relationship.id, "w3");
}

#[tokio::test]
async fn test_runtime_inspection_identifies_unnamed_columns_in_order() {
    let (graph, driver) = scripted_graph();
    // Column names the compiler never assigned: identification falls back
    // to value types in encounter order
    driver.enqueue(vec![Row::from_columns(vec![
        (
            "col0".to_string(),
            CypherValue::Node(person_node("1", "Ada", 36, None)),
        ),
        (
            "col1".to_string(),
            CypherValue::Relationship(works_for_rel("w1", "1", "c1", "Engineer", 120_000)),
        ),
        (
            "col2".to_string(),
            CypherValue::Node(company_node("c1", "Acme", "Manufacturing")),
        ),
    ])]);

    let segments = graph
        .nodes::<Person>()
        .traverse::<WorksFor, Company>(Direction::Outgoing)
        .paths()
        .to_list()
        .await
        .unwrap();

    assert_eq!(segments.len(), 1);
    assert_eq!(segments[0].source.id, "1");
    assert_eq!(segments[0].target.id, "c1");
    // Without the sibling id columns the endpoints come from the
    // relationship value itself
    assert_eq!(segments[0].relationship.start_id, "1");
    assert_eq!(segments[0].relationship.end_id, "c1");
}

#[tokio::test]
async fn test_typed_tuples_reject_variable_depth() {
    let (graph, driver) = scripted_graph();

    let result = graph
        .nodes::<Person>()
        .traverse::<WorksFor, Company>(Direction::Outgoing)
        .with_depth(DepthRange::between(1, 3))
        .paths()
        .to_list()
        .await;

    assert!(matches!(
        result,
        Err(GraphError::Compile(
            CompileError::UnsupportedOperatorCombination(_)
        ))
    ));
    assert!(driver.calls().is_empty());
}

#[tokio::test]
async fn test_variable_depth_paths_keep_every_relationship() {
    let (graph, driver) = scripted_graph();
    driver.enqueue(vec![Row::from_columns(vec![
        (
            "nodes(p)".to_string(),
            CypherValue::List(vec![
                CypherValue::Node(person_node("1", "Ada", 36, None)),
                CypherValue::Node(person_node("2", "Bela", 41, None)),
                CypherValue::Node(person_node("3", "Cleo", 29, None)),
            ]),
        ),
        (
            "relationships(p)".to_string(),
            CypherValue::List(vec![
                CypherValue::Relationship(works_for_rel("w1", "1", "2", "a", 1)),
                CypherValue::Relationship(works_for_rel("w2", "2", "3", "b", 2)),
            ]),
        ),
    ])]);

    let paths = graph
        .nodes::<Person>()
        .traverse::<WorksFor, Person>(Direction::Outgoing)
        .with_depth(DepthRange::between(1, 3))
        .paths()
        .to_paths()
        .await
        .unwrap();

    assert_eq!(
        driver.last_call().text,
        "MATCH p = (n:Person)-[r1:WORKS_FOR*1..3]->(n1:Person) \
         RETURN nodes(p), relationships(p)"
    );
    assert_eq!(paths.len(), 1);
    assert_eq!(paths[0].length(), 2);
    assert_eq!(paths[0].start().id, "1");
    assert_eq!(paths[0].end().id, "3");
    assert_eq!(paths[0].relationships()[1].id, "w2");
}

#[tokio::test]
async fn test_mismatched_path_sequences_are_dropped() {
    let (graph, driver) = scripted_graph();
    // Three nodes but zero relationships violates the path invariant
    driver.enqueue(vec![Row::from_columns(vec![
        (
            "nodes(p)".to_string(),
            CypherValue::List(vec![
                CypherValue::Node(person_node("1", "Ada", 36, None)),
                CypherValue::Node(person_node("2", "Bela", 41, None)),
                CypherValue::Node(person_node("3", "Cleo", 29, None)),
            ]),
        ),
        ("relationships(p)".to_string(), CypherValue::List(vec![])),
    ])]);

    let paths = graph
        .nodes::<Person>()
        .traverse::<WorksFor, Person>(Direction::Outgoing)
        .with_depth(DepthRange::between(1, 3))
        .paths()
        .to_paths()
        .await
        .unwrap();

    assert!(paths.is_empty());
}

#[tokio::test]
async fn test_shortest_path_query() {
    let (graph, driver) = scripted_graph();
    driver.enqueue(vec![Row::from_columns(vec![
        (
            "nodes(p)".to_string(),
            CypherValue::List(vec![
                CypherValue::Node(person_node("1", "Ada", 36, None)),
                CypherValue::Node(person_node("2", "Bela", 41, None)),
            ]),
        ),
        (
            "relationships(p)".to_string(),
            CypherValue::List(vec![CypherValue::Relationship(works_for_rel(
                "w1", "1", "2", "a", 1,
            ))]),
        ),
    ])]);

    let paths = graph
        .nodes::<Person>()
        .where_(prop("name").eq(lit("Ada")))
        .traverse::<WorksFor, Person>(Direction::Outgoing)
        .with_depth(DepthRange::between(1, 4))
        .shortest_paths()
        .to_list()
        .await
        .unwrap();

    assert_eq!(
        driver.last_call().text,
        "MATCH p = shortestPath((n:Person)-[r1:WORKS_FOR*1..4]->(n1:Person)) \
         WHERE (n.Name = $p0) RETURN nodes(p), relationships(p)"
    );
    assert_eq!(paths.len(), 1);
    assert_eq!(paths[0].length(), 1);
}
