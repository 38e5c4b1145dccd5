#![allow(clippy::useless_vec)]

use std::collections::BTreeMap;
use std::sync::Arc;

use tessera::{
    row, BoundConstraint, Columns, FieldConstraintKind, Graph, PrimitiveType, PrimitiveValue, Row,
    Schema, TesseraError, TopologyConstraint,
};

fn schemas() -> (Arc<Schema>, Arc<Schema>) {
    let vertex = Schema::vertex(
        "Account",
        vec!["id".into(), "owner".into(), "balance".into()],
        BTreeMap::from([
            ("id".to_owned(), PrimitiveType::Int),
            ("owner".to_owned(), PrimitiveType::Str),
            ("balance".to_owned(), PrimitiveType::Float),
        ]),
        vec![
            BoundConstraint::new(FieldConstraintKind::Unique, ["id"]),
            BoundConstraint::new(FieldConstraintKind::NotNull, ["id", "owner"]),
        ],
    );
    let edge = Schema::edge(
        "Transfer",
        vec!["id".into(), "from".into(), "to".into(), "weight".into()],
        BTreeMap::from([
            ("id".to_owned(), PrimitiveType::Str),
            ("from".to_owned(), PrimitiveType::Int),
            ("to".to_owned(), PrimitiveType::Int),
            ("weight".to_owned(), PrimitiveType::Float),
        ]),
        vec![
            BoundConstraint::new(FieldConstraintKind::Unique, ["id"]),
            BoundConstraint::new(FieldConstraintKind::NotNull, ["id", "from", "to"]),
        ],
    );
    (Arc::new(vertex), Arc::new(edge))
}

fn ledger() -> Graph {
    let (vertex, edge) = schemas();
    Graph::new(
        "ledger",
        vertex,
        edge,
        vec![TopologyConstraint::Weighted, TopologyConstraint::Simple],
    )
}

fn account(id: i64, owner: &str) -> Row {
    row! { "id" => id, "owner" => owner, "balance" => 0.0 }
}

fn transfer(id: &str, from: i64, to: i64, amount: f64) -> Row {
    row! { "id" => id, "from" => from, "to" => to, "weight" => amount }
}

#[derive(Debug, PartialEq)]
struct State {
    vertex_columns: Columns,
    vertex_ids: Vec<PrimitiveValue>,
    edge_columns: Columns,
    edge_ids: Vec<PrimitiveValue>,
    vertex_rows: Vec<Row>,
    edge_rows: Vec<Row>,
    adjacency_edges: usize,
}

fn state(graph: &Graph) -> State {
    State {
        vertex_columns: graph.vertex_store().columns().clone(),
        vertex_ids: graph.vertex_store().ids().to_vec(),
        edge_columns: graph.edge_store().columns().clone(),
        edge_ids: graph.edge_store().ids().to_vec(),
        vertex_rows: graph.vertices_list().into_iter().cloned().collect(),
        edge_rows: graph.edges_list().into_iter().cloned().collect(),
        adjacency_edges: graph.adjacency().edge_count(),
    }
}

fn seeded() -> Graph {
    let mut graph = ledger();
    let status = graph.insert(
        &[account(1, "ada"), account(2, "bob"), account(3, "cy")],
        &[transfer("t1", 1, 2, 10.0)],
    );
    assert!(status.success(), "{status}");
    graph
}

#[test]
fn commit_grows_every_store_by_batch_size() {
    let mut graph = seeded();
    let before = state(&graph);
    let transfers = [transfer("t2", 4, 1, 1.5), transfer("t3", 2, 3, 2.0)];
    let status = graph.insert(&[account(4, "dee")], &transfers);
    assert!(status.success(), "{status}");

    let after = state(&graph);
    assert_eq!(after.vertex_ids.len(), before.vertex_ids.len() + 1);
    assert_eq!(after.edge_ids.len(), before.edge_ids.len() + 2);
    assert_eq!(after.adjacency_edges, before.adjacency_edges + 2);
    for column in after.vertex_columns.values() {
        assert_eq!(column.len(), after.vertex_ids.len());
    }
    let outgoing = graph.outgoing_edges(&PrimitiveValue::Int(4));
    assert_eq!(outgoing.map(<[Row]>::len), Some(1));
}

#[test]
fn value_failure_in_vertices_restores_exact_state() {
    let mut graph = seeded();
    let before = state(&graph);
    let bad = row! { "id" => 5, "balance" => 3.0 };
    let status = graph.insert(&[account(4, "dee"), bad], &[transfer("t2", 4, 1, 1.0)]);
    assert!(!status.success());
    assert_eq!(state(&graph), before);
}

#[test]
fn duplicate_id_against_committed_rows_is_caught() {
    let mut graph = seeded();
    let before = state(&graph);
    let status = graph.insert(&[account(2, "imposter")], &[]);
    assert!(!status.success());
    let leaf = status.failing_leaves()[0];
    assert_eq!(
        leaf.get_context("constraint"),
        Some(&serde_json::json!("UNIQUE"))
    );
    assert_eq!(
        leaf.get_context("violating_fields"),
        Some(&serde_json::json!(["id"]))
    );
    assert_eq!(state(&graph), before);
}

#[test]
fn topology_failure_rolls_back_valid_rows() {
    let mut graph = seeded();
    let before = state(&graph);
    // A second 1 -> 2 transfer breaks SIMPLE even though every row is valid.
    let status = graph.insert(&[account(9, "eve")], &[transfer("t9", 1, 2, 4.0)]);
    assert!(!status.success());
    assert!(status.children()[0].success());
    assert!(status.children()[1].success());
    assert!(!status.children()[2].success());
    assert_eq!(state(&graph), before);
    assert!(graph.vertex(&PrimitiveValue::Int(9)).is_none());
}

#[test]
fn rejected_batch_can_be_retried_after_fix() {
    let mut graph = seeded();
    let status = graph.insert(&[account(4, "dee")], &[transfer("t2", 4, 8, 1.0)]);
    assert!(!status.success());
    let status = graph.insert(&[account(4, "dee")], &[transfer("t2", 4, 3, 1.0)]);
    assert!(status.success(), "{status}");
    assert!(graph.has_edge(&PrimitiveValue::Int(4), &PrimitiveValue::Int(3)));
}

#[test]
fn empty_batch_commits_nothing() {
    let mut graph = seeded();
    let before = state(&graph);
    assert!(graph.insert(&[], &[]).success());
    assert_eq!(state(&graph), before);
}

fn mismatch_pending(err: TesseraError) -> Option<usize> {
    match err {
        TesseraError::RollbackMismatch { pending, .. } => pending,
        other => panic!("expected rollback mismatch, got {other}"),
    }
}

#[test]
fn rollback_requires_pending_batch() {
    let (vertex, _) = schemas();
    let mut store = tessera::RowStore::new(vertex);
    let err = store.rollback(&[account(1, "ada")]).unwrap_err();
    assert_eq!(mismatch_pending(err), None);

    let status = store.insert(&[account(1, "ada"), account(1, "bob")]);
    assert!(!status.success());
    let err = store.rollback(&[account(1, "ada")]).unwrap_err();
    assert!(err.to_string().starts_with("rollback of 1 rows"));
    assert_eq!(mismatch_pending(err), Some(2));
    store
        .rollback(&[account(1, "ada"), account(1, "bob")])
        .unwrap();
    assert!(store.column("id").unwrap().is_empty());
    assert!(store.is_empty());
}
