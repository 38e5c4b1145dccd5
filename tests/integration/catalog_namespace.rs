use std::collections::BTreeMap;

use tessera::{
    row, BoundConstraint, Catalog, CatalogEntry, FieldConstraintKind, PrimitiveType, PrimitiveValue,
    Status, TopologyConstraint,
};

fn strings(names: &[&str]) -> Vec<String> {
    names.iter().map(|&n| n.to_owned()).collect()
}

fn all_str(names: &[&str]) -> BTreeMap<String, PrimitiveType> {
    names
        .iter()
        .map(|&n| (n.to_owned(), PrimitiveType::Str))
        .collect()
}

fn not_null_unique(not_null: &[&str]) -> Vec<BoundConstraint> {
    vec![
        BoundConstraint::new(FieldConstraintKind::Unique, ["id"]),
        BoundConstraint::new(FieldConstraintKind::NotNull, not_null.iter().copied()),
    ]
}

/// Statements a frontend would emit for a small course catalog, one per line.
fn school() -> (Catalog, Vec<Status>) {
    let mut catalog = Catalog::new();
    let statuses = vec![
        catalog.create_vertex_type(
            "Course",
            strings(&["id", "title"]),
            all_str(&["id", "title"]),
            not_null_unique(&["id", "title"]),
            1,
        ),
        catalog.create_edge_type(
            "Requires",
            strings(&["id", "from", "to"]),
            all_str(&["id", "from", "to"]),
            not_null_unique(&["id", "from", "to"]),
            2,
        ),
        catalog.create_graph(
            "curriculum",
            "Course",
            "Requires",
            vec![TopologyConstraint::Acyclic, TopologyConstraint::Simple],
            3,
        ),
    ];
    (catalog, statuses)
}

#[test]
fn statements_build_the_namespace() {
    let (catalog, statuses) = school();
    for (line, status) in statuses.iter().enumerate() {
        assert!(status.success(), "{status}");
        assert_eq!(
            status.get_context("lineno"),
            Some(&serde_json::json!(line + 1))
        );
    }
    assert_eq!(catalog.names(), vec!["Course", "Requires", "curriculum"]);
    assert!(matches!(catalog.get("Course"), Some(CatalogEntry::VertexType(_))));
    assert!(matches!(catalog.get("Requires"), Some(CatalogEntry::EdgeType(_))));
    assert_eq!(
        catalog.graph("curriculum").map(|g| g.constraints().len()),
        Some(3)
    );
}

#[test]
fn duplicate_names_rejected_for_every_kind() {
    let (mut catalog, _) = school();
    let attempts = [
        catalog.create_vertex_type(
            "curriculum",
            strings(&["id"]),
            all_str(&["id"]),
            not_null_unique(&["id"]),
            4,
        ),
        catalog.create_edge_type(
            "Course",
            strings(&["id", "from", "to"]),
            all_str(&["id", "from", "to"]),
            not_null_unique(&["id", "from", "to"]),
            5,
        ),
        catalog.create_graph("Requires", "Course", "Requires", vec![], 6),
    ];
    for status in &attempts {
        assert!(!status.success());
        assert_eq!(status.failing_leaves()[0].category(), Some("naming"));
    }
    assert_eq!(catalog.len(), 3);
}

#[test]
fn insert_reports_every_cause() {
    let (mut catalog, _) = school();
    let courses = [
        row! { "id" => "cs101", "title" => "Intro" },
        row! { "id" => "cs201", "title" => "Data Structures" },
    ];
    let prereqs = [row! { "id" => "r1", "from" => "cs201", "to" => "cs101" }];
    let status = catalog.insert_graph("curriculum", Some(&courses), Some(&prereqs), 7);
    assert!(status.success(), "{status}");

    let more = [
        row! { "id" => "cs301" },
        row! { "id" => "cs302", "title" => 302 },
    ];
    let loops = [row! { "id" => "r2", "from" => "cs101", "to" => "cs201" }];
    let status = catalog.insert_graph("curriculum", Some(&more), Some(&loops), 8);
    assert!(!status.success());
    assert_eq!(status.message(), "INSERT Failed");

    let mut causes: Vec<String> = status
        .failing_leaves()
        .iter()
        .filter_map(|leaf| leaf.get_context("constraint")?.as_str().map(str::to_owned))
        .collect();
    causes.sort();
    assert_eq!(causes, vec!["ACYCLIC", "CHECKTYPE_STR", "NOTNULL"]);

    let rendered = status.to_string();
    assert!(rendered.starts_with("ERROR: INSERT Failed"));
    assert!(rendered.contains("Causes:"));
    assert!(rendered.contains("ACYCLIC"));
    assert!(!rendered.contains("REFERENTIAL_INTEGRITY"));
    assert!(status.render_full().contains("REFERENTIAL_INTEGRITY"));

    let graph = catalog.graph("curriculum").unwrap();
    assert_eq!(graph.vertices_list().len(), 2);
    assert!(graph.vertex(&PrimitiveValue::from("cs301")).is_none());
}

#[test]
fn drop_order_follows_dependencies() {
    let (mut catalog, _) = school();
    assert!(!catalog.drop("Requires", 9).success());
    assert!(!catalog.drop("Course", 10).success());
    assert!(catalog.drop("curriculum", 11).success());
    assert!(catalog.drop("Requires", 12).success());
    assert!(catalog.drop("Course", 13).success());
    assert!(catalog.names().is_empty());

    // Names are free again.
    let (_, statuses) = school();
    assert!(statuses.iter().all(Status::success));
}

#[test]
fn status_tree_serializes_for_diagnostics() {
    let (mut catalog, _) = school();
    let status = catalog.insert_graph("nowhere", None, None, 14);
    let json = serde_json::to_value(&status).unwrap();
    assert_eq!(json["node"], "derived");
    assert_eq!(json["context"]["lineno"], 14);
    assert_eq!(json["children"][0]["context"]["category"], "naming");
}
