use std::fs;

use tempfile::TempDir;
use tessera::{row, Catalog, CatalogOptions, GraphOptions, TesseraError};

fn write_config(dir: &TempDir, text: &str) -> std::path::PathBuf {
    let path = dir.path().join("tessera.toml");
    fs::write(&path, text).expect("write config");
    path
}

#[test]
fn load_reads_every_key() {
    let dir = tempfile::tempdir().expect("tmpdir");
    let path = write_config(
        &dir,
        r#"
max_batch_rows = 500

[graph]
reject_undeclared_fields = true
"#,
    );
    let opts = CatalogOptions::load(&path).expect("load");
    assert_eq!(opts.max_batch_rows, Some(500));
    let strict = GraphOptions::new().reject_undeclared_fields(true);
    assert_eq!(opts.graph, strict);
}

#[test]
fn missing_file_reports_path() {
    let dir = tempfile::tempdir().expect("tmpdir");
    let path = dir.path().join("absent.toml");
    match CatalogOptions::load(&path) {
        Err(TesseraError::Io { path: reported, .. }) => assert_eq!(reported, path),
        other => panic!("expected Io error, got {other:?}"),
    }
}

#[test]
fn malformed_file_is_config_error() {
    let dir = tempfile::tempdir().expect("tmpdir");
    let path = write_config(&dir, "max_batch_rows = \"lots\"\n");
    let err = CatalogOptions::load(&path).unwrap_err();
    assert!(matches!(err, TesseraError::Config(_)));
    assert!(err.to_string().starts_with("invalid configuration"));
}

#[test]
fn loaded_limit_applies_to_inserts() {
    let dir = tempfile::tempdir().expect("tmpdir");
    let path = write_config(&dir, "max_batch_rows = 1\n");
    let mut catalog = Catalog::with_options(CatalogOptions::load(&path).expect("load"));

    let status = catalog.create_vertex_type(
        "Tag",
        vec!["id".into()],
        [("id".to_owned(), tessera::PrimitiveType::Str)]
            .into_iter()
            .collect(),
        vec![
            tessera::BoundConstraint::new(tessera::FieldConstraintKind::Unique, ["id"]),
            tessera::BoundConstraint::new(tessera::FieldConstraintKind::NotNull, ["id"]),
        ],
        1,
    );
    assert!(status.success(), "{status}");
    let status = catalog.create_edge_type(
        "Alias",
        vec!["id".into(), "from".into(), "to".into()],
        ["id", "from", "to"]
            .into_iter()
            .map(|f| (f.to_owned(), tessera::PrimitiveType::Str))
            .collect(),
        vec![
            tessera::BoundConstraint::new(tessera::FieldConstraintKind::Unique, ["id"]),
            tessera::BoundConstraint::new(
                tessera::FieldConstraintKind::NotNull,
                ["id", "from", "to"],
            ),
        ],
        2,
    );
    assert!(status.success(), "{status}");
    let status = catalog.create_graph("tags", "Tag", "Alias", vec![], 3);
    assert!(status.success(), "{status}");

    let two = [row! { "id" => "a" }, row! { "id" => "b" }];
    let status = catalog.insert_graph("tags", Some(&two), None, 4);
    assert_eq!(status.failing_leaves()[0].category(), Some("limit"));
    let status = catalog.insert_graph("tags", Some(&two[..1]), None, 5);
    assert!(status.success(), "{status}");
}
