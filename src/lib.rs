//! Tessera: an embeddable store for schema-typed graphs.
//!
//! Vertex and edge types declare typed fields and bind field-level
//! constraints; graphs add topology constraints on top. Every mutation is a
//! single atomic batch insert that either commits or leaves the graph
//! untouched, and every call reports what it checked as a [`Status`] tree.
//!
//! ```
//! use std::collections::BTreeMap;
//! use tessera::{row, BoundConstraint, Catalog, FieldConstraintKind, PrimitiveType};
//!
//! let ints = |names: &[&str]| -> BTreeMap<String, PrimitiveType> {
//!     names.iter().map(|n| (n.to_string(), PrimitiveType::Int)).collect()
//! };
//! let rules = |fields: &[&str]| {
//!     vec![
//!         BoundConstraint::new(FieldConstraintKind::Unique, ["id"]),
//!         BoundConstraint::new(FieldConstraintKind::NotNull, fields.iter().copied()),
//!     ]
//! };
//!
//! let mut catalog = Catalog::new();
//! let node: &[&str] = &["id"];
//! let link: &[&str] = &["id", "from", "to"];
//! let names = |f: &[&str]| f.iter().map(|n| n.to_string()).collect::<Vec<_>>();
//! assert!(catalog.create_vertex_type("Node", names(node), ints(node), rules(node), 1).success());
//! assert!(catalog.create_edge_type("Link", names(link), ints(link), rules(link), 2).success());
//! assert!(catalog.create_graph("g", "Node", "Link", vec![], 3).success());
//!
//! let vertices = [row! { "id" => 1 }, row! { "id" => 2 }];
//! let edges = [row! { "id" => 1, "from" => 1, "to" => 3 }];
//! let status = catalog.insert_graph("g", Some(&vertices), Some(&edges), 4);
//! assert!(!status.success());
//! assert!(catalog.graph("g").unwrap().vertices_list().is_empty());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod constraints;
pub mod db;
pub mod error;
pub mod logging;
pub mod primitives;
pub mod schema;
pub mod status;
pub mod storage;

pub use constraints::{BoundConstraint, FieldConstraintKind, Locality, TopologyConstraint};
pub use db::{Catalog, CatalogEntry, CatalogOptions, SharedCatalog};
pub use error::{Result, TesseraError};
pub use logging::init_logging;
pub use primitives::{Columns, PrimitiveType, PrimitiveValue, Row};
pub use schema::{Schema, SchemaKind};
pub use status::{FailureKind, Status};
pub use storage::{AdjacencyIndex, Graph, GraphOptions, RowStore};
