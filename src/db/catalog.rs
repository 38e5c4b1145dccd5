use std::collections::BTreeMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{info, warn};

use crate::constraints::{BoundConstraint, TopologyConstraint};
use crate::primitives::{PrimitiveType, Row};
use crate::schema::{Schema, SchemaKind};
use crate::status::{FailureKind, Status};
use crate::storage::Graph;

use super::config::CatalogOptions;

/// Catalog behind a reader-writer lock. Inserts take the write lock, so
/// readers never observe a pending batch.
pub type SharedCatalog = Arc<RwLock<Catalog>>;

/// Object registered under a catalog name.
#[derive(Debug)]
pub enum CatalogEntry {
    /// Validated vertex type.
    VertexType(Arc<Schema>),
    /// Validated edge type.
    EdgeType(Arc<Schema>),
    /// Graph with its stores.
    Graph(Graph),
}

impl CatalogEntry {
    /// Human-readable object kind used in diagnostics.
    pub fn kind_label(&self) -> &'static str {
        match self {
            CatalogEntry::VertexType(_) => "vertex type",
            CatalogEntry::EdgeType(_) => "edge type",
            CatalogEntry::Graph(_) => "graph",
        }
    }
}

/// Namespace of vertex types, edge types, and graphs.
///
/// One name maps to at most one object regardless of its kind. Every
/// operation returns a derived status whose context carries the object name
/// and the statement line number it was issued from; the catalog changes
/// only when that status is successful.
#[derive(Debug, Default)]
pub struct Catalog {
    objects: BTreeMap<String, CatalogEntry>,
    options: CatalogOptions,
}

impl Catalog {
    /// Empty catalog with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty catalog with explicit options.
    pub fn with_options(options: CatalogOptions) -> Self {
        Self {
            objects: BTreeMap::new(),
            options,
        }
    }

    /// Active options.
    pub fn options(&self) -> &CatalogOptions {
        &self.options
    }

    /// Wraps the catalog for shared use.
    pub fn into_shared(self) -> SharedCatalog {
        Arc::new(RwLock::new(self))
    }

    /// Registers a vertex type after validating it against empty columns.
    pub fn create_vertex_type(
        &mut self,
        name: &str,
        fields: Vec<String>,
        types: BTreeMap<String, PrimitiveType>,
        constraints: Vec<BoundConstraint>,
        lineno: usize,
    ) -> Status {
        self.create_type(Schema::vertex(name, fields, types, constraints), lineno)
    }

    /// Registers an edge type after validating it against empty columns.
    pub fn create_edge_type(
        &mut self,
        name: &str,
        fields: Vec<String>,
        types: BTreeMap<String, PrimitiveType>,
        constraints: Vec<BoundConstraint>,
        lineno: usize,
    ) -> Status {
        self.create_type(Schema::edge(name, fields, types, constraints), lineno)
    }

    fn create_type(&mut self, schema: Schema, lineno: usize) -> Status {
        let kind = schema.kind();
        let operation = match kind {
            SchemaKind::Vertex => "CREATE VERTEX",
            SchemaKind::Edge => "CREATE EDGE",
        };
        let checks = vec![
            self.name_available(schema.name()),
            schema.check(&schema.empty_columns(), None),
        ];
        let status = outcome(operation, schema.name(), lineno, checks);
        if !status.success() {
            warn!(name = schema.name(), kind = %kind, lineno, "catalog.type.rejected");
            return status;
        }

        let name = schema.name().to_owned();
        info!(
            name = %name,
            kind = %kind,
            fields = schema.fields().len(),
            lineno,
            "catalog.type.created"
        );
        let schema = Arc::new(schema);
        let entry = match kind {
            SchemaKind::Vertex => CatalogEntry::VertexType(schema),
            SchemaKind::Edge => CatalogEntry::EdgeType(schema),
        };
        self.objects.insert(name, entry);
        status
    }

    /// Creates an empty graph over an existing vertex type and edge type.
    pub fn create_graph(
        &mut self,
        name: &str,
        vertex_type: &str,
        edge_type: &str,
        constraints: Vec<TopologyConstraint>,
        lineno: usize,
    ) -> Status {
        let (vertex_check, vertex_schema) = self.resolve_type(vertex_type, SchemaKind::Vertex);
        let (edge_check, edge_schema) = self.resolve_type(edge_type, SchemaKind::Edge);
        let status = outcome(
            "CREATE GRAPH",
            name,
            lineno,
            vec![self.name_available(name), vertex_check, edge_check],
        );
        match (status.success(), vertex_schema, edge_schema) {
            (true, Some(vertex_schema), Some(edge_schema)) => {
                let graph = Graph::with_options(
                    name,
                    vertex_schema,
                    edge_schema,
                    constraints,
                    self.options.graph,
                );
                info!(
                    graph = name,
                    vertex_type,
                    edge_type,
                    constraints = graph.constraints().len(),
                    lineno,
                    "catalog.graph.created"
                );
                self.objects
                    .insert(name.to_owned(), CatalogEntry::Graph(graph));
            }
            _ => warn!(graph = name, lineno, "catalog.graph.rejected"),
        }
        status
    }

    /// Inserts a batch into a graph. A missing side counts as an empty batch.
    ///
    /// The graph must exist and the batch must fit `max_batch_rows`; both are
    /// checked before the graph is touched.
    pub fn insert_graph(
        &mut self,
        name: &str,
        vertices: Option<&[Row]>,
        edges: Option<&[Row]>,
        lineno: usize,
    ) -> Status {
        let vertices = vertices.unwrap_or_default();
        let edges = edges.unwrap_or_default();
        let mut checks = Vec::with_capacity(3);
        checks.push(self.graph_check(name));
        if let Some(limit) = self.options.max_batch_rows {
            let rows = vertices.len() + edges.len();
            checks.push(
                Status::verdict(
                    FailureKind::Limit,
                    "Batch within row limit",
                    "Batch exceeds row limit",
                    rows <= limit,
                )
                .with_context("rows", rows)
                .with_context("max_batch_rows", limit),
            );
        }
        if checks.iter().all(Status::success) {
            if let Some(CatalogEntry::Graph(graph)) = self.objects.get_mut(name) {
                checks.push(graph.insert(vertices, edges));
            }
        }
        let status = outcome("INSERT", name, lineno, checks);
        if !status.success() {
            warn!(graph = name, lineno, "catalog.insert.rejected");
        }
        status
    }

    /// Removes an object. A type still used by a graph is kept and each
    /// such graph is reported as a dependency failure.
    pub fn drop(&mut self, name: &str, lineno: usize) -> Status {
        let entry = self.objects.get(name);
        let mut checks = vec![Status::verdict(
            FailureKind::Naming,
            "Object exists",
            "Object does not exist",
            entry.is_some(),
        )
        .with_context("name", name)];
        if let Some(CatalogEntry::VertexType(schema) | CatalogEntry::EdgeType(schema)) = entry {
            let dependents: Vec<&str> = self
                .graphs()
                .filter(|(_, graph)| uses(graph, schema))
                .map(|(graph_name, _)| graph_name)
                .collect();
            if dependents.is_empty() {
                checks.push(Status::leaf("No dependent graphs", "", true));
            }
            checks.extend(dependents.into_iter().map(|graph_name| {
                Status::failure(FailureKind::Dependency, "Type is used by a graph")
                    .with_context("graph", graph_name)
            }));
        }

        let status = outcome("DROP", name, lineno, checks);
        if status.success() {
            if let Some(removed) = self.objects.remove(name) {
                info!(
                    name,
                    kind = removed.kind_label(),
                    lineno,
                    "catalog.object.dropped"
                );
            }
        } else {
            warn!(name, lineno, "catalog.drop.rejected");
        }
        status
    }

    /// Every registered name, sorted.
    pub fn names(&self) -> Vec<&str> {
        self.objects.keys().map(String::as_str).collect()
    }

    /// Whether `name` is taken.
    pub fn contains(&self, name: &str) -> bool {
        self.objects.contains_key(name)
    }

    /// Number of registered objects.
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Whether the catalog is empty.
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Object registered under `name`.
    pub fn get(&self, name: &str) -> Option<&CatalogEntry> {
        self.objects.get(name)
    }

    /// Graph registered under `name`.
    pub fn graph(&self, name: &str) -> Option<&Graph> {
        match self.objects.get(name) {
            Some(CatalogEntry::Graph(graph)) => Some(graph),
            _ => None,
        }
    }

    /// Vertex type registered under `name`.
    pub fn vertex_type(&self, name: &str) -> Option<&Arc<Schema>> {
        match self.objects.get(name) {
            Some(CatalogEntry::VertexType(schema)) => Some(schema),
            _ => None,
        }
    }

    /// Edge type registered under `name`.
    pub fn edge_type(&self, name: &str) -> Option<&Arc<Schema>> {
        match self.objects.get(name) {
            Some(CatalogEntry::EdgeType(schema)) => Some(schema),
            _ => None,
        }
    }

    fn graphs(&self) -> impl Iterator<Item = (&str, &Graph)> + '_ {
        self.objects.iter().filter_map(|(name, entry)| match entry {
            CatalogEntry::Graph(graph) => Some((name.as_str(), graph)),
            _ => None,
        })
    }

    fn name_available(&self, name: &str) -> Status {
        let taken = self.objects.get(name);
        let status = Status::verdict(
            FailureKind::Naming,
            "Name available",
            "Name already in use",
            taken.is_none(),
        )
        .with_context("name", name);
        match taken {
            Some(entry) => status.with_context("existing", entry.kind_label()),
            None => status,
        }
    }

    fn resolve_type(&self, name: &str, kind: SchemaKind) -> (Status, Option<Arc<Schema>>) {
        let entry = self.objects.get(name);
        let schema = match (kind, entry) {
            (SchemaKind::Vertex, Some(CatalogEntry::VertexType(schema)))
            | (SchemaKind::Edge, Some(CatalogEntry::EdgeType(schema))) => Some(Arc::clone(schema)),
            _ => None,
        };
        let failed = match entry {
            None => format!("No such {kind} type"),
            Some(other) => format!("Name refers to a {}, not a {kind} type", other.kind_label()),
        };
        let status = Status::verdict(
            FailureKind::Naming,
            format!("Found {kind} type"),
            failed,
            schema.is_some(),
        )
        .with_context("name", name);
        (status, schema)
    }

    fn graph_check(&self, name: &str) -> Status {
        let entry = self.objects.get(name);
        let failed = match entry {
            None => "Graph does not exist".to_owned(),
            Some(other) => format!("Name refers to a {}, not a graph", other.kind_label()),
        };
        Status::verdict(
            FailureKind::Naming,
            "Graph found",
            failed,
            matches!(entry, Some(CatalogEntry::Graph(_))),
        )
        .with_context("name", name)
    }
}

fn uses(graph: &Graph, schema: &Arc<Schema>) -> bool {
    Arc::ptr_eq(graph.vertex_store().schema(), schema)
        || Arc::ptr_eq(graph.edge_store().schema(), schema)
}

fn outcome(operation: &str, name: &str, lineno: usize, checks: Vec<Status>) -> Status {
    Status::derived(
        format!("{operation} Successful"),
        format!("{operation} Failed"),
        checks,
    )
    .with_context("object", name)
    .with_context("lineno", lineno)
}
