use std::sync::Arc;

use tracing::{debug, error, warn};

use crate::constraints::{GraphView, TopologyConstraint};
use crate::primitives::{row_to_json, PrimitiveValue, Row};
use crate::schema::{Schema, FROM, ID, TO};
use crate::status::{FailureKind, Status};

use super::adjacency::AdjacencyIndex;
use super::options::GraphOptions;
use super::rows::RowStore;


const NO_VALUES: &[PrimitiveValue] = &[];

/// A named graph: vertex store, edge store, adjacency index, and topology
/// constraints.
///
/// [`Graph::insert`] is the only mutation. It either commits every vertex,
/// edge, and index entry of the batch or leaves the graph exactly as it was.
/// `REFERENTIAL_INTEGRITY` is always part of the constraint list.
#[derive(Debug)]
pub struct Graph {
    name: String,
    vertices: RowStore,
    edges: RowStore,
    adjacency: AdjacencyIndex,
    constraints: Vec<TopologyConstraint>,
}

impl Graph {
    /// Creates an empty graph with default options.
    pub fn new(
        name: impl Into<String>,
        vertex_type: Arc<Schema>,
        edge_type: Arc<Schema>,
        constraints: Vec<TopologyConstraint>,
    ) -> Self {
        Self::with_options(
            name,
            vertex_type,
            edge_type,
            constraints,
            GraphOptions::default(),
        )
    }

    /// Creates an empty graph. Repeated constraints are kept once.
    pub fn with_options(
        name: impl Into<String>,
        vertex_type: Arc<Schema>,
        edge_type: Arc<Schema>,
        constraints: Vec<TopologyConstraint>,
        options: GraphOptions,
    ) -> Self {
        let mut deduped = Vec::with_capacity(constraints.len() + 1);
        for constraint in constraints {
            if !deduped.contains(&constraint) {
                deduped.push(constraint);
            }
        }
        if !deduped.contains(&TopologyConstraint::ReferentialIntegrity) {
            deduped.push(TopologyConstraint::ReferentialIntegrity);
        }
        Self {
            name: name.into(),
            vertices: RowStore::with_options(vertex_type, options),
            edges: RowStore::with_options(edge_type, options),
            adjacency: AdjacencyIndex::new(),
            constraints: deduped,
        }
    }

    /// Graph name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Topology constraints, `REFERENTIAL_INTEGRITY` included.
    pub fn constraints(&self) -> &[TopologyConstraint] {
        &self.constraints
    }

    /// Vertex row store.
    pub fn vertex_store(&self) -> &RowStore {
        &self.vertices
    }

    /// Edge row store.
    pub fn edge_store(&self) -> &RowStore {
        &self.edges
    }

    /// Adjacency index over committed edges.
    pub fn adjacency(&self) -> &AdjacencyIndex {
        &self.adjacency
    }

    /// Inserts a batch of vertices and edges atomically.
    ///
    /// Vertices are appended first, then edges, then every topology
    /// constraint runs once over the combined state, so an edge may reference
    /// a vertex from the same batch. The returned node has three children:
    /// vertex insert, edge insert, topology check. If any fails, the edge
    /// store and then the vertex store are rolled back and the adjacency index
    /// is left alone; otherwise the index records the batch.
    pub fn insert(&mut self, vertices: &[Row], edges: &[Row]) -> Status {
        debug!(
            graph = %self.name,
            vertices = vertices.len(),
            edges = edges.len(),
            "graph.insert.begin"
        );
        let vertex_status = self.vertices.insert(vertices);
        let edge_status = self.edges.insert(edges);
        let topology_status = self.check_constraints();
        let status = Status::derived(
            "Graph updated",
            "Graph unchanged: insert rolled back",
            vec![vertex_status, edge_status, topology_status],
        )
        .with_context("graph", self.name.as_str());

        if status.success() {
            self.vertices.settle();
            self.edges.settle();
            self.adjacency.record_vertices(vertices);
            self.adjacency.record_edges(edges);
            debug!(graph = %self.name, "graph.insert.committed");
        } else {
            if let Err(err) = self.edges.rollback(edges) {
                error!(graph = %self.name, error = %err, "graph.insert.edge_rollback_failed");
            }
            if let Err(err) = self.vertices.rollback(vertices) {
                error!(graph = %self.name, error = %err, "graph.insert.vertex_rollback_failed");
            }
            warn!(
                graph = %self.name,
                violations = status.failing_leaves().len(),
                "graph.insert.rolled_back"
            );
        }
        status
    }

    /// Evaluates every topology constraint against the current columns,
    /// pending rows included.
    pub fn check_constraints(&self) -> Status {
        let view = self.view();
        let checks = self
            .constraints
            .iter()
            .map(|constraint| constraint.check(&view))
            .collect();
        Status::derived(
            "Graph constraints satisfied",
            "Graph constraints violated",
            checks,
        )
        .with_context("graph", self.name.as_str())
    }

    fn view(&self) -> GraphView<'_> {
        GraphView::new(
            self.vertices.column(ID).unwrap_or(NO_VALUES),
            self.edges.column(FROM).unwrap_or(NO_VALUES),
            self.edges.column(TO).unwrap_or(NO_VALUES),
            self.edges.schema().is_weighted(),
        )
    }

    /// Committed vertex rows in insertion order.
    pub fn vertices_list(&self) -> Vec<&Row> {
        self.vertices.entries().collect()
    }

    /// Committed edge rows in insertion order.
    pub fn edges_list(&self) -> Vec<&Row> {
        self.edges.entries().collect()
    }

    /// Committed vertex with the given id.
    pub fn vertex(&self, id: &PrimitiveValue) -> Option<&Row> {
        self.vertices.entry(id)
    }

    /// Outgoing edges of `id`, `None` if `id` is not a committed vertex.
    pub fn outgoing_edges(&self, id: &PrimitiveValue) -> Option<&[Row]> {
        self.adjacency.outgoing_edges(id)
    }

    /// Vertices reached by the outgoing edges of `id`, one per edge.
    pub fn neighbors(&self, id: &PrimitiveValue) -> Option<Vec<&Row>> {
        self.adjacency
            .neighbors(id)
            .map(|targets| targets.filter_map(|to| self.vertices.entry(to)).collect())
    }

    /// Whether some edge runs from `from` to `to`.
    pub fn has_edge(&self, from: &PrimitiveValue, to: &PrimitiveValue) -> bool {
        self.adjacency.connects(from, to)
    }

    /// Outgoing edges of `id` as a status carrying them under `data`.
    pub fn edges_from(&self, id: &PrimitiveValue) -> Status {
        let bucket = self.adjacency.outgoing_edges(id);
        let status = Status::verdict(
            FailureKind::Naming,
            "Edges fetched",
            "Vertex id does not exist",
            bucket.is_some(),
        )
        .with_context("id", id.to_json())
        .with_context("graph", self.name.as_str());
        match bucket {
            Some(edges) => {
                status.with_context("data", edges.iter().map(row_to_json).collect::<Vec<_>>())
            }
            None => status,
        }
    }
}
