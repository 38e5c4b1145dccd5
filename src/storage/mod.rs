//! In-memory graph storage.
//!
//! Each graph owns two columnar row stores (vertices and edges) and an
//! adjacency index that is only ever fed committed batches.

/// Vertex id to outgoing edge rows.
pub mod adjacency;

/// Named graph with transactional batch insert.
pub mod graph;

/// Options shared by the stores of a graph.
pub mod options;

/// Columnar store for the rows of one schema.
pub mod rows;

pub use adjacency::AdjacencyIndex;
pub use graph::Graph;
pub use options::GraphOptions;
pub use rows::RowStore;
