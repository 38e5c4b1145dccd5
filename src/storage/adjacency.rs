use rustc_hash::FxHashMap;

use crate::primitives::{PrimitiveValue, Row};
use crate::schema::{FROM, ID, TO};

/// Vertex id to outgoing edge rows, in commit order.
///
/// Only committed batches are recorded, so a rejected transaction never
/// touches the index and it needs no rollback of its own.
#[derive(Debug, Default)]
pub struct AdjacencyIndex {
    buckets: FxHashMap<PrimitiveValue, Vec<Row>>,
    edges: usize,
}

impl AdjacencyIndex {
    /// Empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty bucket per committed vertex.
    pub(crate) fn record_vertices(&mut self, vertices: &[Row]) {
        self.buckets.reserve(vertices.len());
        for vertex in vertices {
            let id = vertex.get(ID).cloned().unwrap_or_default();
            self.buckets.entry(id).or_default();
        }
    }

    /// Appends each committed edge to the bucket of its `from` vertex.
    pub(crate) fn record_edges(&mut self, edges: &[Row]) {
        for edge in edges {
            let from = edge.get(FROM).cloned().unwrap_or_default();
            self.buckets.entry(from).or_default().push(edge.clone());
            self.edges += 1;
        }
    }

    /// Outgoing edges of `id`, `None` if `id` is not a known vertex.
    pub fn outgoing_edges(&self, id: &PrimitiveValue) -> Option<&[Row]> {
        self.buckets.get(id).map(Vec::as_slice)
    }

    /// Target ids of the outgoing edges of `id`, one per edge.
    pub fn neighbors<'a>(
        &'a self,
        id: &PrimitiveValue,
    ) -> Option<impl Iterator<Item = &'a PrimitiveValue> + 'a> {
        self.buckets
            .get(id)
            .map(|bucket| bucket.iter().filter_map(|edge| edge.get(TO)))
    }

    /// Whether some edge runs from `from` to `to`.
    pub fn connects(&self, from: &PrimitiveValue, to: &PrimitiveValue) -> bool {
        self.buckets
            .get(from)
            .is_some_and(|bucket| bucket.iter().any(|edge| edge.get(TO) == Some(to)))
    }

    /// Number of outgoing edges of `id`.
    pub fn degree(&self, id: &PrimitiveValue) -> usize {
        self.buckets.get(id).map_or(0, Vec::len)
    }

    /// Number of vertex buckets.
    pub fn vertex_count(&self) -> usize {
        self.buckets.len()
    }

    /// Number of recorded edges.
    pub fn edge_count(&self) -> usize {
        self.edges
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::row;

    #[test]
    fn edges_land_in_from_bucket() {
        let mut index = AdjacencyIndex::new();
        index.record_vertices(&[
            row! { "id" => "a" },
            row! { "id" => "b" },
            row! { "id" => "c" },
        ]);
        let ab = row! { "id" => 1, "from" => "a", "to" => "b" };
        let ac = row! { "id" => 2, "from" => "a", "to" => "c" };
        index.record_edges(&[ab.clone(), ac.clone()]);

        let a = PrimitiveValue::from("a");
        assert_eq!(index.outgoing_edges(&a), Some(&[ab, ac][..]));
        let targets: Vec<_> = index.neighbors(&a).into_iter().flatten().cloned().collect();
        assert_eq!(
            targets,
            vec![PrimitiveValue::from("b"), PrimitiveValue::from("c")]
        );
        assert!(index.connects(&a, &"c".into()));
        assert!(!index.connects(&"b".into(), &a));
        assert_eq!(index.degree(&"b".into()), 0);
        assert_eq!(index.edge_count(), 2);
    }

    #[test]
    fn unknown_vertex_has_no_bucket() {
        let index = AdjacencyIndex::new();
        assert!(index.outgoing_edges(&PrimitiveValue::Int(1)).is_none());
        assert!(index.neighbors(&PrimitiveValue::Int(1)).is_none());
    }
}
