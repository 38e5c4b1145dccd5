//! Graph-wide predicates over the full vertex and edge sets.
//!
//! Every predicate runs over a [`GraphView`], built once per check from the
//! id column of the vertex store and the from/to columns of the edge store.
//! All of them are linear in vertices plus edges.
use std::collections::VecDeque;
use std::fmt;

use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};

use crate::primitives::PrimitiveValue;
use crate::status::{FailureKind, Status};

/// Named structural property of a graph.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TopologyConstraint {
    /// Every edge endpoint is an existing vertex id. Always enforced.
    ReferentialIntegrity,
    /// Edges are directed. Always holds.
    Directed,
    /// Every edge (u,v) has a reverse (v,u).
    Undirected,
    /// No self-loops and no repeated (from, to) pair.
    Simple,
    /// The edge schema declares a numeric `weight` field.
    Weighted,
    /// The edge schema declares no numeric `weight` field.
    Unweighted,
    /// Undirected and every vertex reachable from any other.
    Connected,
    /// No directed cycle.
    Acyclic,
    /// Connected with exactly one fewer undirected edge than vertices.
    Tree,
    /// Every pair of distinct vertices is joined in some direction.
    Complete,
    /// Underlying undirected graph is 2-colorable.
    Bipartite,
}

impl TopologyConstraint {
    /// Every constraint, in declaration order.
    pub const ALL: [TopologyConstraint; 11] = [
        TopologyConstraint::ReferentialIntegrity,
        TopologyConstraint::Directed,
        TopologyConstraint::Undirected,
        TopologyConstraint::Simple,
        TopologyConstraint::Weighted,
        TopologyConstraint::Unweighted,
        TopologyConstraint::Connected,
        TopologyConstraint::Acyclic,
        TopologyConstraint::Tree,
        TopologyConstraint::Complete,
        TopologyConstraint::Bipartite,
    ];

    /// Upper-case name used in diagnostics.
    pub fn name(self) -> &'static str {
        match self {
            TopologyConstraint::ReferentialIntegrity => "REFERENTIAL_INTEGRITY",
            TopologyConstraint::Directed => "DIRECTED",
            TopologyConstraint::Undirected => "UNDIRECTED",
            TopologyConstraint::Simple => "SIMPLE",
            TopologyConstraint::Weighted => "WEIGHTED",
            TopologyConstraint::Unweighted => "UNWEIGHTED",
            TopologyConstraint::Connected => "CONNECTED",
            TopologyConstraint::Acyclic => "ACYCLIC",
            TopologyConstraint::Tree => "TREE",
            TopologyConstraint::Complete => "COMPLETE",
            TopologyConstraint::Bipartite => "BIPARTITE",
        }
    }

    /// Parses a name produced by [`TopologyConstraint::name`].
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.name() == name)
    }

    /// Evaluates the predicate. Vacuously true on an empty graph.
    pub fn holds(self, view: &GraphView<'_>) -> bool {
        if view.is_empty() {
            return true;
        }
        match self {
            TopologyConstraint::ReferentialIntegrity => view.referential_integrity(),
            TopologyConstraint::Directed => true,
            TopologyConstraint::Undirected => view.undirected(),
            TopologyConstraint::Simple => view.simple(),
            TopologyConstraint::Weighted => view.weighted,
            TopologyConstraint::Unweighted => !view.weighted,
            TopologyConstraint::Connected => view.connected(),
            TopologyConstraint::Acyclic => view.acyclic(),
            TopologyConstraint::Tree => view.tree(),
            TopologyConstraint::Complete => view.complete(),
            TopologyConstraint::Bipartite => view.bipartite(),
        }
    }

    /// Evaluates the predicate into a leaf status.
    pub fn check(self, view: &GraphView<'_>) -> Status {
        Status::verdict(
            FailureKind::Topology,
            "Graph constraint satisfied",
            "Graph constraint violated",
            self.holds(view),
        )
        .with_context("constraint", self.name())
    }
}

impl fmt::Display for TopologyConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Index-resolved snapshot of a graph's vertices and edges.
///
/// Vertices are numbered by first occurrence of their id. Edges keep their raw
/// endpoint values plus the resolved positions; an endpoint with no matching
/// vertex resolves to `None` and is skipped by the traversal predicates.
pub struct GraphView<'a> {
    index: FxHashMap<&'a PrimitiveValue, usize>,
    endpoints: Vec<(&'a PrimitiveValue, &'a PrimitiveValue)>,
    resolved: Vec<(usize, usize)>,
    dangling: usize,
    weighted: bool,
}

impl<'a> GraphView<'a> {
    /// Builds a view from the vertex id column and the edge from/to columns.
    /// `weighted` records whether the edge schema declares a numeric weight.
    pub fn new(
        ids: &'a [PrimitiveValue],
        from: &'a [PrimitiveValue],
        to: &'a [PrimitiveValue],
        weighted: bool,
    ) -> Self {
        let mut index = FxHashMap::default();
        index.reserve(ids.len());
        for id in ids {
            let next = index.len();
            index.entry(id).or_insert(next);
        }
        let mut resolved = Vec::with_capacity(from.len());
        let mut dangling = 0;
        let endpoints: Vec<_> = from.iter().zip(to.iter()).collect();
        for (u, v) in &endpoints {
            match (index.get(u), index.get(v)) {
                (Some(&a), Some(&b)) => resolved.push((a, b)),
                _ => dangling += 1,
            }
        }
        Self {
            index,
            endpoints,
            resolved,
            dangling,
            weighted,
        }
    }

    /// Number of distinct vertex ids.
    pub fn vertex_count(&self) -> usize {
        self.index.len()
    }

    /// Number of edges, dangling ones included.
    pub fn edge_count(&self) -> usize {
        self.endpoints.len()
    }

    /// Whether there are neither vertices nor edges.
    pub fn is_empty(&self) -> bool {
        self.index.is_empty() && self.endpoints.is_empty()
    }

    fn referential_integrity(&self) -> bool {
        self.dangling == 0
    }

    fn undirected(&self) -> bool {
        let present: FxHashSet<_> = self.endpoints.iter().copied().collect();
        self.endpoints
            .iter()
            .all(|&(u, v)| present.contains(&(v, u)))
    }

    fn simple(&self) -> bool {
        let mut seen = FxHashSet::default();
        seen.reserve(self.endpoints.len());
        self.endpoints
            .iter()
            .all(|&(u, v)| u != v && seen.insert((u, v)))
    }

    fn out_adjacency(&self) -> Vec<Vec<usize>> {
        let mut adj = vec![Vec::new(); self.vertex_count()];
        for &(u, v) in &self.resolved {
            adj[u].push(v);
        }
        adj
    }

    fn both_adjacency(&self) -> Vec<Vec<usize>> {
        let mut adj = vec![Vec::new(); self.vertex_count()];
        for &(u, v) in &self.resolved {
            adj[u].push(v);
            if u != v {
                adj[v].push(u);
            }
        }
        adj
    }

    fn connected(&self) -> bool {
        if !self.undirected() {
            return false;
        }
        let n = self.vertex_count();
        if n == 0 {
            return true;
        }
        let adj = self.out_adjacency();
        let mut seen = vec![false; n];
        let mut queue = VecDeque::from([0usize]);
        seen[0] = true;
        let mut reached = 1;
        while let Some(u) = queue.pop_front() {
            for &v in &adj[u] {
                if !seen[v] {
                    seen[v] = true;
                    reached += 1;
                    queue.push_back(v);
                }
            }
        }
        reached == n
    }

    // Kahn's algorithm: a cycle leaves vertices with nonzero in-degree.
    fn acyclic(&self) -> bool {
        let n = self.vertex_count();
        let adj = self.out_adjacency();
        let mut in_degree = vec![0usize; n];
        for &(_, v) in &self.resolved {
            in_degree[v] += 1;
        }
        let mut queue: VecDeque<usize> = (0..n).filter(|&u| in_degree[u] == 0).collect();
        let mut removed = 0;
        while let Some(u) = queue.pop_front() {
            removed += 1;
            for &v in &adj[u] {
                in_degree[v] -= 1;
                if in_degree[v] == 0 {
                    queue.push_back(v);
                }
            }
        }
        removed == n
    }

    /// Reciprocal rows (u,v)/(v,u) count as one undirected edge; a self-loop
    /// counts as one.
    fn undirected_edge_count(&self) -> usize {
        let mut loops = 0;
        let mut pairs: FxHashMap<(usize, usize), (usize, usize)> = FxHashMap::default();
        for &(u, v) in &self.resolved {
            if u == v {
                loops += 1;
            } else if u < v {
                pairs.entry((u, v)).or_default().0 += 1;
            } else {
                pairs.entry((v, u)).or_default().1 += 1;
            }
        }
        let merged: usize = pairs.values().map(|&(fwd, back)| fwd.max(back)).sum();
        loops + merged
    }

    fn tree(&self) -> bool {
        self.connected()
            && self.dangling == 0
            && self.vertex_count().checked_sub(1) == Some(self.undirected_edge_count())
    }

    fn complete(&self) -> bool {
        let n = self.vertex_count();
        let joined: FxHashSet<(usize, usize)> = self
            .resolved
            .iter()
            .filter(|(u, v)| u != v)
            .map(|&(u, v)| (u.min(v), u.max(v)))
            .collect();
        joined.len() == n * n.saturating_sub(1) / 2
    }

    fn bipartite(&self) -> bool {
        let n = self.vertex_count();
        if self.resolved.iter().any(|(u, v)| u == v) {
            return false;
        }
        let adj = self.both_adjacency();
        let mut color: Vec<Option<bool>> = vec![None; n];
        let mut queue = VecDeque::new();
        for start in 0..n {
            if color[start].is_some() {
                continue;
            }
            color[start] = Some(false);
            queue.push_back(start);
            while let Some(u) = queue.pop_front() {
                let side = color[u] == Some(true);
                for &v in &adj[u] {
                    match color[v] {
                        None => {
                            color[v] = Some(!side);
                            queue.push_back(v);
                        }
                        Some(c) if c == side => return false,
                        Some(_) => {}
                    }
                }
            }
        }
        true
    }
}
