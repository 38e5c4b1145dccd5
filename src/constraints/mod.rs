//! Constraint library: field-level and topology-level predicates.

/// Predicates over one or more columns of a single schema.
pub mod field;

/// Predicates over a whole graph.
pub mod topology;

pub use field::{BoundConstraint, FieldConstraintKind, Locality};
pub use topology::{GraphView, TopologyConstraint};
