//! Primitive value domain shared by schemas, stores, and constraints.

/// Scalar values, declared field types, and row/column aliases.
pub mod value;

pub use value::{row_to_json, Columns, PrimitiveType, PrimitiveValue, Row};
