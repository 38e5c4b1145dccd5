//! Catalog of vertex types, edge types, and graphs.
//!
//! The catalog is an explicit context object: callers own it (or share it via
//! [`SharedCatalog`]) and pass it where statements are executed.

mod catalog;
mod config;


pub use catalog::{Catalog, CatalogEntry, SharedCatalog};
pub use config::CatalogOptions;
