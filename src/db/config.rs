use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, TesseraError};
use crate::storage::GraphOptions;

/// Catalog-wide settings.
///
/// Loads from TOML; every key is optional and unknown keys are rejected:
///
/// ```toml
/// max_batch_rows = 10000
///
/// [graph]
/// reject_undeclared_fields = true
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CatalogOptions {
    /// Largest vertex plus edge row count accepted by one insert.
    pub max_batch_rows: Option<usize>,
    /// Options given to every graph the catalog creates.
    pub graph: GraphOptions,
}

impl CatalogOptions {
    /// Rows with undeclared fields are rejected; no batch limit.
    pub fn strict() -> Self {
        Self {
            max_batch_rows: None,
            graph: GraphOptions::new().reject_undeclared_fields(true),
        }
    }

    /// Sets [`CatalogOptions::max_batch_rows`].
    pub fn max_batch_rows(mut self, limit: usize) -> Self {
        self.max_batch_rows = Some(limit);
        self
    }

    /// Parses options from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Reads and parses a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| TesseraError::io(path, source))?;
        Self::from_toml_str(&contents)
    }
}
