//! Error type for faults outside the status model.
use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result alias for operations that can fault outside the status model.
pub type Result<T> = std::result::Result<T, TesseraError>;

/// Faults that are not constraint diagnostics.
///
/// Constraint, naming, and topology failures are reported as [`crate::Status`]
/// trees. This type covers the remaining cases: configuration files, logging
/// setup, and misuse of the row-store rollback protocol.
#[derive(Debug, Error)]
pub enum TesseraError {
    /// I/O error while reading configuration.
    #[error("I/O error reading {path}: {source}")]
    Io {
        /// File that could not be read.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: io::Error,
    },
    /// Configuration text was not valid TOML for [`crate::CatalogOptions`].
    #[error("invalid configuration: {0}")]
    Config(#[from] toml::de::Error),
    /// The tracing subscriber could not be installed.
    #[error("logging: {0}")]
    Logging(String),
    /// A rollback did not match the pending batch of a row store.
    #[error("rollback of {requested} rows on '{schema}' mismatches pending batch ({pending:?})")]
    RollbackMismatch {
        /// Schema owning the row store.
        schema: String,
        /// Rows the caller asked to roll back.
        requested: usize,
        /// Rows in the pending batch, if any.
        pending: Option<usize>,
    },
}

impl TesseraError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        TesseraError::Io {
            path: path.into(),
            source,
        }
    }
}
