//! Tracing subscriber setup.

use crate::error::{Result, TesseraError};
use tracing_subscriber::{fmt, EnvFilter};

/// Installs a global `fmt` subscriber filtered by `level` (an `EnvFilter`
/// directive such as `"tessera=debug"`).
///
/// Embedders that already own a subscriber should skip this; a second call
/// fails with [`TesseraError::Logging`].
pub fn init_logging(level: &str) -> Result<()> {
    fmt()
        .with_env_filter(
            EnvFilter::try_new(level)
                .map_err(|e| TesseraError::Logging(format!("invalid log filter: {e}")))?,
        )
        .with_target(true)
        .try_init()
        .map_err(|_| TesseraError::Logging("logging already initialized".into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_malformed_filter() {
        let err = init_logging("tessera=loud").unwrap_err();
        assert!(matches!(err, TesseraError::Logging(_)));
    }
}
