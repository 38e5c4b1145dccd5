use serde::{Deserialize, Serialize};

/// Configuration applied to the row stores of a [`super::Graph`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GraphOptions {
    /// Reject rows that carry fields the schema does not declare. When off,
    /// such fields are kept in the stored row but get no column.
    pub reject_undeclared_fields: bool,
}

impl GraphOptions {
    /// Creates GraphOptions with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets [`GraphOptions::reject_undeclared_fields`].
    pub fn reject_undeclared_fields(mut self, reject: bool) -> Self {
        self.reject_undeclared_fields = reject;
        self
    }
}
