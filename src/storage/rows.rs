use std::sync::Arc;

use rustc_hash::FxHashMap;
use tracing::{debug, warn};

use crate::error::{Result, TesseraError};
use crate::primitives::{Columns, PrimitiveValue, Row};
use crate::schema::{Schema, ID};
use crate::status::{FailureKind, Status};

use super::options::GraphOptions;

#[derive(Clone, Copy, Debug)]
struct PendingBatch {
    rows: usize,
    committed: bool,
}

/// Columnar container for the rows of one schema.
///
/// `columns` hold one value per row for every declared field, including rows
/// of a batch that is still pending. `ids` and `entries` only ever hold
/// committed rows: a batch reaches them when its schema validation passes.
///
/// A batch is pending from [`RowStore::insert`] until the owner rolls it back
/// or settles it. Rollback truncates, so nothing else may mutate the store in
/// between: an insert over a rejected batch that was never rolled back is
/// refused. A committed batch is settled by the next insert.
#[derive(Debug)]
pub struct RowStore {
    schema: Arc<Schema>,
    options: GraphOptions,
    columns: Columns,
    ids: Vec<PrimitiveValue>,
    entries: FxHashMap<PrimitiveValue, Row>,
    pending: Option<PendingBatch>,
}

impl RowStore {
    /// Empty store for `schema`.
    pub fn new(schema: Arc<Schema>) -> Self {
        Self::with_options(schema, GraphOptions::default())
    }

    /// Empty store for `schema` with explicit options.
    pub fn with_options(schema: Arc<Schema>, options: GraphOptions) -> Self {
        let columns = schema.empty_columns();
        Self {
            schema,
            options,
            columns,
            ids: Vec::new(),
            entries: FxHashMap::default(),
            pending: None,
        }
    }

    /// Owning schema.
    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    /// Appends `rows` and validates the result.
    ///
    /// Every declared field of every row is appended to its column right away;
    /// a field the row omits is stored as null. The schema then checks the full
    /// columns against the delta of this batch. On success the rows are
    /// committed to `ids`/`entries`. On failure nothing is undone here: the
    /// caller must call [`RowStore::rollback`] with the same rows.
    ///
    /// While a rejected batch is still pending the store is left untouched
    /// and the returned status fails with a dependency leaf.
    pub fn insert(&mut self, rows: &[Row]) -> Status {
        let label = self.schema.kind();
        if let Some(stale) = self.pending.filter(|batch| !batch.committed) {
            warn!(
                schema = self.schema.name(),
                rows = rows.len(),
                pending = stale.rows,
                "rows.insert.blocked"
            );
            let blocked = Status::failure(FailureKind::Dependency, "Earlier batch not rolled back")
                .with_context("pending_rows", stale.rows);
            return Status::derived(
                format!("Inserted {label} rows"),
                format!("Rejected {label} rows"),
                vec![blocked],
            )
            .with_context("type_name", self.schema.name())
            .with_context("rows", rows.len());
        }

        let mut checks = Vec::with_capacity(2);
        if self.options.reject_undeclared_fields {
            checks.push(self.check_declared(rows));
        }

        let mut delta = self.schema.empty_columns();
        for row in rows {
            for (field, column) in self.columns.iter_mut() {
                let value = row.get(field).cloned().unwrap_or_default();
                if let Some(delta_column) = delta.get_mut(field) {
                    delta_column.push(value.clone());
                }
                column.push(value);
            }
        }
        checks.push(self.schema.check(&self.columns, Some(&delta)));

        let status = Status::derived(
            format!("Inserted {label} rows"),
            format!("Rejected {label} rows"),
            checks,
        )
        .with_context("type_name", self.schema.name())
        .with_context("rows", rows.len());

        let committed = status.success();
        if committed {
            self.ids.reserve(rows.len());
            for row in rows {
                let id = row.get(ID).cloned().unwrap_or_default();
                self.ids.push(id.clone());
                self.entries.insert(id, row.clone());
            }
        }
        self.pending = Some(PendingBatch {
            rows: rows.len(),
            committed,
        });
        debug!(
            schema = self.schema.name(),
            rows = rows.len(),
            committed,
            "rows.insert"
        );
        status
    }

    /// Undoes the pending batch, which must have exactly `rows.len()` rows.
    ///
    /// Columns are truncated by the batch size; `ids` and `entries` are popped
    /// only if the batch had committed to them.
    pub fn rollback(&mut self, rows: &[Row]) -> Result<()> {
        let batch = match self.pending {
            Some(batch) if batch.rows == rows.len() => batch,
            other => {
                return Err(TesseraError::RollbackMismatch {
                    schema: self.schema.name().to_owned(),
                    requested: rows.len(),
                    pending: other.map(|b| b.rows),
                })
            }
        };
        self.pending = None;
        for column in self.columns.values_mut() {
            let keep = column.len().saturating_sub(batch.rows);
            column.truncate(keep);
        }
        if batch.committed {
            for _ in 0..batch.rows {
                if let Some(id) = self.ids.pop() {
                    self.entries.remove(&id);
                }
            }
        }
        debug!(
            schema = self.schema.name(),
            rows = batch.rows,
            committed = batch.committed,
            "rows.rollback"
        );
        Ok(())
    }

    /// Closes the pending batch so it can no longer be rolled back.
    pub(crate) fn settle(&mut self) {
        self.pending = None;
    }

    /// Whether a batch is awaiting rollback or settlement.
    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    fn check_declared(&self, rows: &[Row]) -> Status {
        let mut offenders = Vec::new();
        for (position, row) in rows.iter().enumerate() {
            let undeclared: Vec<&str> = row
                .keys()
                .filter(|key| !self.schema.declares(key))
                .map(String::as_str)
                .collect();
            if !undeclared.is_empty() {
                offenders.push(serde_json::json!({
                    "row": position,
                    "fields": undeclared,
                }));
            }
        }
        let status = Status::verdict(
            FailureKind::UndeclaredField,
            "All row fields declared",
            "Rows carry undeclared fields",
            offenders.is_empty(),
        );
        if offenders.is_empty() {
            status
        } else {
            status.with_context("offending_rows", offenders)
        }
    }

    /// Number of committed rows.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Whether no row is committed.
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Values of `field`, pending rows included.
    pub fn column(&self, field: &str) -> Option<&[PrimitiveValue]> {
        self.columns.get(field).map(Vec::as_slice)
    }

    /// Every column.
    pub fn columns(&self) -> &Columns {
        &self.columns
    }

    /// Column of `field` as a status carrying the values under `data`.
    pub fn get_field(&self, field: &str) -> Status {
        let column = self.columns.get(field);
        let status = Status::verdict(
            FailureKind::Naming,
            "Field fetched",
            "Field does not exist",
            column.is_some(),
        )
        .with_context("field", field)
        .with_context("type_name", self.schema.name());
        match column {
            Some(values) => status.with_context(
                "data",
                values.iter().map(PrimitiveValue::to_json).collect::<Vec<_>>(),
            ),
            None => status,
        }
    }

    /// Committed ids in insertion order.
    pub fn ids(&self) -> &[PrimitiveValue] {
        &self.ids
    }

    /// Committed row with the given id.
    pub fn entry(&self, id: &PrimitiveValue) -> Option<&Row> {
        self.entries.get(id)
    }

    /// Committed rows in insertion order.
    pub fn entries(&self) -> impl Iterator<Item = &Row> + '_ {
        self.ids.iter().filter_map(|id| self.entries.get(id))
    }
}
