//! Field-level predicates over one or more equal-length columns.
use std::fmt;

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use crate::primitives::{Columns, PrimitiveType, PrimitiveValue};
use crate::status::{FailureKind, Status};

/// Whether a predicate can be decided from newly appended values alone.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Locality {
    /// Only the delta needs checking.
    Local,
    /// The full column is required; a new value may collide with an old one.
    Global,
}

/// Predicate kinds. Evaluation is dispatched on the kind; there is no
/// captured state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "type", rename_all = "snake_case")]
pub enum FieldConstraintKind {
    /// No null in any bound column.
    NotNull,
    /// No value repeats within each bound column, independently.
    Unique,
    /// Every non-null value in each bound column has the given type.
    TypeCheck(PrimitiveType),
}

impl FieldConstraintKind {
    /// Name used in diagnostics (`NOTNULL`, `UNIQUE`, `CHECKTYPE_INT`, ...).
    pub fn name(&self) -> String {
        match self {
            FieldConstraintKind::NotNull => "NOTNULL".to_owned(),
            FieldConstraintKind::Unique => "UNIQUE".to_owned(),
            FieldConstraintKind::TypeCheck(ty) => format!("CHECKTYPE_{}", ty.keyword()),
        }
    }

    /// Parses a name produced by [`FieldConstraintKind::name`].
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "NOTNULL" => Some(FieldConstraintKind::NotNull),
            "UNIQUE" => Some(FieldConstraintKind::Unique),
            other => other
                .strip_prefix("CHECKTYPE_")
                .and_then(PrimitiveType::from_keyword)
                .map(FieldConstraintKind::TypeCheck),
        }
    }

    /// Locality of this predicate.
    pub fn locality(&self) -> Locality {
        match self {
            FieldConstraintKind::Unique => Locality::Global,
            FieldConstraintKind::NotNull | FieldConstraintKind::TypeCheck(_) => Locality::Local,
        }
    }

    /// Positions of the columns that violate the predicate. Empty means it holds.
    pub fn violations(&self, columns: &[&[PrimitiveValue]]) -> Vec<usize> {
        columns
            .iter()
            .enumerate()
            .filter(|(_, column)| !self.column_holds(column))
            .map(|(idx, _)| idx)
            .collect()
    }

    /// Whether the predicate holds over every column.
    pub fn holds(&self, columns: &[&[PrimitiveValue]]) -> bool {
        columns.iter().all(|column| self.column_holds(column))
    }

    fn column_holds(&self, column: &[PrimitiveValue]) -> bool {
        match self {
            FieldConstraintKind::NotNull => not_null(column),
            FieldConstraintKind::Unique => unique(column),
            FieldConstraintKind::TypeCheck(ty) => type_check(*ty, column),
        }
    }
}

impl fmt::Display for FieldConstraintKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

fn not_null(column: &[PrimitiveValue]) -> bool {
    !column.iter().any(PrimitiveValue::is_null)
}

// Nulls take part in the comparison: two nulls collide.
fn unique(column: &[PrimitiveValue]) -> bool {
    let mut seen = FxHashSet::default();
    seen.reserve(column.len());
    column.iter().all(|value| seen.insert(value))
}

fn type_check(ty: PrimitiveType, column: &[PrimitiveValue]) -> bool {
    column
        .iter()
        .all(|value| value.primitive_type().map_or(true, |actual| actual == ty))
}

/// A predicate bound to the ordered list of fields it evaluates jointly.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundConstraint {
    kind: FieldConstraintKind,
    fields: Vec<String>,
    locality: Locality,
}

impl BoundConstraint {
    /// Binds `kind` to `fields`.
    pub fn new<I, S>(kind: FieldConstraintKind, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            kind,
            fields: fields.into_iter().map(Into::into).collect(),
            locality: kind.locality(),
        }
    }

    /// Predicate kind.
    pub fn kind(&self) -> FieldConstraintKind {
        self.kind
    }

    /// Bound fields, in evaluation order.
    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    /// Locality derived from the kind.
    pub fn locality(&self) -> Locality {
        self.locality
    }

    /// Whether `field` is among the bound fields.
    pub fn binds(&self, field: &str) -> bool {
        self.fields.iter().any(|f| f == field)
    }

    /// Evaluates the predicate over the bound columns of `columns`.
    ///
    /// A bound field with no column fails the check; the missing names are
    /// reported under `missing_fields`.
    pub fn check(&self, columns: &Columns) -> Status {
        let mut selected = Vec::with_capacity(self.fields.len());
        let mut missing = Vec::new();
        for field in &self.fields {
            match columns.get(field) {
                Some(column) => selected.push(column.as_slice()),
                None => missing.push(field.clone()),
            }
        }
        let name = self.kind.name();
        let fields: Vec<serde_json::Value> =
            self.fields.iter().map(|f| f.as_str().into()).collect();
        if !missing.is_empty() {
            return Status::failure(
                FailureKind::StructuralSchema,
                "Field constraint bound to a field with no column",
            )
            .with_context("constraint", name)
            .with_context("fields", fields)
            .with_context("missing_fields", missing);
        }
        let violating = self.kind.violations(&selected);
        let status = Status::verdict(
            FailureKind::ValueConstraint,
            "Field constraint satisfied",
            "Field constraint violated",
            violating.is_empty(),
        )
        .with_context("constraint", name)
        .with_context("fields", fields);
        if violating.is_empty() {
            status
        } else {
            let names: Vec<String> = violating
                .into_iter()
                .map(|idx| self.fields[idx].clone())
                .collect();
            status.with_context("violating_fields", names)
        }
    }
}
