//! Vertex and edge types: declared fields, their types, and bound constraints.
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::constraints::{BoundConstraint, FieldConstraintKind, Locality};
use crate::primitives::{Columns, PrimitiveType};
use crate::status::{FailureKind, Status};

/// Mandatory key field of every schema.
pub const ID: &str = "id";
/// Mandatory source field of an edge schema.
pub const FROM: &str = "from";
/// Mandatory target field of an edge schema.
pub const TO: &str = "to";
/// Field that makes an edge schema weighted when declared numeric.
pub const WEIGHT: &str = "weight";

/// Which side of a graph a schema describes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchemaKind {
    /// Vertex type.
    Vertex,
    /// Edge type; additionally requires `from` and `to`.
    Edge,
}

impl SchemaKind {
    /// Lower-case label used in diagnostics.
    pub fn as_str(self) -> &'static str {
        match self {
            SchemaKind::Vertex => "vertex",
            SchemaKind::Edge => "edge",
        }
    }
}

impl fmt::Display for SchemaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A vertex or edge type.
///
/// Construction never fails; structural problems (missing `id` bindings,
/// untyped fields, constraints on undeclared fields) surface from
/// [`Schema::check`], which the catalog runs before accepting a type. Every
/// typed field receives a `CHECKTYPE_*` binding automatically, appended after
/// the caller's constraints.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    kind: SchemaKind,
    name: String,
    fields: Vec<String>,
    types: BTreeMap<String, PrimitiveType>,
    constraints: Vec<BoundConstraint>,
}

impl Schema {
    /// Vertex type.
    pub fn vertex(
        name: impl Into<String>,
        fields: Vec<String>,
        types: BTreeMap<String, PrimitiveType>,
        constraints: Vec<BoundConstraint>,
    ) -> Self {
        Self::build(SchemaKind::Vertex, name.into(), fields, types, constraints)
    }

    /// Edge type.
    pub fn edge(
        name: impl Into<String>,
        fields: Vec<String>,
        types: BTreeMap<String, PrimitiveType>,
        constraints: Vec<BoundConstraint>,
    ) -> Self {
        Self::build(SchemaKind::Edge, name.into(), fields, types, constraints)
    }

    fn build(
        kind: SchemaKind,
        name: String,
        fields: Vec<String>,
        types: BTreeMap<String, PrimitiveType>,
        mut constraints: Vec<BoundConstraint>,
    ) -> Self {
        let mut bound = BTreeSet::new();
        for field in &fields {
            if let Some(ty) = types.get(field) {
                if bound.insert(field.as_str()) {
                    constraints.push(BoundConstraint::new(
                        FieldConstraintKind::TypeCheck(*ty),
                        [field.as_str()],
                    ));
                }
            }
        }
        Self {
            kind,
            name,
            fields,
            types,
            constraints,
        }
    }

    /// Vertex or edge.
    pub fn kind(&self) -> SchemaKind {
        self.kind
    }

    /// Type name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared fields, in declaration order.
    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    /// Whether `field` is declared.
    pub fn declares(&self, field: &str) -> bool {
        self.fields.iter().any(|f| f == field)
    }

    /// Declared type of `field`.
    pub fn field_type(&self, field: &str) -> Option<PrimitiveType> {
        self.types.get(field).copied()
    }

    /// All bound constraints, automatic type checks included.
    pub fn constraints(&self) -> &[BoundConstraint] {
        &self.constraints
    }

    /// Whether this schema declares a numeric `weight` field.
    pub fn is_weighted(&self) -> bool {
        match self.field_type(WEIGHT) {
            Some(ty) => self.declares(WEIGHT) && ty.is_numeric(),
            None => false,
        }
    }

    /// One empty column per declared field.
    pub fn empty_columns(&self) -> Columns {
        self.fields
            .iter()
            .map(|field| (field.clone(), Vec::new()))
            .collect()
    }

    /// Validates `full` (every row) and `delta` (rows of the pending batch).
    ///
    /// Local constraints read `delta` when given, global ones always read
    /// `full`. Mandatory bindings are verified structurally first. The returned
    /// node has one child per check, and every check runs.
    pub fn check(&self, full: &Columns, delta: Option<&Columns>) -> Status {
        let mut checks = Vec::with_capacity(self.constraints.len() + 4);
        match self.kind {
            SchemaKind::Vertex => {}
            SchemaKind::Edge => {
                checks.push(self.check_mandatory(FROM, &[FieldConstraintKind::NotNull]));
                checks.push(self.check_mandatory(TO, &[FieldConstraintKind::NotNull]));
            }
        }
        self.check_shared(full, delta, &mut checks);
        Status::derived(
            format!("Validation passed for {} type", self.kind),
            format!("Validation failed for {} type", self.kind),
            checks,
        )
        .with_context("type_name", self.name.as_str())
    }

    fn check_shared(&self, full: &Columns, delta: Option<&Columns>, checks: &mut Vec<Status>) {
        checks.push(self.check_definitions());
        checks.push(self.check_mandatory(
            ID,
            &[FieldConstraintKind::Unique, FieldConstraintKind::NotNull],
        ));
        for constraint in &self.constraints {
            let target = match (constraint.locality(), delta) {
                (Locality::Local, Some(delta)) => delta,
                _ => full,
            };
            checks.push(constraint.check(target));
        }
    }

    fn check_mandatory(&self, field: &str, required: &[FieldConstraintKind]) -> Status {
        let missing: Vec<String> = required
            .iter()
            .filter(|&&kind| !self.binds_kind(kind, field))
            .map(FieldConstraintKind::name)
            .collect();
        let present = self.declares(field) && missing.is_empty();
        let status = Status::verdict(
            FailureKind::StructuralSchema,
            "Mandatory field bindings present",
            "Missing mandatory field",
            present,
        )
        .with_context("field", field);
        if missing.is_empty() {
            status
        } else {
            status.with_context("missing_constraints", missing)
        }
    }

    fn binds_kind(&self, kind: FieldConstraintKind, field: &str) -> bool {
        self.constraints
            .iter()
            .any(|c| c.kind() == kind && c.binds(field))
    }

    fn check_definitions(&self) -> Status {
        let mut seen = BTreeSet::new();
        let duplicated: Vec<&str> = self
            .fields
            .iter()
            .filter(|f| !seen.insert(f.as_str()))
            .map(String::as_str)
            .collect();
        let untyped: Vec<&str> = self
            .fields
            .iter()
            .filter(|f| !self.types.contains_key(f.as_str()))
            .map(String::as_str)
            .collect();
        let typed_undeclared: Vec<&str> = self
            .types
            .keys()
            .filter(|f| !self.declares(f))
            .map(String::as_str)
            .collect();
        let mut unbound: BTreeSet<&str> = BTreeSet::new();
        for constraint in &self.constraints {
            for field in constraint.fields() {
                if !self.declares(field) {
                    unbound.insert(field.as_str());
                }
            }
        }
        let unbound: Vec<&str> = unbound.into_iter().collect();
        let ok = duplicated.is_empty()
            && untyped.is_empty()
            && typed_undeclared.is_empty()
            && unbound.is_empty();
        let mut status = Status::verdict(
            FailureKind::StructuralSchema,
            "Field definitions complete",
            "Field definitions incomplete",
            ok,
        );
        for (key, names) in [
            ("duplicated_fields", duplicated),
            ("untyped_fields", untyped),
            ("typed_undeclared_fields", typed_undeclared),
            ("constrained_undeclared_fields", unbound),
        ] {
            if !names.is_empty() {
                status.put_context(key, names);
            }
        }
        status
    }
}
