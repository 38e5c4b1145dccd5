//! Hierarchical diagnostics returned by every mutating and validating call.
//!
//! A [`Status`] is either a [`Leaf`] (one check) or a [`Derived`] node whose
//! success is the conjunction of its children. Success is computed once when
//! the node is built; afterwards only context may be annotated. Failing leaves
//! carry a `category` context entry naming their [`FailureKind`].
use std::collections::BTreeMap;
use std::fmt::{self, Write as _};

use serde::Serialize;

/// Context attached to a status node.
pub type Context = BTreeMap<String, serde_json::Value>;

/// Context key holding the [`FailureKind`] of a failing leaf.
pub const CATEGORY_KEY: &str = "category";

/// Classification of a failing check.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Duplicate or missing catalog name, or a name of the wrong object kind.
    Naming,
    /// Mandatory id/from/to binding or field definition missing from a schema.
    StructuralSchema,
    /// Not-null, uniqueness, or type-check violation.
    ValueConstraint,
    /// Named graph property does not hold.
    Topology,
    /// Object is still referenced by another catalog object.
    Dependency,
    /// Batch exceeds a configured limit.
    Limit,
    /// Row carries a field its schema does not declare.
    UndeclaredField,
}

impl FailureKind {
    /// Stable snake_case name stored in context.
    pub fn as_str(self) -> &'static str {
        match self {
            FailureKind::Naming => "naming",
            FailureKind::StructuralSchema => "structural_schema",
            FailureKind::ValueConstraint => "value_constraint",
            FailureKind::Topology => "topology",
            FailureKind::Dependency => "dependency",
            FailureKind::Limit => "limit",
            FailureKind::UndeclaredField => "undeclared_field",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of a single check.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Leaf {
    message: String,
    success: bool,
    context: Context,
}

/// Aggregate of child statuses.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Derived {
    message: String,
    success: bool,
    context: Context,
    children: Vec<Status>,
}

/// Node of a status tree.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "node", rename_all = "snake_case")]
pub enum Status {
    /// Single check.
    Leaf(Leaf),
    /// Conjunction of children.
    Derived(Derived),
}

impl Status {
    /// Leaf whose message is picked by `success`.
    pub fn leaf(ok: impl Into<String>, failed: impl Into<String>, success: bool) -> Self {
        let message = if success { ok.into() } else { failed.into() };
        Status::Leaf(Leaf {
            message,
            success,
            context: Context::new(),
        })
    }

    /// Leaf tagged with `kind` when it fails.
    pub fn verdict(
        kind: FailureKind,
        ok: impl Into<String>,
        failed: impl Into<String>,
        success: bool,
    ) -> Self {
        let status = Status::leaf(ok, failed, success);
        if success {
            status
        } else {
            status.with_context(CATEGORY_KEY, kind.as_str())
        }
    }

    /// Failing leaf of the given kind.
    pub fn failure(kind: FailureKind, message: impl Into<String>) -> Self {
        Status::verdict(kind, String::new(), message, false)
    }

    /// Derived node over `children`. Every child is kept, passing or not.
    pub fn derived(
        ok: impl Into<String>,
        failed: impl Into<String>,
        children: Vec<Status>,
    ) -> Self {
        let success = children.iter().all(Status::success);
        let message = if success { ok.into() } else { failed.into() };
        Status::Derived(Derived {
            message,
            success,
            context: Context::new(),
            children,
        })
    }

    /// Whether this check (and, for derived nodes, every child) passed.
    pub fn success(&self) -> bool {
        match self {
            Status::Leaf(leaf) => leaf.success,
            Status::Derived(node) => node.success,
        }
    }

    /// Message selected at construction.
    pub fn message(&self) -> &str {
        match self {
            Status::Leaf(leaf) => &leaf.message,
            Status::Derived(node) => &node.message,
        }
    }

    /// Context map.
    pub fn context(&self) -> &Context {
        match self {
            Status::Leaf(leaf) => &leaf.context,
            Status::Derived(node) => &node.context,
        }
    }

    /// Single context entry.
    pub fn get_context(&self, key: &str) -> Option<&serde_json::Value> {
        self.context().get(key)
    }

    /// Adds or replaces a context entry.
    pub fn put_context(&mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) {
        let context = match self {
            Status::Leaf(leaf) => &mut leaf.context,
            Status::Derived(node) => &mut node.context,
        };
        context.insert(key.into(), value.into());
    }

    /// Builder form of [`Status::put_context`].
    pub fn with_context(
        mut self,
        key: impl Into<String>,
        value: impl Into<serde_json::Value>,
    ) -> Self {
        self.put_context(key, value);
        self
    }

    /// Category of a failing leaf, if tagged.
    pub fn category(&self) -> Option<&str> {
        self.get_context(CATEGORY_KEY)
            .and_then(serde_json::Value::as_str)
    }

    /// Children of a derived node; empty for leaves.
    pub fn children(&self) -> &[Status] {
        match self {
            Status::Leaf(_) => &[],
            Status::Derived(node) => &node.children,
        }
    }

    /// Returns true for [`Status::Leaf`].
    pub fn is_leaf(&self) -> bool {
        matches!(self, Status::Leaf(_))
    }

    /// Direct children that failed.
    pub fn failures(&self) -> impl Iterator<Item = &Status> {
        self.children().iter().filter(|child| !child.success())
    }

    /// Every failing leaf in the tree, depth first.
    pub fn failing_leaves(&self) -> Vec<&Status> {
        let mut out = Vec::new();
        collect_failing_leaves(self, &mut out);
        out
    }

    /// Renders every node, passing or failing.
    pub fn render_full(&self) -> String {
        let mut out = String::new();
        render(self, 0, true, &mut out);
        out
    }

    /// Renders the failing path only. Same as `Display`.
    pub fn render_errors(&self) -> String {
        let mut out = String::new();
        render(self, 0, false, &mut out);
        out
    }
}

fn collect_failing_leaves<'a>(status: &'a Status, out: &mut Vec<&'a Status>) {
    if status.success() {
        return;
    }
    match status {
        Status::Leaf(_) => out.push(status),
        Status::Derived(node) => {
            for child in &node.children {
                collect_failing_leaves(child, out);
            }
        }
    }
}

fn render(status: &Status, depth: usize, full: bool, out: &mut String) {
    let indent = "  ".repeat(depth * 2);
    let tag = if status.success() { "OK" } else { "ERROR" };
    let _ = writeln!(out, "{indent}{tag}: {}", status.message());
    if !status.context().is_empty() {
        let pairs: Vec<String> = status
            .context()
            .iter()
            .map(|(key, value)| format!("{key}={value}"))
            .collect();
        let _ = writeln!(out, "{indent}  where {}", pairs.join(", "));
    }
    let shown: Vec<&Status> = if full {
        status.children().iter().collect()
    } else if status.success() {
        Vec::new()
    } else {
        status.failures().collect()
    };
    if shown.is_empty() {
        return;
    }
    let heading = if full { "Checks" } else { "Causes" };
    let _ = writeln!(out, "{indent}  {heading}:");
    for child in shown {
        render(child, depth + 1, full, out);
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render_errors())
    }
}
