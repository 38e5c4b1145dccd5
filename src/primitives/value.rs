//! Scalar values stored in vertex and edge columns.
use std::collections::BTreeMap;
use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

/// One vertex or edge record at the engine boundary: field name to value.
pub type Row = BTreeMap<String, PrimitiveValue>;

/// Columnar view of a batch or a whole store: field name to values in row order.
pub type Columns = BTreeMap<String, Vec<PrimitiveValue>>;

/// Declared type of a field.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrimitiveType {
    /// Signed 64-bit integer.
    Int,
    /// 64-bit float.
    Float,
    /// Boolean.
    Bool,
    /// UTF-8 string.
    Str,
}

impl PrimitiveType {
    /// Upper-case keyword used in constraint names (`CHECKTYPE_INT`, ...).
    pub fn keyword(self) -> &'static str {
        match self {
            PrimitiveType::Int => "INT",
            PrimitiveType::Float => "FLOAT",
            PrimitiveType::Bool => "BOOL",
            PrimitiveType::Str => "STR",
        }
    }

    /// Parses the keyword produced by [`PrimitiveType::keyword`].
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "INT" => Some(PrimitiveType::Int),
            "FLOAT" => Some(PrimitiveType::Float),
            "BOOL" => Some(PrimitiveType::Bool),
            "STR" => Some(PrimitiveType::Str),
            _ => None,
        }
    }

    /// Whether values of this type are numbers.
    pub fn is_numeric(self) -> bool {
        matches!(self, PrimitiveType::Int | PrimitiveType::Float)
    }
}

impl fmt::Display for PrimitiveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// Typed scalar. Null is permitted in any column unless a not-null rule
/// excludes it.
///
/// Equality and hashing are typed (`Int(1) != Float(1.0)`); floats compare by
/// canonical bit pattern so `-0.0 == 0.0` and every NaN equals every other NaN.
/// This makes values usable as hash keys for uniqueness checks and id lookups.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(tag = "t", content = "v")]
pub enum PrimitiveValue {
    /// Absent value.
    #[default]
    Null,
    /// Boolean literal.
    Bool(bool),
    /// Signed 64-bit integer literal.
    Int(i64),
    /// 64-bit floating point literal.
    Float(f64),
    /// UTF-8 string literal.
    String(String),
}

impl PrimitiveValue {
    /// Type of this value, `None` for null.
    pub fn primitive_type(&self) -> Option<PrimitiveType> {
        match self {
            PrimitiveValue::Null => None,
            PrimitiveValue::Bool(_) => Some(PrimitiveType::Bool),
            PrimitiveValue::Int(_) => Some(PrimitiveType::Int),
            PrimitiveValue::Float(_) => Some(PrimitiveType::Float),
            PrimitiveValue::String(_) => Some(PrimitiveType::Str),
        }
    }

    /// Returns true for [`PrimitiveValue::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, PrimitiveValue::Null)
    }

    /// Plain JSON rendering used in status context. Non-finite floats become null.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            PrimitiveValue::Null => serde_json::Value::Null,
            PrimitiveValue::Bool(b) => serde_json::Value::Bool(*b),
            PrimitiveValue::Int(i) => serde_json::Value::from(*i),
            PrimitiveValue::Float(f) => serde_json::Number::from_f64(*f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            PrimitiveValue::String(s) => serde_json::Value::String(s.clone()),
        }
    }
}

/// Plain JSON object for a row, used in status context.
pub fn row_to_json(row: &Row) -> serde_json::Value {
    serde_json::Value::Object(
        row.iter()
            .map(|(field, value)| (field.clone(), value.to_json()))
            .collect(),
    )
}

fn canonical_bits(f: f64) -> u64 {
    if f == 0.0 {
        0.0f64.to_bits()
    } else if f.is_nan() {
        f64::NAN.to_bits()
    } else {
        f.to_bits()
    }
}

impl PartialEq for PrimitiveValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (PrimitiveValue::Null, PrimitiveValue::Null) => true,
            (PrimitiveValue::Bool(a), PrimitiveValue::Bool(b)) => a == b,
            (PrimitiveValue::Int(a), PrimitiveValue::Int(b)) => a == b,
            (PrimitiveValue::Float(a), PrimitiveValue::Float(b)) => {
                canonical_bits(*a) == canonical_bits(*b)
            }
            (PrimitiveValue::String(a), PrimitiveValue::String(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for PrimitiveValue {}

impl Hash for PrimitiveValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            PrimitiveValue::Null => {}
            PrimitiveValue::Bool(b) => b.hash(state),
            PrimitiveValue::Int(i) => i.hash(state),
            PrimitiveValue::Float(f) => canonical_bits(*f).hash(state),
            PrimitiveValue::String(s) => s.hash(state),
        }
    }
}

impl fmt::Display for PrimitiveValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PrimitiveValue::Null => f.write_str("null"),
            PrimitiveValue::Bool(b) => write!(f, "{b}"),
            PrimitiveValue::Int(i) => write!(f, "{i}"),
            PrimitiveValue::Float(x) => write!(f, "{x}"),
            PrimitiveValue::String(s) => write!(f, "{s:?}"),
        }
    }
}

impl From<&str> for PrimitiveValue {
    fn from(value: &str) -> Self {
        PrimitiveValue::String(value.to_owned())
    }
}

impl From<String> for PrimitiveValue {
    fn from(value: String) -> Self {
        PrimitiveValue::String(value)
    }
}

impl From<bool> for PrimitiveValue {
    fn from(value: bool) -> Self {
        PrimitiveValue::Bool(value)
    }
}

impl From<i32> for PrimitiveValue {
    fn from(value: i32) -> Self {
        PrimitiveValue::Int(i64::from(value))
    }
}

impl From<i64> for PrimitiveValue {
    fn from(value: i64) -> Self {
        PrimitiveValue::Int(value)
    }
}

impl From<f64> for PrimitiveValue {
    fn from(value: f64) -> Self {
        PrimitiveValue::Float(value)
    }
}

impl<T: Into<PrimitiveValue>> From<Option<T>> for PrimitiveValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(PrimitiveValue::Null)
    }
}

/// Builds a [`Row`] from `field => value` pairs.
///
/// ```
/// let r = tessera::row! { "id" => 1, "name" => "ada" };
/// assert_eq!(r.len(), 2);
/// ```
#[macro_export]
macro_rules! row {
    () => { $crate::Row::new() };
    ($($field:expr => $value:expr),+ $(,)?) => {{
        let mut row = $crate::Row::new();
        $( row.insert(::std::string::String::from($field), $crate::PrimitiveValue::from($value)); )+
        row
    }};
}
