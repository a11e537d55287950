//! Dynamically typed cells of an explain result row.
use std::fmt;

use serde::Serialize;

/// Scalar value of a single explain column.
///
/// Serialized untagged so plan output reads like the explain result it came
/// from.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    /// SQL NULL.
    Null,
    /// Signed 64-bit integer.
    Integer(i64),
    /// 64-bit floating point number.
    Real(f64),
    /// UTF-8 text.
    Text(String),
    /// Arbitrary binary payload.
    Blob(Vec<u8>),
}

impl Value {
    /// Returns `true` for [`Value::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Interprets the cell as an integer.
    ///
    /// Text holding a base-10 integer is accepted since some drivers report
    /// every explain column as a string.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(v) => Some(*v),
            Value::Text(s) => s.trim().parse().ok(),
            Value::Null | Value::Real(_) | Value::Blob(_) => None,
        }
    }

    /// Borrows the cell as text when it holds one.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Parses a textual cell from a CSV dump; an empty cell or the literal
    /// `NULL` printed by database shells is NULL.
    pub fn from_text_cell(cell: &str) -> Self {
        if cell.is_empty() || cell == "NULL" {
            return Value::Null;
        }
        if let Ok(int) = cell.parse::<i64>() {
            return Value::Integer(int);
        }
        if let Ok(real) = cell.parse::<f64>() {
            if real.is_finite() {
                return Value::Real(real);
            }
        }
        Value::Text(cell.to_string())
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "NULL"),
            Value::Integer(v) => write!(f, "{v}"),
            Value::Real(v) => write!(f, "{v}"),
            Value::Text(s) => write!(f, "{s}"),
            Value::Blob(bytes) => write!(f, "<{} bytes>", bytes.len()),
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Integer(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Real(value)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}

/// One row of an explain result: named columns in the order the source
/// reported them.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct RawRow {
    columns: Vec<(String, Value)>,
}

impl RawRow {
    /// Creates an empty row.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a column, builder style.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.push(name, value);
        self
    }

    /// Appends a column.
    pub fn push(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.columns.push((name.into(), value.into()));
    }

    /// Looks a column up by name, ignoring ASCII case.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.columns
            .iter()
            .find(|(col, _)| col.eq_ignore_ascii_case(name))
            .map(|(_, value)| value)
    }

    /// Returns the columns in source order.
    pub fn columns(&self) -> &[(String, Value)] {
        &self.columns
    }

    /// Number of columns.
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Returns `true` when the row has no columns.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub(crate) fn into_columns(self) -> Vec<(String, Value)> {
        self.columns
    }
}

impl FromIterator<(String, Value)> for RawRow {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self {
            columns: iter.into_iter().collect(),
        }
    }
}
