use serde::Serialize;

use crate::value::{RawRow, Value};

/// One row of an explain result, as consumed by the tree builder.
///
/// Steps are immutable after construction. `group_id` ties steps that
/// belong to the same logical query block (the `id` column of MySQL
/// `EXPLAIN` output).
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PlanStep {
    group_id: Option<i64>,
    columns: Vec<(String, Value)>,
}

impl PlanStep {
    /// Creates a step with an explicit group identifier and no columns.
    pub fn new(group_id: Option<i64>) -> Self {
        Self {
            group_id,
            columns: Vec::new(),
        }
    }

    /// Builds a step from a raw row, reading the group identifier from
    /// `group_column`.
    ///
    /// A missing, NULL, or non-integer group cell yields an ungrouped step.
    pub fn from_row(row: RawRow, group_column: &str) -> Self {
        let group_id = row.get(group_column).and_then(Value::as_i64);
        Self {
            group_id,
            columns: row.into_columns(),
        }
    }

    /// Appends a column, builder style.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.columns.push((name.into(), value.into()));
        self
    }

    /// Group identifier, if any.
    pub fn group_id(&self) -> Option<i64> {
        self.group_id
    }

    /// Explain columns in source order.
    pub fn columns(&self) -> &[(String, Value)] {
        &self.columns
    }

    /// Looks a column up by name, ignoring ASCII case.
    pub fn column(&self, name: &str) -> Option<&Value> {
        self.columns
            .iter()
            .find(|(col, _)| col.eq_ignore_ascii_case(name))
            .map(|(_, value)| value)
    }
}
