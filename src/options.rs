use serde::{Deserialize, Serialize};

/// Explain directive prepended to the analysed query by default.
pub const DEFAULT_EXPLAIN_PREFIX: &str = "EXPLAIN EXTENDED ";

/// Explain column carrying the group identifier by default.
pub const DEFAULT_GROUP_COLUMN: &str = "id";

/// Options controlling how a query is explained and its rows grouped.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyserOptions {
    /// Text prepended to the query to form the plan query.
    pub explain_prefix: String,
    /// Column of the explain result holding the group identifier.
    pub group_column: String,
}

impl Default for AnalyserOptions {
    fn default() -> Self {
        Self {
            explain_prefix: DEFAULT_EXPLAIN_PREFIX.to_string(),
            group_column: DEFAULT_GROUP_COLUMN.to_string(),
        }
    }
}

impl AnalyserOptions {
    /// Derives the plan query for `query`.
    pub fn plan_query(&self, query: &str) -> String {
        format!("{}{query}", self.explain_prefix)
    }
}
