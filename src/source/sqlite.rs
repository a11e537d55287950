use std::path::Path;

use rusqlite::types::ValueRef;
use rusqlite::{Connection, OpenFlags};
use tracing::debug;

use crate::collect::PlanSource;
use crate::error::{BoxError, PlanError, Result};
use crate::value::{RawRow, Value};

/// Plan source backed by a SQLite connection.
///
/// SQLite has no `EXPLAIN EXTENDED`; pair it with an
/// `EXPLAIN QUERY PLAN ` prefix in [`crate::AnalyserOptions`].
pub struct SqliteSource {
    conn: Connection,
    name: String,
}

impl SqliteSource {
    /// Opens the existing database file at `path` read-only.
    ///
    /// A missing file is reported as a source failure and is never created.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let name = format!("sqlite:{}", path.display());
        let flags = OpenFlags::SQLITE_OPEN_READ_ONLY
            | OpenFlags::SQLITE_OPEN_NO_MUTEX
            | OpenFlags::SQLITE_OPEN_URI;
        let conn = Connection::open_with_flags(path, flags)
            .map_err(|err| PlanError::source_failure(&name, err))?;
        Ok(Self { conn, name })
    }

    /// Opens a private in-memory database.
    pub fn open_in_memory() -> Result<Self> {
        let name = "sqlite::memory:".to_string();
        let conn = Connection::open_in_memory().map_err(|err| PlanError::source_failure(&name, err))?;
        Ok(Self { conn, name })
    }

    /// Wraps an existing connection.
    pub fn from_connection(conn: Connection, name: impl Into<String>) -> Self {
        Self {
            conn,
            name: name.into(),
        }
    }

    /// Underlying connection, e.g. for seeding a schema.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

impl PlanSource for SqliteSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn execute_for_rows(&mut self, plan_query: &str) -> std::result::Result<Vec<RawRow>, BoxError> {
        let mut stmt = self.conn.prepare(plan_query)?;
        let names: Vec<String> = stmt
            .column_names()
            .into_iter()
            .map(String::from)
            .collect();
        let mut rows = stmt.query([])?;
        let mut out = Vec::new();
        while let Some(row) = rows.next()? {
            let mut raw = RawRow::new();
            for (idx, name) in names.iter().enumerate() {
                raw.push(name.clone(), value_from_ref(row.get_ref(idx)?));
            }
            out.push(raw);
        }
        debug!(source = %self.name, rows = out.len(), "sqlite plan query finished");
        Ok(out)
    }
}

fn value_from_ref(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(v) => Value::Integer(v),
        ValueRef::Real(v) => Value::Real(v),
        ValueRef::Text(bytes) => Value::Text(String::from_utf8_lossy(bytes).into_owned()),
        ValueRef::Blob(bytes) => Value::Blob(bytes.to_vec()),
    }
}
