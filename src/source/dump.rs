use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use tracing::{debug, trace};

use crate::collect::PlanSource;
use crate::error::{BoxError, PlanError, Result};
use crate::value::{RawRow, Value};

/// Format of a recorded explain result.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum DumpFormat {
    /// Header row of column names followed by one record per step.
    Csv,
    /// Array of objects, one per step, keys in column order.
    Json,
}

impl DumpFormat {
    /// Picks a format from the file extension; anything but `.json` is CSV.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => DumpFormat::Json,
            _ => DumpFormat::Csv,
        }
    }
}

/// Replays a previously captured explain result.
///
/// Every plan query receives the same rows; the dump stands in for a
/// round-trip that already happened.
#[derive(Clone, Debug)]
pub struct DumpSource {
    name: String,
    rows: Vec<RawRow>,
}

impl DumpSource {
    /// Wraps rows already in memory.
    pub fn from_rows(name: impl Into<String>, rows: Vec<RawRow>) -> Self {
        Self {
            name: name.into(),
            rows,
        }
    }

    /// Loads a dump file, choosing the format from its extension.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|err| PlanError::Dump {
            path: path.to_path_buf(),
            message: err.to_string(),
        })?;
        let name = format!("dump:{}", path.display());
        let rows = match DumpFormat::from_path(path) {
            DumpFormat::Csv => parse_csv(path, file)?,
            DumpFormat::Json => parse_json(path, file)?,
        };
        debug!(path = %path.display(), rows = rows.len(), "loaded plan dump");
        Ok(Self { name, rows })
    }

    /// Parses CSV text.
    pub fn from_csv_str(name: impl Into<String>, text: &str) -> Result<Self> {
        let name = name.into();
        let rows = parse_csv(Path::new(&name), text.as_bytes())?;
        Ok(Self { name, rows })
    }

    /// Parses JSON text.
    pub fn from_json_str(name: impl Into<String>, text: &str) -> Result<Self> {
        let name = name.into();
        let rows = parse_json(Path::new(&name), text.as_bytes())?;
        Ok(Self { name, rows })
    }

    /// Recorded rows.
    pub fn rows(&self) -> &[RawRow] {
        &self.rows
    }
}

impl PlanSource for DumpSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn execute_for_rows(&mut self, plan_query: &str) -> std::result::Result<Vec<RawRow>, BoxError> {
        trace!(source = %self.name, %plan_query, "replaying recorded plan");
        Ok(self.rows.clone())
    }
}

fn dump_error(path: &Path, message: impl Into<String>) -> PlanError {
    PlanError::Dump {
        path: PathBuf::from(path),
        message: message.into(),
    }
}

fn parse_csv<R: Read>(path: &Path, reader: R) -> Result<Vec<RawRow>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);
    let headers = rdr
        .headers()
        .map_err(|err| dump_error(path, err.to_string()))?
        .clone();
    let mut rows = Vec::new();
    for record in rdr.records() {
        let record = record.map_err(|err| dump_error(path, err.to_string()))?;
        let row: RawRow = headers
            .iter()
            .zip(record.iter())
            .map(|(name, cell)| (name.to_string(), Value::from_text_cell(cell)))
            .collect();
        rows.push(row);
    }
    Ok(rows)
}

fn parse_json<R: Read>(path: &Path, reader: R) -> Result<Vec<RawRow>> {
    let doc: serde_json::Value =
        serde_json::from_reader(reader).map_err(|err| dump_error(path, err.to_string()))?;
    let serde_json::Value::Array(items) = doc else {
        return Err(dump_error(path, "expected a JSON array of rows"));
    };
    items
        .into_iter()
        .enumerate()
        .map(|(idx, item)| -> Result<RawRow> {
            match item {
                serde_json::Value::Object(map) => Ok(map
                    .into_iter()
                    .map(|(name, cell)| (name, value_from_json(cell)))
                    .collect()),
                _ => Err(dump_error(path, format!("row {idx} is not a JSON object"))),
            }
        })
        .collect()
}

fn value_from_json(cell: serde_json::Value) -> Value {
    match cell {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Integer(i64::from(b)),
        serde_json::Value::Number(n) => match n.as_i64() {
            Some(int) => Value::Integer(int),
            None => n.as_f64().map_or(Value::Null, Value::Real),
        },
        serde_json::Value::String(s) => Value::Text(s),
        other => Value::Text(other.to_string()),
    }
}
