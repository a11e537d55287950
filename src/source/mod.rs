#![forbid(unsafe_code)]

//! [`PlanSource`](crate::collect::PlanSource) implementations.

/// Recorded explain results replayed from CSV or JSON files.
pub mod dump;

/// Live plan queries against SQLite.
pub mod sqlite;

pub use dump::{DumpFormat, DumpSource};
pub use sqlite::SqliteSource;
