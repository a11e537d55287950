use std::error::Error as StdError;
use std::path::PathBuf;

use thiserror::Error;

/// Boxed error produced by a [`crate::collect::PlanSource`] round-trip.
pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, PlanError>;

/// Failures surfaced while producing an execution plan.
///
/// Tree construction itself never fails; every variant here originates in
/// statement validation or in the data-source round-trip.
#[derive(Debug, Error)]
pub enum PlanError {
    /// The normalized statement does not begin with `SELECT`.
    #[error("only SELECT statements can produce an execution plan (got '{statement}')")]
    UnsupportedStatementKind {
        /// Leading keyword (or empty) of the rejected statement.
        statement: String,
    },
    /// The plan-explain round-trip against the data source failed.
    #[error("plan query failed on {source_name}: {source}")]
    SourceQueryFailure {
        /// Name of the data source that rejected the plan query.
        source_name: String,
        /// Underlying failure reported by the source.
        #[source]
        source: BoxError,
    },
    /// A recorded explain dump could not be loaded.
    #[error("invalid plan dump {path}: {message}")]
    Dump {
        /// Path of the offending dump file.
        path: PathBuf,
        /// Human-readable reason.
        message: String,
    },
}

impl PlanError {
    /// Wraps a source failure together with the name of the source.
    pub fn source_failure(source_name: impl Into<String>, source: impl Into<BoxError>) -> Self {
        PlanError::SourceQueryFailure {
            source_name: source_name.into(),
            source: source.into(),
        }
    }

    /// Returns a machine-readable code for the error variant.
    pub fn code(&self) -> &'static str {
        match self {
            PlanError::UnsupportedStatementKind { .. } => "UnsupportedStatementKind",
            PlanError::SourceQueryFailure { .. } => "SourceQueryFailure",
            PlanError::Dump { .. } => "InvalidDump",
        }
    }
}
