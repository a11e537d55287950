//! Collection of flat explain steps from a data source.

use tracing::{debug, warn};

use crate::error::{BoxError, PlanError, Result};
use crate::options::AnalyserOptions;
use crate::plan::PlanStep;
use crate::sql;
use crate::value::RawRow;

/// Capability to run a plan query and return its rows.
///
/// Implementations own connectivity and cancellation; the collector only
/// issues one blocking call per analysis.
pub trait PlanSource {
    /// Name used to identify the source in errors and logs.
    fn name(&self) -> &str;

    /// Executes `plan_query` and returns the result rows in the order
    /// received.
    fn execute_for_rows(&mut self, plan_query: &str) -> std::result::Result<Vec<RawRow>, BoxError>;
}

impl<S: PlanSource + ?Sized> PlanSource for &mut S {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn execute_for_rows(&mut self, plan_query: &str) -> std::result::Result<Vec<RawRow>, BoxError> {
        (**self).execute_for_rows(plan_query)
    }
}

impl<S: PlanSource + ?Sized> PlanSource for Box<S> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn execute_for_rows(&mut self, plan_query: &str) -> std::result::Result<Vec<RawRow>, BoxError> {
        (**self).execute_for_rows(plan_query)
    }
}

/// Turns an explain result into an ordered sequence of [`PlanStep`]s.
#[derive(Clone, Debug, Default)]
pub struct PlanStepCollector {
    options: AnalyserOptions,
}

impl PlanStepCollector {
    /// Creates a collector with the given options.
    pub fn new(options: AnalyserOptions) -> Self {
        Self { options }
    }

    /// Options in effect.
    pub fn options(&self) -> &AnalyserOptions {
        &self.options
    }

    /// Rejects statements that cannot produce an execution plan.
    pub fn validate(query: &str) -> Result<()> {
        if sql::is_select(query) {
            return Ok(());
        }
        let statement = sql::leading_keyword(&sql::normalize(query)).to_string();
        warn!(%statement, "refusing to explain non-SELECT statement");
        Err(PlanError::UnsupportedStatementKind { statement })
    }

    /// Validates `query`, runs its plan query on `source`, and maps every
    /// returned row to a step.
    ///
    /// The source is not called when validation fails.
    pub fn collect<S>(&self, source: &mut S, query: &str) -> Result<Vec<PlanStep>>
    where
        S: PlanSource + ?Sized,
    {
        Self::validate(query)?;
        let plan_query = self.options.plan_query(query);
        debug!(source = source.name(), %plan_query, "running plan query");
        let rows = source
            .execute_for_rows(&plan_query)
            .map_err(|err| PlanError::source_failure(source.name(), err))?;
        Ok(self.collect_rows(rows))
    }

    /// Maps pre-issued explain rows to steps, one per row, in order.
    pub fn collect_rows(&self, rows: Vec<RawRow>) -> Vec<PlanStep> {
        let group_column = self.options.group_column.as_str();
        let steps: Vec<PlanStep> = rows
            .into_iter()
            .map(|row| PlanStep::from_row(row, group_column))
            .collect();
        debug!(steps = steps.len(), group_column, "collected plan steps");
        steps
    }
}
