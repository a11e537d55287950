//! Request-scoped execution plan analysis.

use tracing::{debug, info_span};

use crate::collect::{PlanSource, PlanStepCollector};
use crate::error::Result;
use crate::options::AnalyserOptions;
use crate::plan::{convert_to_plan_tree, NodeId, PlanForest};
use crate::value::RawRow;

/// Execution plan of a single query.
///
/// Holds the original query and its derived plan query; after a successful
/// [`PlanAnalyser::explain`] it also owns the reconstructed forest. Nothing is
/// shared between analysers, so independent requests never coordinate.
#[derive(Debug)]
pub struct PlanAnalyser {
    query: String,
    plan_query: String,
    collector: PlanStepCollector,
    forest: Option<PlanForest>,
}

impl PlanAnalyser {
    /// Creates an analyser using the default MySQL explain directive.
    pub fn new(query: impl Into<String>) -> Self {
        Self::with_options(query, AnalyserOptions::default())
    }

    /// Creates an analyser with explicit options.
    pub fn with_options(query: impl Into<String>, options: AnalyserOptions) -> Self {
        let query = query.into();
        let plan_query = options.plan_query(&query);
        Self {
            query,
            plan_query,
            collector: PlanStepCollector::new(options),
            forest: None,
        }
    }

    /// Original query text.
    pub fn query_string(&self) -> &str {
        &self.query
    }

    /// Query sent to the data source.
    pub fn plan_query_string(&self) -> &str {
        &self.plan_query
    }

    /// Root nodes of the plan; empty until `explain` succeeds.
    pub fn plan_nodes(&self) -> &[NodeId] {
        self.forest.as_ref().map(PlanForest::roots).unwrap_or(&[])
    }

    /// Reconstructed forest, if the query has been explained.
    pub fn plan_forest(&self) -> Option<&PlanForest> {
        self.forest.as_ref()
    }

    /// Consumes the analyser, returning the forest.
    pub fn into_forest(self) -> Option<PlanForest> {
        self.forest
    }

    /// Runs the plan query on `source` and rebuilds the plan tree.
    ///
    /// On failure any previously built forest is discarded.
    pub fn explain<S>(&mut self, source: &mut S) -> Result<&PlanForest>
    where
        S: PlanSource + ?Sized,
    {
        let span = info_span!("explain", source = source.name());
        let _guard = span.enter();
        self.forest = None;
        let steps = self.collector.collect(source, &self.query)?;
        let forest = convert_to_plan_tree(steps);
        debug!(roots = forest.len(), nodes = forest.node_count(), "plan ready");
        Ok(&*self.forest.insert(forest))
    }

    /// Rebuilds the plan tree from rows obtained elsewhere.
    ///
    /// The statement is still validated so a recorded plan is never attached
    /// to a query that could not have produced one.
    pub fn explain_rows(&mut self, rows: Vec<RawRow>) -> Result<&PlanForest> {
        self.forest = None;
        PlanStepCollector::validate(&self.query)?;
        let steps = self.collector.collect_rows(rows);
        Ok(&*self.forest.insert(convert_to_plan_tree(steps)))
    }
}
