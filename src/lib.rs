//! Reconstruction of query execution plan trees from flat explain output.
//!
//! A database's explain facility reports one row per plan step and links the
//! rows of a query block through a shared identifier. This crate collects
//! those rows from a [`PlanSource`], then rebuilds the plan as an ordered
//! forest of [`PlanNode`]s in which steps sharing an identifier are joined
//! left-deep.
//!
//! ```
//! use plantree::{PlanAnalyser, RawRow, source::DumpSource};
//!
//! let rows = vec![
//!     RawRow::new().with("id", 1_i64).with("table", "orders"),
//!     RawRow::new().with("id", 1_i64).with("table", "customers"),
//! ];
//! let mut source = DumpSource::from_rows("recorded", rows);
//! let mut analyser = PlanAnalyser::new("SELECT * FROM orders JOIN customers");
//! let forest = analyser.explain(&mut source)?;
//! assert_eq!(forest.len(), 1);
//! assert!(forest.node(forest.roots()[0]).is_join());
//! # Ok::<(), plantree::PlanError>(())
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod analyser;
pub mod collect;
/// Error types shared by collection and sources.
pub mod error;
/// Explain directive and grouping options.
pub mod options;
pub mod plan;
pub mod source;
pub mod sql;
pub mod value;

pub use analyser::PlanAnalyser;
pub use collect::{PlanSource, PlanStepCollector};
pub use error::{BoxError, PlanError, Result};
pub use options::AnalyserOptions;
pub use plan::{convert_to_plan_tree, NodeId, PlanForest, PlanNode, PlanStep, StepIndex};
pub use value::{RawRow, Value};
