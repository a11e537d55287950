#![forbid(unsafe_code)]

//! Plan steps, plan nodes, and the tree builder connecting them.

/// Reconstruction of plan trees from flat explain steps.
pub mod builder;

/// Arena-backed forest of plan nodes.
pub mod node;

/// Flat explain rows with their group identifier.
pub mod step;

pub use builder::convert_to_plan_tree;
pub use node::{NodeId, PlanForest, PlanNode, StepIndex};
pub use step::PlanStep;
