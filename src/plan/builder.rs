//! Reconstruction of the plan tree from flat explain steps.
//!
//! MySQL reports one explain row per table access and ties the rows of a
//! query block together through the `id` column. The builder walks ids
//! upward from 1, joins the rows of each block left-deep, and appends
//! whatever was never claimed by a block after the grouped roots.

use rustc_hash::FxHashSet;
use tracing::{debug, trace};

use super::node::{NodeId, PlanForest, StepIndex};
use super::step::PlanStep;

/// Converts flat explain steps into a forest of plan trees.
///
/// Roots are ordered by ascending group id (stopping at the first id with no
/// step), followed by every unclaimed step in source order. This function is
/// total: malformed ids only change which pass a step is emitted by.
pub fn convert_to_plan_tree(steps: Vec<PlanStep>) -> PlanForest {
    let mut forest = PlanForest::with_steps(steps);
    let total = forest.steps().len();

    if total == 1 {
        let leaf = forest.push_leaf(StepIndex(0));
        forest.push_root(leaf);
        debug!(steps = total, roots = 1, "single-step plan");
        return forest;
    }

    let mut parsed: FxHashSet<StepIndex> = FxHashSet::default();
    for id in 1_i64.. {
        let group = steps_with_group(forest.steps(), id);
        let Some((&first, rest)) = group.split_first() else {
            trace!(group_id = id, "no steps for group id, grouping stops");
            break;
        };
        let root = if rest.is_empty() {
            forest.push_leaf(first)
        } else {
            join_group(&mut forest, first, rest)
        };
        trace!(group_id = id, steps = group.len(), "grouped plan steps");
        forest.push_root(root);
        parsed.extend(group);
    }

    let mut leftovers = 0usize;
    for index in (0..total).map(StepIndex) {
        if !parsed.contains(&index) {
            let leaf = forest.push_leaf(index);
            forest.push_root(leaf);
            leftovers += 1;
        }
    }

    debug!(
        steps = total,
        roots = forest.len(),
        leftovers,
        "plan tree built"
    );
    forest
}

fn steps_with_group(steps: &[PlanStep], id: i64) -> Vec<StepIndex> {
    steps
        .iter()
        .enumerate()
        .filter(|(_, step)| step.group_id() == Some(id))
        .map(|(index, _)| StepIndex(index))
        .collect()
}

/// Folds a group left-deep: `Join(Join(first, rest[0]), rest[1])`, ...
///
/// Every join inherits the parent of the group's first node. Only the
/// outermost join is returned; the intermediate joins hang off its left
/// chain and are never listed as roots.
fn join_group(forest: &mut PlanForest, first: StepIndex, rest: &[StepIndex]) -> NodeId {
    let head = forest.push_leaf(first);
    let parent = forest.parent(head);
    let mut running = head;
    for &step in rest {
        let right = forest.push_leaf(step);
        running = forest.push_join(running, right, parent);
    }
    running
}
