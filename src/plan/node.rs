use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};

use super::step::PlanStep;

/// Handle of a node inside a [`PlanForest`].
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub struct NodeId(pub usize);

/// Position of a step in the flat input sequence.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub struct StepIndex(pub usize);

/// Node of a reconstructed plan tree.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum PlanNode {
    /// Wraps exactly one explain step.
    Leaf {
        /// Step wrapped by this node.
        step: StepIndex,
    },
    /// Synthesized pairwise join of two subtrees sharing a group id.
    Join {
        /// Running subtree built so far.
        left: NodeId,
        /// Subtree of the step joined in.
        right: NodeId,
    },
}

impl PlanNode {
    /// Returns `true` for synthesized join nodes.
    pub fn is_join(&self) -> bool {
        matches!(self, PlanNode::Join { .. })
    }
}

#[derive(Clone, Debug)]
struct NodeSlot {
    node: PlanNode,
    parent: Option<NodeId>,
}

/// Ordered sequence of rooted plan trees over an owned set of steps.
///
/// Nodes live in an arena and reference steps by index, so building the
/// forest never copies step data.
#[derive(Clone, Debug, Default)]
pub struct PlanForest {
    steps: Vec<PlanStep>,
    nodes: Vec<NodeSlot>,
    roots: Vec<NodeId>,
}

impl PlanForest {
    pub(crate) fn with_steps(steps: Vec<PlanStep>) -> Self {
        let capacity = steps.len().saturating_mul(2);
        Self {
            steps,
            nodes: Vec::with_capacity(capacity),
            roots: Vec::new(),
        }
    }

    pub(crate) fn push_leaf(&mut self, step: StepIndex) -> NodeId {
        debug_assert!(step.0 < self.steps.len());
        let id = NodeId(self.nodes.len());
        self.nodes.push(NodeSlot {
            node: PlanNode::Leaf { step },
            parent: None,
        });
        id
    }

    /// Creates a join over two detached subtrees and adopts them.
    pub(crate) fn push_join(&mut self, left: NodeId, right: NodeId, parent: Option<NodeId>) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(NodeSlot {
            node: PlanNode::Join { left, right },
            parent,
        });
        self.nodes[left.0].parent = Some(id);
        self.nodes[right.0].parent = Some(id);
        id
    }

    pub(crate) fn push_root(&mut self, id: NodeId) {
        self.roots.push(id);
    }

    /// Root nodes in output order.
    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    /// Number of roots.
    pub fn len(&self) -> usize {
        self.roots.len()
    }

    /// Returns `true` when the forest has no roots.
    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Total number of nodes, including ones reachable only by traversal.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Looks up a node.
    ///
    /// # Panics
    ///
    /// Panics if `id` did not come from this forest.
    pub fn node(&self, id: NodeId) -> &PlanNode {
        &self.nodes[id.0].node
    }

    /// Parent of `id`, `None` for roots.
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    /// Children of `id` in order: none for a leaf, `[left, right]` for a join.
    pub fn children(&self, id: NodeId) -> impl Iterator<Item = NodeId> {
        let pair = match *self.node(id) {
            PlanNode::Leaf { .. } => None,
            PlanNode::Join { left, right } => Some([left, right]),
        };
        pair.into_iter().flatten()
    }

    /// All input steps, in source order.
    pub fn steps(&self) -> &[PlanStep] {
        &self.steps
    }

    /// Step at `index`.
    pub fn step(&self, index: StepIndex) -> &PlanStep {
        &self.steps[index.0]
    }

    /// Step wrapped by `id` when it is a leaf.
    pub fn leaf_step(&self, id: NodeId) -> Option<&PlanStep> {
        match *self.node(id) {
            PlanNode::Leaf { step } => Some(self.step(step)),
            PlanNode::Join { .. } => None,
        }
    }

    /// Depth-first pre-order walk of the tree under `root`; `visit` receives
    /// each node with its depth relative to `root`.
    pub fn walk<F>(&self, root: NodeId, mut visit: F)
    where
        F: FnMut(NodeId, usize),
    {
        let mut stack = vec![(root, 0usize)];
        while let Some((id, depth)) = stack.pop() {
            visit(id, depth);
            if let PlanNode::Join { left, right } = *self.node(id) {
                stack.push((right, depth + 1));
                stack.push((left, depth + 1));
            }
        }
    }

    /// Steps under `root`, left to right.
    pub fn leaf_steps(&self, root: NodeId) -> Vec<StepIndex> {
        let mut out = Vec::new();
        self.walk(root, |id, _| {
            if let PlanNode::Leaf { step } = *self.node(id) {
                out.push(step);
            }
        });
        out
    }

    fn view(&self, id: NodeId) -> NodeView<'_> {
        NodeView { forest: self, id }
    }
}

impl Serialize for PlanForest {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.roots.len()))?;
        for root in &self.roots {
            seq.serialize_element(&self.view(*root))?;
        }
        seq.end()
    }
}

struct NodeView<'a> {
    forest: &'a PlanForest,
    id: NodeId,
}

impl Serialize for NodeView<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match *self.forest.node(self.id) {
            PlanNode::Leaf { step } => {
                let step = self.forest.step(step);
                let mut map = serializer.serialize_map(Some(3))?;
                map.serialize_entry("kind", "step")?;
                map.serialize_entry("group_id", &step.group_id())?;
                map.serialize_entry("columns", &ColumnsView(step))?;
                map.end()
            }
            PlanNode::Join { left, right } => {
                let mut map = serializer.serialize_map(Some(3))?;
                map.serialize_entry("kind", "join")?;
                map.serialize_entry("left", &self.forest.view(left))?;
                map.serialize_entry("right", &self.forest.view(right))?;
                map.end()
            }
        }
    }
}

struct ColumnsView<'a>(&'a PlanStep);

impl Serialize for ColumnsView<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let columns = self.0.columns();
        let mut map = serializer.serialize_map(Some(columns.len()))?;
        for (name, value) in columns {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}
