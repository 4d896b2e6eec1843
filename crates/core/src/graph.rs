//! Append-only DAG arena with global tip tracking.
//!
//! Nodes live in a flat arena indexed by creation order; all edges are id
//! references, never owning links. A parent's `children` list is a pure
//! back-reference; node lifetime is governed solely by the arena.

use std::collections::BTreeSet;

use crate::ParticipantId;

/// Identifier of a DAG node. Assigned in strict creation order; id 0 is
/// always the genesis node.
pub type NodeId = usize;

/// Id of the genesis node present in every graph.
pub const GENESIS_ID: NodeId = 0;

/// A single node in the ledger DAG.
///
/// In tangle mode a node is a transaction (`owner` is `None`); in witness
/// mode it is a block owned by the creating user. Genesis has no owner in
/// either mode.
#[derive(Debug, Clone)]
pub struct DagNode {
    /// Creation-order id.
    pub id: NodeId,
    /// Simulation time of creation.
    pub timestamp: f64,
    /// `1 + max(parent heights)`; 0 for genesis. Used as the bias signal
    /// for weighted walks.
    pub height: u32,
    /// Creating user, or `None` for genesis and tangle transactions.
    pub owner: Option<ParticipantId>,
    /// Referenced predecessors. Every parent id is strictly less than this
    /// node's own id.
    pub parents: Vec<NodeId>,
    /// Nodes that reference this one as a parent. Populated incrementally
    /// as later nodes are created.
    pub children: Vec<NodeId>,
}

/// Append-only store of DAG nodes plus the global tip/leaf set.
///
/// The tip set is ground truth (independent of any participant's local
/// knowledge) and is kept in a `BTreeSet` so iteration order is
/// deterministic.
#[derive(Debug, Clone)]
pub struct LedgerGraph {
    nodes: Vec<DagNode>,
    tips: BTreeSet<NodeId>,
}

impl LedgerGraph {
    /// Create a graph containing only the genesis node (id 0, timestamp 0,
    /// height 0, no parents, no owner).
    pub fn with_genesis() -> Self {
        let genesis = DagNode {
            id: GENESIS_ID,
            timestamp: 0.0,
            height: 0,
            owner: None,
            parents: Vec::new(),
            children: Vec::new(),
        };
        let mut tips = BTreeSet::new();
        tips.insert(GENESIS_ID);
        Self {
            nodes: vec![genesis],
            tips,
        }
    }

    /// Append a new node referencing `parents` and return its id.
    ///
    /// Records the child back-reference on every parent, removes each
    /// parent from the global tip set (idempotently; duplicate parents
    /// are allowed and only produce duplicate edges), and inserts the new
    /// node as a tip.
    ///
    /// Panics in debug builds if a parent id does not precede the new id;
    /// ids increase monotonically so the graph is acyclic by construction.
    pub fn add_node(
        &mut self,
        timestamp: f64,
        owner: Option<ParticipantId>,
        parents: Vec<NodeId>,
    ) -> NodeId {
        let id = self.nodes.len();
        debug_assert!(parents.iter().all(|&p| p < id), "parent must precede child");

        let height = parents
            .iter()
            .map(|&p| self.nodes[p].height)
            .max()
            .map_or(0, |h| h + 1);

        for &p in &parents {
            self.nodes[p].children.push(id);
            self.tips.remove(&p);
        }

        self.nodes.push(DagNode {
            id,
            timestamp,
            height,
            owner,
            parents,
            children: Vec::new(),
        });
        self.tips.insert(id);
        id
    }

    /// Look up a node by id.
    pub fn node(&self, id: NodeId) -> Option<&DagNode> {
        self.nodes.get(id)
    }

    /// Whether `id` refers to an existing node.
    pub fn contains(&self, id: NodeId) -> bool {
        id < self.nodes.len()
    }

    /// Total number of nodes, genesis included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True only for a graph with no nodes; never the case after
    /// [`with_genesis`](Self::with_genesis).
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Number of global tips (nodes with zero children in the full graph).
    pub fn tip_count(&self) -> usize {
        self.tips.len()
    }

    /// Iterate the global tip set in ascending id order.
    pub fn tips(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.tips.iter().copied()
    }

    /// Iterate all nodes in creation order.
    pub fn iter(&self) -> impl Iterator<Item = &DagNode> {
        self.nodes.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn genesis_only_graph() {
        let graph = LedgerGraph::with_genesis();
        assert_eq!(graph.len(), 1);
        assert_eq!(graph.tip_count(), 1);
        let genesis = graph.node(GENESIS_ID).unwrap();
        assert!(genesis.parents.is_empty());
        assert_eq!(genesis.height, 0);
        assert_eq!(genesis.owner, None);
    }

    #[test]
    fn add_node_updates_tips_and_children() {
        let mut graph = LedgerGraph::with_genesis();
        let a = graph.add_node(1.0, None, vec![GENESIS_ID]);
        assert_eq!(a, 1);
        assert_eq!(graph.tip_count(), 1);
        assert_eq!(graph.tips().collect::<Vec<_>>(), vec![a]);
        assert_eq!(graph.node(GENESIS_ID).unwrap().children, vec![a]);
        assert_eq!(graph.node(a).unwrap().height, 1);

        let b = graph.add_node(2.0, None, vec![GENESIS_ID, a]);
        assert_eq!(graph.tips().collect::<Vec<_>>(), vec![b]);
        assert_eq!(graph.node(b).unwrap().height, 2);
    }

    #[test]
    fn duplicate_parents_produce_duplicate_edges() {
        let mut graph = LedgerGraph::with_genesis();
        let a = graph.add_node(1.0, None, vec![GENESIS_ID, GENESIS_ID]);
        assert_eq!(graph.node(GENESIS_ID).unwrap().children, vec![a, a]);
        assert_eq!(graph.tip_count(), 1);
    }

    #[test]
    fn parents_always_precede_children() {
        let mut graph = LedgerGraph::with_genesis();
        let mut last = GENESIS_ID;
        for i in 0..20 {
            last = graph.add_node(i as f64, Some(i % 3), vec![last]);
        }
        for node in graph.iter() {
            for &p in &node.parents {
                assert!(p < node.id);
            }
        }
    }

    #[test]
    fn tip_iff_no_children() {
        let mut graph = LedgerGraph::with_genesis();
        let a = graph.add_node(1.0, None, vec![GENESIS_ID]);
        let b = graph.add_node(1.0, None, vec![GENESIS_ID]);
        // Genesis now has children; a and b do not.
        let tips: Vec<_> = graph.tips().collect();
        assert_eq!(tips, vec![a, b]);
        for node in graph.iter() {
            assert_eq!(tips.contains(&node.id), node.children.is_empty());
        }
    }
}
