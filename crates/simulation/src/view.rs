//! Per-participant local knowledge.
//!
//! A participant only learns about a node once the corresponding delivery
//! fires, so its view of the DAG lags the ground truth by the simulated
//! network delay. Tip status is always relative to that partial view: a
//! child that exists globally but is not yet known locally does not
//! disqualify its parent from being a local tip.

use std::collections::{BTreeSet, HashSet};

use dagwidth_core::{LedgerGraph, NodeId, ParticipantId, GENESIS_ID};

/// Local knowledge of a tangle-mode process: the set of known node ids and
/// the subset of those that are tips in this process's view.
///
/// The tip set is a `BTreeSet` so that a uniform index draw over it selects
/// deterministically.
#[derive(Debug, Clone)]
pub struct ProcessView {
    id: ParticipantId,
    known: HashSet<NodeId>,
    tips: BTreeSet<NodeId>,
}

impl ProcessView {
    /// Create a view that knows only the genesis node, which starts as the
    /// sole local tip.
    pub fn new(id: ParticipantId) -> Self {
        let mut known = HashSet::new();
        known.insert(GENESIS_ID);
        let mut tips = BTreeSet::new();
        tips.insert(GENESIS_ID);
        Self { id, known, tips }
    }

    /// The owning process id.
    pub fn id(&self) -> ParticipantId {
        self.id
    }

    /// Whether this process has learned about `node`.
    pub fn knows(&self, node: NodeId) -> bool {
        self.known.contains(&node)
    }

    /// Number of known nodes.
    pub fn known_count(&self) -> usize {
        self.known.len()
    }

    /// Number of local tips.
    pub fn tip_count(&self) -> usize {
        self.tips.len()
    }

    /// Iterate the local tip set in ascending id order.
    pub fn tips(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.tips.iter().copied()
    }

    /// The `k`-th local tip in ascending id order. `k` must be in range.
    pub(crate) fn tip_at(&self, k: usize) -> NodeId {
        debug_assert!(k < self.tips.len());
        self.tips.iter().copied().nth(k).unwrap_or(GENESIS_ID)
    }

    /// Learn about `node`. Idempotent.
    ///
    /// Evaluation order matters: first every already-known parent loses
    /// its tip status (it now has a known child), then the node itself is
    /// inserted as a tip iff none of its children are known. A node can be
    /// a parent of something known and still need its own tip evaluation.
    pub fn receive(&mut self, graph: &LedgerGraph, node: NodeId) {
        if !self.known.insert(node) {
            return;
        }
        let Some(entry) = graph.node(node) else {
            return;
        };

        for &p in &entry.parents {
            if self.known.contains(&p) {
                self.tips.remove(&p);
            }
        }

        let has_known_child = entry.children.iter().any(|c| self.known.contains(c));
        if !has_known_child {
            self.tips.insert(node);
        }
    }
}

/// Local knowledge of a witness-mode user.
///
/// No local tip set here: witness selection scans the full knowledge set
/// for the most recent block per other user. The set is ordered so that
/// scan is deterministic.
#[derive(Debug, Clone)]
pub struct UserState {
    id: ParticipantId,
    known: BTreeSet<NodeId>,
    last_block: Option<NodeId>,
}

impl UserState {
    /// Create a user that knows only genesis and has posted no blocks yet.
    pub fn new(id: ParticipantId) -> Self {
        let mut known = BTreeSet::new();
        known.insert(GENESIS_ID);
        Self {
            id,
            known,
            last_block: None,
        }
    }

    /// The owning user id.
    pub fn id(&self) -> ParticipantId {
        self.id
    }

    /// Whether this user has learned about `node`.
    pub fn knows(&self, node: NodeId) -> bool {
        self.known.contains(&node)
    }

    /// The id of this user's most recent own block, if any.
    pub fn last_block(&self) -> Option<NodeId> {
        self.last_block
    }

    /// Record a newly posted own block.
    pub fn record_own_block(&mut self, node: NodeId) {
        self.last_block = Some(node);
        self.known.insert(node);
    }

    /// Learn about `node`. Idempotent.
    pub fn receive(&mut self, node: NodeId) {
        self.known.insert(node);
    }

    /// Iterate known node ids in ascending order.
    pub fn known(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.known.iter().copied()
    }
}
