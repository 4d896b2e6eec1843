//! Witness selection for the bounded-width scheme.
//!
//! Each user extends its own chain and periodically references the latest
//! known block of other users ("witnesses"), which bounds the number of
//! concurrently unreferenced chain heads.

use dagwidth_core::{LedgerGraph, NodeId, GENESIS_ID};

use crate::view::UserState;

/// Selects up to `max_witnesses` witness parents for a new block.
#[derive(Debug, Clone, Copy)]
pub struct WitnessSelector {
    max_witnesses: usize,
}

impl WitnessSelector {
    /// Create a selector with the given witness cap.
    pub fn new(max_witnesses: usize) -> Self {
        Self { max_witnesses }
    }

    /// Pick witnesses from `user`'s knowledge set.
    ///
    /// Scans every known block and keeps the most recent per owner,
    /// excluding genesis (no owner) and the requesting user's own chain.
    /// Candidates are ordered by timestamp descending, with block id breaking
    /// ties deterministically, and truncated to the cap.
    pub fn select(
        &self,
        graph: &LedgerGraph,
        user: &UserState,
        num_users: usize,
    ) -> Vec<NodeId> {
        if self.max_witnesses == 0 {
            return Vec::new();
        }

        // Most recent known block per owner, indexed by owner id.
        let mut best: Vec<Option<(NodeId, f64)>> = vec![None; num_users];
        for block_id in user.known() {
            let Some(block) = graph.node(block_id) else {
                continue;
            };
            let Some(owner) = block.owner else {
                continue; // genesis
            };
            if owner == user.id() {
                continue; // own chain
            }
            match best[owner] {
                Some((_, ts)) if ts >= block.timestamp => {}
                _ => best[owner] = Some((block_id, block.timestamp)),
            }
        }

        let mut candidates: Vec<(NodeId, f64)> = best.into_iter().flatten().collect();
        candidates.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
        candidates.truncate(self.max_witnesses);
        candidates.into_iter().map(|(id, _)| id).collect()
    }

    /// Assemble the full parent list for a new block: the own-chain parent
    /// (the user's last block, or genesis for a first block) followed by
    /// the selected witnesses, skipping any witness equal to the own-chain
    /// parent to avoid a duplicate edge.
    pub fn select_parents(&self, graph: &LedgerGraph, user: &UserState, num_users: usize) -> Vec<NodeId> {
        let chain_parent = user.last_block().unwrap_or(GENESIS_ID);
        let mut parents = vec![chain_parent];
        for w in self.select(graph, user, num_users) {
            if w != chain_parent {
                parents.push(w);
            }
        }
        parents
    }
}
