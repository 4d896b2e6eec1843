//! Parent selection for tangle-mode transactions.
//!
//! All three policies operate strictly on the requesting process's local
//! view. The biased walk is the MCMC-style strategy: starting at genesis it
//! repeatedly steps to a known child chosen with weight `exp(alpha * height)`,
//! so deeper (better-validated) regions of the DAG attract the walk. The
//! walk terminates at a leaf *in the local view*, which is not necessarily
//! a global leaf.

use dagwidth_core::{LedgerGraph, NodeId, SimRng, TipSelectionMode, GENESIS_ID};

use crate::view::ProcessView;

/// Number of parents every tangle transaction references.
pub const PARENTS_PER_TX: usize = 2;

/// Selects parent nodes for a new transaction from a process's local view.
///
/// Constructed once per run from the configured policy; the policy set is
/// closed, so selection dispatches on an enum rather than dynamic trait
/// objects.
#[derive(Debug, Clone, Copy)]
pub struct TipSelector {
    mode: TipSelectionMode,
    security_bias: f64,
    alpha: f64,
}

impl TipSelector {
    /// Create a selector for the given policy.
    ///
    /// `security_bias` is the hybrid-mode probability of the biased-walk
    /// branch; `alpha` is the walk's exponent coefficient.
    pub fn new(mode: TipSelectionMode, security_bias: f64, alpha: f64) -> Self {
        Self {
            mode,
            security_bias,
            alpha,
        }
    }

    /// Select [`PARENTS_PER_TX`] parents for a new transaction.
    ///
    /// The draws are independent, so the same tip may be selected twice;
    /// deduplicating would change DAG topology statistics, so duplicates
    /// are kept.
    pub fn select_parents(
        &self,
        graph: &LedgerGraph,
        view: &ProcessView,
        rng: &mut SimRng,
    ) -> Vec<NodeId> {
        let mut parents = Vec::with_capacity(PARENTS_PER_TX);
        for _ in 0..PARENTS_PER_TX {
            let tip = match self.mode {
                TipSelectionMode::RandomOnly => uniform_tip(view, rng),
                TipSelectionMode::McmcOnly => biased_walk(graph, view, rng, self.alpha),
                TipSelectionMode::Hybrid => {
                    let r = rng.uniform_f64(0.0, 1.0);
                    if r < self.security_bias {
                        biased_walk(graph, view, rng, self.alpha)
                    } else {
                        uniform_tip(view, rng)
                    }
                }
            };
            parents.push(tip);
        }
        parents
    }
}

/// Uniform draw from the local tip set, falling back to genesis when the
/// set is transiently empty (e.g. before network delay has delivered any
/// tip).
fn uniform_tip(view: &ProcessView, rng: &mut SimRng) -> NodeId {
    let n = view.tip_count();
    if n == 0 {
        return GENESIS_ID;
    }
    view.tip_at(rng.uniform_index(n))
}

/// Cap on the walk's weight exponent. `exp(x)` overflows to infinity just
/// above 709; capping keeps every weight finite under any accepted alpha,
/// at the cost of deep-enough siblings becoming equally weighted.
const MAX_WALK_EXPONENT: f64 = 700.0;

/// Weighted walk from genesis over known children.
///
/// With `alpha = 0` every weight is 1 and the walk degenerates to a
/// uniform choice among known children.
fn biased_walk(graph: &LedgerGraph, view: &ProcessView, rng: &mut SimRng, alpha: f64) -> NodeId {
    let mut current = GENESIS_ID;

    loop {
        let Some(node) = graph.node(current) else {
            return current;
        };
        let known_children: Vec<NodeId> = node
            .children
            .iter()
            .copied()
            .filter(|&c| view.knows(c))
            .collect();

        if known_children.is_empty() {
            return current;
        }

        let weights: Vec<f64> = known_children
            .iter()
            .map(|&c| {
                let h = graph.node(c).map_or(0, |n| n.height);
                (alpha * f64::from(h)).min(MAX_WALK_EXPONENT).exp()
            })
            .collect();

        let idx = rng.weighted_index(&weights).unwrap_or(0);
        current = known_children[idx];
    }
}
