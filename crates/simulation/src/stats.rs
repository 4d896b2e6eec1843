//! Run-level counters.

/// Counters accumulated over a run. All cumulative, never reset mid-run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SimulationStats {
    /// Timesteps executed.
    pub steps: u64,
    /// Nodes appended to the graph (genesis excluded).
    pub nodes_created: u64,
    /// Broadcast deliveries scheduled.
    pub messages_sent: u64,
    /// Deliveries applied to a participant's view.
    pub messages_delivered: u64,
    /// Deliveries dropped because the referenced node was missing.
    pub messages_discarded: u64,
}

/// Final outcome of a completed run, returned by the drivers alongside the
/// CSV output.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunSummary {
    /// Counters accumulated over the run.
    pub stats: SimulationStats,
    /// Simulation time of the last recorded step.
    pub final_time: f64,
    /// Total nodes in the graph at the end, genesis included.
    pub total_nodes: usize,
    /// Global tip/leaf count at the end.
    pub global_tips: usize,
}
