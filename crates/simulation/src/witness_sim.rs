//! Witness-mode driver.
//!
//! Same fixed-timestep skeleton as the tangle driver, but participants are
//! users that each extend their own chain: a new block's first parent is
//! the user's previous block (genesis for a first block) and the remaining
//! parents are witnesses picked by [`WitnessSelector`]. Witness selection
//! consumes no randomness; the only draws per step are the post checks and
//! the per-recipient broadcast delays.

use std::io::Write;

use tracing::{debug, info};

use dagwidth_core::{LedgerGraph, SimError, SimRng, WitnessConfig};

use crate::event_queue::EventQueue;
use crate::metrics::{MetricsWriter, WitnessRecord};
use crate::stats::{RunSummary, SimulationStats};
use crate::view::UserState;
use crate::witness::WitnessSelector;

const DT: f64 = 1.0;

/// A witness-mode run in progress.
pub struct WitnessSimulation {
    config: WitnessConfig,
    graph: LedgerGraph,
    users: Vec<UserState>,
    queue: EventQueue,
    selector: WitnessSelector,
    rng: SimRng,
    now: f64,
    stats: SimulationStats,
}

impl WitnessSimulation {
    /// Set up a run: validates the configuration, seeds the RNG, and gives
    /// every user a fresh genesis-only knowledge set.
    pub fn new(config: WitnessConfig) -> Result<Self, SimError> {
        config.validate()?;
        let users = (0..config.num_users).map(UserState::new).collect();
        let selector = WitnessSelector::new(config.max_witnesses);
        let rng = SimRng::from_seed(config.seed);
        Ok(Self {
            config,
            graph: LedgerGraph::with_genesis(),
            users,
            queue: EventQueue::new(),
            selector,
            rng,
            now: 0.0,
            stats: SimulationStats::default(),
        })
    }

    /// Whether the run has passed its end time.
    pub fn is_finished(&self) -> bool {
        self.now > self.config.sim_duration
    }

    /// Execute one timestep and return its metrics record.
    pub fn step(&mut self) -> WitnessRecord {
        while let Some(delivery) = self.queue.pop_due(self.now) {
            if self.graph.contains(delivery.node) {
                self.users[delivery.receiver].receive(delivery.node);
                self.stats.messages_delivered += 1;
            } else {
                self.stats.messages_discarded += 1;
            }
        }

        for uid in 0..self.config.num_users {
            let r = self.rng.uniform_f64(0.0, 1.0);
            if r >= self.config.post_prob_per_step {
                continue;
            }

            let parents =
                self.selector
                    .select_parents(&self.graph, &self.users[uid], self.config.num_users);
            let node = self.graph.add_node(self.now, Some(uid), parents);
            self.users[uid].record_own_block(node);
            self.stats.nodes_created += 1;
            debug!(node, user = uid, time = self.now, "block posted");

            for recipient in 0..self.config.num_users {
                if recipient == uid {
                    continue;
                }
                let delay = self
                    .rng
                    .uniform_f64(self.config.min_delay, self.config.max_delay);
                self.queue.schedule(self.now + delay, recipient, node);
                self.stats.messages_sent += 1;
            }
        }

        let record = WitnessRecord {
            time: self.now,
            global_leaves: self.graph.tip_count(),
            total_nodes: self.graph.len(),
        };
        self.stats.steps += 1;
        self.now += DT;
        record
    }

    /// Run to completion, writing one record per step.
    pub fn run<W: Write>(&mut self, writer: &mut MetricsWriter<W>) -> Result<RunSummary, SimError> {
        info!(
            users = self.config.num_users,
            post_prob = self.config.post_prob_per_step,
            duration = self.config.sim_duration,
            max_witnesses = self.config.max_witnesses,
            seed = self.config.seed,
            "starting witness run"
        );
        while !self.is_finished() {
            let record = self.step();
            writer.write_record(&record)?;
        }
        let summary = self.summary();
        info!(
            nodes = summary.total_nodes,
            global_leaves = summary.global_tips,
            messages = summary.stats.messages_sent,
            "witness run complete"
        );
        Ok(summary)
    }

    /// Run to completion, writing the CSV to the configured output path.
    pub fn run_to_path(&mut self) -> Result<RunSummary, SimError> {
        let output = self.config.output.clone();
        let mut writer = MetricsWriter::create::<WitnessRecord>(&output)?;
        self.run(&mut writer)
    }

    /// Snapshot of the run counters and final graph shape. Before any step
    /// has executed, `final_time` is 0.
    pub fn summary(&self) -> RunSummary {
        RunSummary {
            stats: self.stats,
            final_time: if self.stats.steps == 0 {
                0.0
            } else {
                self.now - DT
            },
            total_nodes: self.graph.len(),
            global_tips: self.graph.tip_count(),
        }
    }

    /// The ground-truth graph.
    pub fn graph(&self) -> &LedgerGraph {
        &self.graph
    }

    /// A user's local state.
    pub fn user(&self, user: usize) -> &UserState {
        &self.users[user]
    }

    /// Current simulation time (of the next step to execute).
    pub fn now(&self) -> f64 {
        self.now
    }

    /// Accumulated run counters.
    pub fn stats(&self) -> &SimulationStats {
        &self.stats
    }
}
