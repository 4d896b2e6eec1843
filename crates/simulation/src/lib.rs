//! Discrete-event simulation of DAG ledger growth under two
//! parent-selection disciplines.
//!
//! Two drivers share one skeleton (fixed timestep, delayed broadcast,
//! one CSV record per step):
//!
//! - [`TangleSimulation`]: processes with delayed partial views attach
//!   two-parent transactions chosen by a [`TipSelector`] policy; the
//!   metrics track how the global and local tip sets grow.
//! - [`WitnessSimulation`]: users extend their own chains and reference a
//!   bounded number of recent blocks from other users via
//!   [`WitnessSelector`]; the metrics track the global leaf count, which
//!   stays bounded by construction.
//!
//! ```text
//!            ┌─────────────┐   schedule    ┌────────────┐
//!            │   driver    │──────────────▶│ EventQueue │
//!            │ (per step)  │◀──────────────│  (delays)  │
//!            └──────┬──────┘    pop_due    └────────────┘
//!                   │ add_node / receive
//!            ┌──────▼──────┐               ┌────────────┐
//!            │ LedgerGraph │               │ views /    │
//!            │ (ground     │               │ user state │
//!            │  truth)     │               │ (partial)  │
//!            └─────────────┘               └────────────┘
//! ```
//!
//! Both drivers are bit-reproducible: identical configuration produces
//! byte-identical CSV output. See the `dagwidth-core` crate docs for the
//! determinism contract.

mod event_queue;
mod metrics;
mod stats;
mod tangle;
mod tip_selection;
mod view;
mod witness;
mod witness_sim;

pub use event_queue::{Delivery, DeliveryKey, EventQueue};
pub use metrics::{MetricsRecord, MetricsWriter, TangleRecord, WitnessRecord};
pub use stats::{RunSummary, SimulationStats};
pub use tangle::TangleSimulation;
pub use tip_selection::{TipSelector, PARENTS_PER_TX};
pub use view::{ProcessView, UserState};
pub use witness::WitnessSelector;
pub use witness_sim::WitnessSimulation;
