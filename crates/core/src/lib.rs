//! Core types for the DAG-width simulator.
//!
//! This crate provides the foundational pieces shared by both simulation
//! modes:
//!
//! - [`SimRng`]: seeded deterministic random source; every stochastic
//!   decision in a run flows through one instance
//! - [`LedgerGraph`]: append-only arena of DAG nodes with global tip/leaf
//!   tracking
//! - [`TangleConfig`] / [`WitnessConfig`]: per-run parameter sets
//! - [`SimError`]: error taxonomy for setup and runtime failures
//!
//! # Determinism
//!
//! The simulation contract is bit-reproducibility: two runs with identical
//! configuration (including seed) must produce byte-identical metrics
//! output. Everything here is designed around that: the RNG is the only
//! stochastic source, all set iteration that feeds a random draw happens
//! over ordered containers, and graph ids are assigned in strict creation
//! order.

mod config;
mod error;
mod graph;
mod rng;

pub use config::{TangleConfig, TipSelectionMode, WitnessConfig};
pub use error::SimError;
pub use graph::{DagNode, LedgerGraph, NodeId, GENESIS_ID};
pub use rng::SimRng;

/// Index of a participant (process in tangle mode, user in witness mode).
///
/// Participants are created once at simulation start and iterated in
/// ascending index order; that order is part of the reproducibility
/// contract.
pub type ParticipantId = usize;
