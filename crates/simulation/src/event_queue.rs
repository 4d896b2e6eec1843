//! Delayed-delivery queue with deterministic ordering.
//!
//! Broadcasting a node schedules one [`Delivery`] per recipient at
//! `now + delay`. Entries are ordered by:
//!
//! 1. Delivery time (earlier first)
//! 2. Insertion sequence (FIFO for equal times)
//!
//! Time ties break by queue insertion order, which in turn is influenced
//! by RNG draw order; the sequence counter pins that order down so an
//! unstable heap can never introduce non-determinism.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use dagwidth_core::{NodeId, ParticipantId};

/// Key for ordering deliveries in the queue.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeliveryKey {
    /// When this delivery becomes visible.
    pub time: f64,
    /// Insertion counter for deterministic FIFO ordering of time ties.
    pub sequence: u64,
}

impl Eq for DeliveryKey {}

impl Ord for DeliveryKey {
    fn cmp(&self, other: &Self) -> Ordering {
        // Delivery times are finite by construction; total_cmp gives a
        // total order without an Ord impl on f64.
        self.time
            .total_cmp(&other.time)
            .then(self.sequence.cmp(&other.sequence))
    }
}

impl PartialOrd for DeliveryKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// A scheduled knowledge update: `node` becomes visible to `receiver` at
/// the key's delivery time. Consumed exactly once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Delivery {
    /// The participant that learns about the node.
    pub receiver: ParticipantId,
    /// The node being delivered.
    pub node: NodeId,
}

/// Time-ordered delayed-delivery queue.
#[derive(Debug, Default)]
pub struct EventQueue {
    queue: BTreeMap<DeliveryKey, Delivery>,
    sequence: u64,
}

impl EventQueue {
    /// Create an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule `node` for delivery to `receiver` at `time`.
    pub fn schedule(&mut self, time: f64, receiver: ParticipantId, node: NodeId) {
        self.sequence += 1;
        let key = DeliveryKey {
            time,
            sequence: self.sequence,
        };
        self.queue.insert(key, Delivery { receiver, node });
    }

    /// Pop the earliest delivery if it is due at or before `now`.
    ///
    /// Repeated calls drain due deliveries in non-decreasing time order,
    /// ties in insertion order.
    pub fn pop_due(&mut self, now: f64) -> Option<Delivery> {
        let (&key, _) = self.queue.first_key_value()?;
        if key.time > now {
            return None;
        }
        self.queue.remove(&key)
    }

    /// Number of pending deliveries.
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Whether any deliveries are pending.
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}
