//! Error taxonomy.
//!
//! Setup errors (unwritable output, malformed configuration) abort a run
//! before it starts. There are no retries anywhere: a run either completes
//! and emits a full metrics series or fails before emitting any.

use std::path::PathBuf;

use thiserror::Error;

/// Errors surfaced by simulation setup and metrics output.
#[derive(Debug, Error)]
pub enum SimError {
    /// The metrics destination could not be created. Fatal for the run.
    #[error("failed to open metrics output {}: {source}", path.display())]
    OutputOpen {
        /// The destination that failed to open.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// A metrics row could not be written mid-run.
    #[error("failed to write metrics row: {0}")]
    MetricsWrite(#[from] std::io::Error),

    /// A numeric or enum parameter failed validation.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}
