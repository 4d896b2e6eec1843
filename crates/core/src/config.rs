//! Per-run parameter sets.
//!
//! Defaults match the standard parameterization. Builder-style `with_*`
//! methods cover the fields tests and sweeps vary most often.

use std::path::PathBuf;
use std::str::FromStr;

use crate::SimError;

/// Tip-selection policy for tangle mode. A closed set chosen once at
/// configuration time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TipSelectionMode {
    /// Uniform draw from the local tip set.
    RandomOnly,
    /// Weighted walk from genesis biased toward deeper nodes.
    McmcOnly,
    /// Per-parent coin flip between the two strategies.
    #[default]
    Hybrid,
}

impl FromStr for TipSelectionMode {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "RANDOM_ONLY" => Ok(Self::RandomOnly),
            "MCMC_ONLY" => Ok(Self::McmcOnly),
            "HYBRID" => Ok(Self::Hybrid),
            other => Err(SimError::InvalidConfig(format!(
                "unknown tip selection mode {other:?} (expected RANDOM_ONLY, MCMC_ONLY or HYBRID)"
            ))),
        }
    }
}

impl std::fmt::Display for TipSelectionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::RandomOnly => "RANDOM_ONLY",
            Self::McmcOnly => "MCMC_ONLY",
            Self::Hybrid => "HYBRID",
        };
        f.write_str(s)
    }
}

/// Parameters for a tangle-mode run.
#[derive(Debug, Clone)]
pub struct TangleConfig {
    /// Number of simulated processes.
    pub num_processes: usize,
    /// Transaction arrival rate per process per time unit. Multiplied by
    /// the timestep and clamped to 1.0 to get the per-step emission
    /// probability.
    pub lambda_per_process: f64,
    /// Inclusive end time of the run.
    pub sim_duration: f64,
    /// Lower bound of the per-recipient broadcast delay.
    pub min_delay: f64,
    /// Upper bound of the per-recipient broadcast delay.
    pub max_delay: f64,
    /// Tip-selection policy.
    pub sel_mode: TipSelectionMode,
    /// In hybrid mode, the probability mass of the biased-walk branch.
    pub security_bias: f64,
    /// Exponent coefficient of the biased walk (`exp(alpha * height)`).
    pub alpha: f64,
    /// RNG seed.
    pub seed: u64,
    /// Metrics CSV destination.
    pub output: PathBuf,
}

impl Default for TangleConfig {
    fn default() -> Self {
        Self {
            num_processes: 10,
            lambda_per_process: 0.3,
            sim_duration: 100.0,
            min_delay: 1.0,
            max_delay: 5.0,
            sel_mode: TipSelectionMode::Hybrid,
            security_bias: 0.7,
            alpha: 0.001,
            seed: 42,
            output: PathBuf::from("tangle_results.csv"),
        }
    }
}

impl TangleConfig {
    /// Set the RNG seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set the inclusive end time.
    pub fn with_duration(mut self, sim_duration: f64) -> Self {
        self.sim_duration = sim_duration;
        self
    }

    /// Set the tip-selection policy.
    pub fn with_mode(mut self, sel_mode: TipSelectionMode) -> Self {
        self.sel_mode = sel_mode;
        self
    }

    /// Set the broadcast delay range.
    pub fn with_delays(mut self, min_delay: f64, max_delay: f64) -> Self {
        self.min_delay = min_delay;
        self.max_delay = max_delay;
        self
    }

    /// Reject malformed numeric parameters before a run starts.
    pub fn validate(&self) -> Result<(), SimError> {
        if self.num_processes == 0 {
            return Err(SimError::InvalidConfig(
                "num_processes must be at least 1".into(),
            ));
        }
        if !self.lambda_per_process.is_finite() || self.lambda_per_process < 0.0 {
            return Err(SimError::InvalidConfig(
                "lambda_per_process must be non-negative".into(),
            ));
        }
        if self.sim_duration < 0.0 {
            return Err(SimError::InvalidConfig(
                "sim_duration must be non-negative".into(),
            ));
        }
        if self.min_delay < 0.0 || self.max_delay < self.min_delay {
            return Err(SimError::InvalidConfig(
                "delay range must satisfy 0 <= min_delay <= max_delay".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.security_bias) {
            return Err(SimError::InvalidConfig(
                "security_bias must lie in [0, 1]".into(),
            ));
        }
        if self.alpha < 0.0 {
            return Err(SimError::InvalidConfig("alpha must be non-negative".into()));
        }
        Ok(())
    }
}

/// Parameters for a witness-mode run.
#[derive(Debug, Clone)]
pub struct WitnessConfig {
    /// Number of simulated users, each extending its own chain.
    pub num_users: usize,
    /// Per-step probability that a user posts a block.
    pub post_prob_per_step: f64,
    /// Inclusive end time of the run.
    pub sim_duration: f64,
    /// Lower bound of the per-recipient broadcast delay.
    pub min_delay: f64,
    /// Upper bound of the per-recipient broadcast delay.
    pub max_delay: f64,
    /// Cap on witness parents per block.
    pub max_witnesses: usize,
    /// RNG seed.
    pub seed: u64,
    /// Metrics CSV destination.
    pub output: PathBuf,
}

impl Default for WitnessConfig {
    fn default() -> Self {
        Self {
            num_users: 100,
            post_prob_per_step: 0.02,
            sim_duration: 100.0,
            min_delay: 1.0,
            max_delay: 5.0,
            max_witnesses: 3,
            seed: 1337,
            output: PathBuf::from("witness_results.csv"),
        }
    }
}

impl WitnessConfig {
    /// Set the RNG seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set the inclusive end time.
    pub fn with_duration(mut self, sim_duration: f64) -> Self {
        self.sim_duration = sim_duration;
        self
    }

    /// Set the witness cap.
    pub fn with_max_witnesses(mut self, max_witnesses: usize) -> Self {
        self.max_witnesses = max_witnesses;
        self
    }

    /// Reject malformed numeric parameters before a run starts.
    pub fn validate(&self) -> Result<(), SimError> {
        if self.num_users == 0 {
            return Err(SimError::InvalidConfig("num_users must be at least 1".into()));
        }
        if !(0.0..=1.0).contains(&self.post_prob_per_step) {
            return Err(SimError::InvalidConfig(
                "post_prob_per_step must lie in [0, 1]".into(),
            ));
        }
        if self.sim_duration < 0.0 {
            return Err(SimError::InvalidConfig(
                "sim_duration must be non-negative".into(),
            ));
        }
        if self.min_delay < 0.0 || self.max_delay < self.min_delay {
            return Err(SimError::InvalidConfig(
                "delay range must satisfy 0 <= min_delay <= max_delay".into(),
            ));
        }
        Ok(())
    }
}
