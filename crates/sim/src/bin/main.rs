//! DAG-width simulator CLI.
//!
//! Runs deterministic ledger-growth simulations. Single-threaded,
//! reproducible when the same seed is used.
//!
//! # Example
//!
//! ```bash
//! # Tangle mode with the default parameterization
//! dagwidth-sim tangle --seed 42 -o tangle_results.csv
//!
//! # Witness mode with a larger cap
//! dagwidth-sim witness --max-witnesses 5 --duration 5000
//!
//! # Layer a config file under the flags
//! dagwidth-sim tangle --config sweep/point3.conf --seed 7
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use dagwidth_core::{TangleConfig, TipSelectionMode, WitnessConfig};
use dagwidth_sim::{apply_tangle_file, apply_witness_file};
use dagwidth_simulation::{TangleSimulation, WitnessSimulation};

#[derive(Parser, Debug)]
#[command(name = "dagwidth-sim")]
#[command(version, about = "Deterministic DAG ledger growth simulator", long_about = None)]
struct Args {
    #[command(subcommand)]
    mode: Mode,
}

#[derive(Subcommand, Debug)]
enum Mode {
    /// Tangle-style growth: delayed partial views, two parents per
    /// transaction.
    Tangle(TangleArgs),
    /// Witness-based growth: per-user chains referencing recent foreign
    /// blocks.
    Witness(WitnessArgs),
}

#[derive(Parser, Debug)]
struct TangleArgs {
    /// Config file (`key = value` lines) layered under the flags
    #[arg(long)]
    config: Option<PathBuf>,

    /// Number of processes
    #[arg(short = 'n', long)]
    processes: Option<usize>,

    /// Transaction rate per process per time unit
    #[arg(short = 'l', long)]
    lambda: Option<f64>,

    /// Simulation duration in time units
    #[arg(short = 'd', long)]
    duration: Option<f64>,

    /// Minimum broadcast delay
    #[arg(long)]
    min_delay: Option<f64>,

    /// Maximum broadcast delay
    #[arg(long)]
    max_delay: Option<f64>,

    /// Tip selection policy (RANDOM_ONLY, MCMC_ONLY or HYBRID)
    #[arg(short = 'm', long)]
    mode: Option<TipSelectionMode>,

    /// Hybrid-mode probability of the biased-walk branch
    #[arg(long)]
    security_bias: Option<f64>,

    /// Exponent coefficient of the biased walk
    #[arg(long)]
    alpha: Option<f64>,

    /// Random seed for reproducible results
    #[arg(long)]
    seed: Option<u64>,

    /// Metrics CSV destination
    #[arg(short = 'o', long)]
    output: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct WitnessArgs {
    /// Config file (`key = value` lines) layered under the flags
    #[arg(long)]
    config: Option<PathBuf>,

    /// Number of users
    #[arg(short = 'n', long)]
    users: Option<usize>,

    /// Per-step posting probability per user
    #[arg(short = 'p', long)]
    post_prob: Option<f64>,

    /// Simulation duration in time units
    #[arg(short = 'd', long)]
    duration: Option<f64>,

    /// Minimum broadcast delay
    #[arg(long)]
    min_delay: Option<f64>,

    /// Maximum broadcast delay
    #[arg(long)]
    max_delay: Option<f64>,

    /// Cap on witness parents per block
    #[arg(short = 'w', long)]
    max_witnesses: Option<usize>,

    /// Random seed for reproducible results
    #[arg(long)]
    seed: Option<u64>,

    /// Metrics CSV destination
    #[arg(short = 'o', long)]
    output: Option<PathBuf>,
}

impl TangleArgs {
    fn into_config(self) -> Result<TangleConfig, Box<dyn std::error::Error>> {
        let mut config = TangleConfig::default();
        if let Some(path) = &self.config {
            apply_tangle_file(&mut config, path)?;
        }
        if let Some(v) = self.processes {
            config.num_processes = v;
        }
        if let Some(v) = self.lambda {
            config.lambda_per_process = v;
        }
        if let Some(v) = self.duration {
            config.sim_duration = v;
        }
        if let Some(v) = self.min_delay {
            config.min_delay = v;
        }
        if let Some(v) = self.max_delay {
            config.max_delay = v;
        }
        if let Some(v) = self.mode {
            config.sel_mode = v;
        }
        if let Some(v) = self.security_bias {
            config.security_bias = v;
        }
        if let Some(v) = self.alpha {
            config.alpha = v;
        }
        if let Some(v) = self.seed {
            config.seed = v;
        }
        if let Some(v) = self.output {
            config.output = v;
        }
        Ok(config)
    }
}

impl WitnessArgs {
    fn into_config(self) -> Result<WitnessConfig, Box<dyn std::error::Error>> {
        let mut config = WitnessConfig::default();
        if let Some(path) = &self.config {
            apply_witness_file(&mut config, path)?;
        }
        if let Some(v) = self.users {
            config.num_users = v;
        }
        if let Some(v) = self.post_prob {
            config.post_prob_per_step = v;
        }
        if let Some(v) = self.duration {
            config.sim_duration = v;
        }
        if let Some(v) = self.min_delay {
            config.min_delay = v;
        }
        if let Some(v) = self.max_delay {
            config.max_delay = v;
        }
        if let Some(v) = self.max_witnesses {
            config.max_witnesses = v;
        }
        if let Some(v) = self.seed {
            config.seed = v;
        }
        if let Some(v) = self.output {
            config.output = v;
        }
        Ok(config)
    }
}

fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    match args.mode {
        Mode::Tangle(tangle) => {
            let config = tangle.into_config()?;
            let output = config.output.clone();
            let summary = TangleSimulation::new(config)?.run_to_path()?;
            info!(
                output = %output.display(),
                nodes = summary.total_nodes,
                global_tips = summary.global_tips,
                "metrics written"
            );
        }
        Mode::Witness(witness) => {
            let config = witness.into_config()?;
            let output = config.output.clone();
            let summary = WitnessSimulation::new(config)?.run_to_path()?;
            info!(
                output = %output.display(),
                nodes = summary.total_nodes,
                global_leaves = summary.global_tips,
                "metrics written"
            );
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("warn,dagwidth_simulation=info,dagwidth_sim=info")),
        )
        .init();

    let args = Args::parse();
    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}
