// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Trials command - run simulator batches and compare trajectories.

use std::fs;
use std::path::PathBuf;

use anyhow::{bail, Context as _};
use clap::Subcommand;

use super::extract::demultiplex;
use crate::common::{write_json, ProgressBar, Result};
use lcmlog::config::TrialsConfig;
use lcmlog::demux::DemuxOptions;
use lcmlog::trials::{metrics, SimulatorTrial, TrialPool};

/// Simulator trial operations.
#[derive(Subcommand, Clone, Debug)]
pub enum TrialsCmd {
    /// Run every trial in a batch config on a worker pool
    Run {
        /// Trial batch configuration (TOML)
        #[arg(value_name = "CONFIG")]
        config: PathBuf,

        /// Override the number of workers
        #[arg(short, long)]
        workers: Option<usize>,
    },

    /// Compare the robot state trajectory of two logs
    Compare {
        /// Reference log (e.g. hardware)
        #[arg(value_name = "REFERENCE")]
        reference: PathBuf,

        /// Simulated log
        #[arg(value_name = "SIM")]
        sim: PathBuf,

        /// Channel and index map configuration (TOML)
        #[arg(short, long)]
        config: PathBuf,

        /// Per-coordinate weights as a JSON array
        #[arg(long)]
        weights: Option<PathBuf>,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

impl TrialsCmd {
    pub fn run(self) -> Result<()> {
        match self {
            TrialsCmd::Run { config, workers } => cmd_run(config, workers),
            TrialsCmd::Compare {
                reference,
                sim,
                config,
                weights,
                output,
            } => cmd_compare(reference, sim, config, weights, output),
        }
    }
}

/// Cmd: Run a trial batch
fn cmd_run(config: PathBuf, workers: Option<usize>) -> Result<()> {
    let mut config = TrialsConfig::load(&config)
        .with_context(|| format!("failed to load {}", config.display()))?;
    if let Some(workers) = workers {
        config.workers = workers;
    }

    let trials = SimulatorTrial::from_config(&config);
    let pool = TrialPool::from_config(&config);
    println!(
        "Running {} trials on {} workers, output in {}",
        trials.len(),
        pool.workers(),
        pool.output_dir().display()
    );

    let progress = ProgressBar::new(trials.len() as u64, "Trials");
    let outcomes = pool.run(&trials, |_| progress.inc(1))?;
    let failed: Vec<usize> = outcomes
        .iter()
        .filter(|o| !o.is_success())
        .map(|o| o.index)
        .collect();
    progress.finish_with_message(format!("{} failed", failed.len()));

    for outcome in &outcomes {
        println!(
            "  trial {:>3}: {} ({:.2}s)",
            outcome.index,
            if outcome.is_success() { "ok" } else { "FAILED" },
            outcome.wall_time_s
        );
    }

    if !failed.is_empty() {
        bail!("{} of {} trials failed: {:?}", failed.len(), outcomes.len(), failed);
    }
    Ok(())
}

/// Cmd: Compare two logs' state trajectories
fn cmd_compare(
    reference: PathBuf,
    sim: PathBuf,
    config: PathBuf,
    weights: Option<PathBuf>,
    output: Option<PathBuf>,
) -> Result<()> {
    let weights: Option<Vec<f64>> = match weights {
        Some(path) => {
            let text = fs::read_to_string(&path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            Some(serde_json::from_str(&text)?)
        }
        None => None,
    };

    let states = |log: &PathBuf| -> Result<Vec<Vec<f64>>> {
        let options = DemuxOptions::default().with_keep_raw(false);
        let output = demultiplex(log, Some(config.as_path()), options)?;
        if output.tables.state.is_empty() {
            bail!("no robot state found in {}", log.display());
        }
        Ok(output.tables.state.values.iter().map(|s| s.x()).collect())
    };

    let comparison = metrics::compare(&states(&reference)?, &states(&sim)?, weights.as_deref())?;
    write_json(&comparison, output.as_deref())
}
