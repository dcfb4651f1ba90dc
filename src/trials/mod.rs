// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Independent simulator trials on a bounded worker pool.
//!
//! Each trial gets a private output path derived from its index, so workers
//! share no mutable state and never collide on disk. The pool is joined
//! before [`TrialPool::run`] returns. A failed trial is reported in its
//! outcome and does not stop the others.

pub mod metrics;
pub mod simulator;

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Instant;

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::TrialsConfig;

pub use metrics::{ErrorStats, TrajectoryComparison};
pub use simulator::SimulatorTrial;

/// Errors from running trials or comparing their results.
#[derive(Debug, Error)]
pub enum TrialError {
    #[error("failed to start '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },
    #[error("trial {index} exited with {status}")]
    Failed { index: usize, status: String },
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to build worker pool: {0}")]
    Pool(String),
    #[error("invalid trajectory data: {0}")]
    InvalidData(String),
}

impl TrialError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        TrialError::Io {
            path: path.into(),
            source,
        }
    }
}

/// One independent, parameterized run.
pub trait Trial: Send + Sync {
    /// Run trial `index`, writing its results under `output`.
    fn run(&self, index: usize, output: &Path) -> Result<(), TrialError>;
}

/// How a trial ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TrialStatus {
    Succeeded,
    Failed { error: String },
}

/// Result of one trial, also written to `trial_<index>.json`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrialOutcome {
    pub index: usize,
    /// Path handed to the trial for its results
    pub output: PathBuf,
    pub wall_time_s: f64,
    #[serde(flatten)]
    pub status: TrialStatus,
}

impl TrialOutcome {
    pub fn is_success(&self) -> bool {
        self.status == TrialStatus::Succeeded
    }
}

/// Fixed-size pool that runs trials and collects their outcomes.
#[derive(Debug, Clone)]
pub struct TrialPool {
    workers: usize,
    output_dir: PathBuf,
}

impl TrialPool {
    /// Create a pool. At least one worker is always used.
    pub fn new(workers: usize, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            workers: workers.max(1),
            output_dir: output_dir.into(),
        }
    }

    pub fn from_config(config: &TrialsConfig) -> Self {
        Self::new(config.workers, &config.output_dir)
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Output path reserved for trial `index`.
    pub fn output_path(&self, index: usize) -> PathBuf {
        self.output_dir.join(format!("trial_{index}"))
    }

    /// Where the outcome of trial `index` is written.
    pub fn outcome_path(&self, index: usize) -> PathBuf {
        self.output_dir.join(format!("trial_{index}.json"))
    }

    /// Run every trial and return the outcomes sorted by index.
    ///
    /// `on_outcome` is called on the calling thread as each trial finishes,
    /// in completion order.
    pub fn run<T, F>(&self, trials: &[T], mut on_outcome: F) -> Result<Vec<TrialOutcome>, TrialError>
    where
        T: Trial,
        F: FnMut(&TrialOutcome),
    {
        fs::create_dir_all(&self.output_dir).map_err(|e| TrialError::io(&self.output_dir, e))?;

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.workers)
            .thread_name(|index| format!("trial-worker-{index}"))
            .build()
            .map_err(|e| TrialError::Pool(e.to_string()))?;

        let (sender, receiver) = crossbeam_channel::unbounded();
        let mut outcomes = Vec::with_capacity(trials.len());

        std::thread::scope(|scope| {
            scope.spawn(|| {
                pool.scope(|s| {
                    for (index, trial) in trials.iter().enumerate() {
                        let sender = sender.clone();
                        s.spawn(move |_| {
                            let _ = sender.send(self.run_one(index, trial));
                        });
                    }
                });
                drop(sender);
            });

            for outcome in receiver.iter() {
                on_outcome(&outcome);
                outcomes.push(outcome);
            }
        });

        outcomes.sort_by_key(|o| o.index);
        Ok(outcomes)
    }

    fn run_one<T: Trial>(&self, index: usize, trial: &T) -> TrialOutcome {
        let output = self.output_path(index);
        let start = Instant::now();
        let status = match trial.run(index, &output) {
            Ok(()) => TrialStatus::Succeeded,
            Err(e) => {
                warn!(trial = index, error = %e, "Trial failed");
                TrialStatus::Failed {
                    error: e.to_string(),
                }
            }
        };
        let outcome = TrialOutcome {
            index,
            output,
            wall_time_s: start.elapsed().as_secs_f64(),
            status,
        };
        debug!(trial = index, elapsed = outcome.wall_time_s, "Trial finished");

        let path = self.outcome_path(index);
        let written = serde_json::to_vec_pretty(&outcome)
            .map_err(io::Error::from)
            .and_then(|json| fs::write(&path, json));
        if let Err(e) = written {
            warn!(trial = index, path = %path.display(), error = %e, "Failed to write trial outcome");
        }
        outcome
    }
}
