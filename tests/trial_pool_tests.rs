// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Worker pool tests with in-process and external-program trials.

mod common;

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::Duration;

use common::TempDir;
use lcmlog::config::TrialsConfig;
use lcmlog::trials::{Trial, TrialError, TrialPool, TrialStatus};

/// Tracks how many trials run at the same time.
struct Concurrency {
    running: AtomicUsize,
    peak: AtomicUsize,
}

impl Concurrency {
    fn new() -> Self {
        Self {
            running: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
        }
    }
}

struct SleepTrial<'a> {
    tracker: &'a Concurrency,
}

impl Trial for SleepTrial<'_> {
    fn run(&self, index: usize, output: &Path) -> Result<(), TrialError> {
        let now = self.tracker.running.fetch_add(1, Ordering::SeqCst) + 1;
        self.tracker.peak.fetch_max(now, Ordering::SeqCst);
        thread::sleep(Duration::from_millis(20));
        self.tracker.running.fetch_sub(1, Ordering::SeqCst);
        std::fs::write(output, format!("{index}")).map_err(|source| TrialError::Io {
            path: output.to_path_buf(),
            source,
        })
    }
}

#[test]
fn test_pool_bounds_concurrency() {
    let dir = TempDir::new("pool_bound");
    let tracker = Concurrency::new();
    let trials: Vec<_> = (0..8).map(|_| SleepTrial { tracker: &tracker }).collect();
    let pool = TrialPool::new(2, dir.path());

    let mut completed = Vec::new();
    let outcomes = pool.run(&trials, |o| completed.push(o.index)).unwrap();

    assert!(tracker.peak.load(Ordering::SeqCst) <= 2);
    assert_eq!(completed.len(), 8);
    assert!(outcomes.iter().all(|o| o.is_success()));
    for (i, outcome) in outcomes.iter().enumerate() {
        assert_eq!(outcome.index, i);
        assert_eq!(outcome.output, pool.output_path(i));
        assert!(pool.outcome_path(i).exists());
    }
}

#[cfg(unix)]
#[test]
fn test_simulator_batch() {
    let dir = TempDir::new("pool_simulator");
    let script = r#"for a in "$0" "$@"; do case "$a" in --fail=true) exit 3;; --save=*) out="${a#--save=}";; esac; done; echo "$0 $*" > "$out""#;
    let config_path = dir.join("trials.toml");
    std::fs::write(
        &config_path,
        format!(
            r#"
workers = 2
output_dir = "out"

[simulator]
program = "sh"
args = ["-c", '{script}']
output_flag = "save"

[[trial]]
mu = 0.8

[[trial]]
mu = 0.5
fail = true

[[trial]]
offsets = [1, 2]
"#
        ),
    )
    .unwrap();

    let config = TrialsConfig::load(&config_path).unwrap();
    assert_eq!(config.output_dir, dir.join("out"));
    let trials = lcmlog::trials::SimulatorTrial::from_config(&config);
    let pool = TrialPool::from_config(&config);
    let outcomes = pool.run(&trials, |_| {}).unwrap();

    assert_eq!(outcomes.len(), 3);
    assert!(outcomes[0].is_success());
    assert!(matches!(outcomes[1].status, TrialStatus::Failed { .. }));
    assert!(outcomes[2].is_success());

    let first = std::fs::read_to_string(pool.output_path(0)).unwrap();
    assert!(first.contains("--mu=0.8"));
    let third = std::fs::read_to_string(pool.output_path(2)).unwrap();
    assert!(third.contains("--offsets=1,2"));

    let failed = std::fs::read_to_string(pool.outcome_path(1)).unwrap();
    assert!(failed.contains("exited with"));
}
