// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Error metrics between a simulated and a logged trajectory.
//!
//! Trajectories are time-major: one row per sample. Comparisons truncate
//! both to the shorter length.

use serde::Serialize;

use super::TrialError;

/// Summary statistics of a series of errors.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ErrorStats {
    pub mean: f64,
    /// Population standard deviation
    pub std: f64,
    pub max: f64,
}

impl ErrorStats {
    /// Statistics of `values`, or `None` when empty.
    pub fn from_values(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        Some(Self {
            mean,
            std: var.sqrt(),
            max,
        })
    }
}

/// Result of comparing two trajectories.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrajectoryComparison {
    /// Samples compared after truncation
    pub steps: usize,
    /// Per-sample Euclidean error norms
    pub error_norm: ErrorStats,
    /// Mean over samples of the weighted squared error
    pub weighted_mse: f64,
}

fn check_widths(a: &[Vec<f64>], b: &[Vec<f64>]) -> Result<usize, TrialError> {
    let width = a.first().or_else(|| b.first()).map_or(0, Vec::len);
    if let Some(row) = a.iter().chain(b).position(|r| r.len() != width) {
        return Err(TrialError::InvalidData(format!(
            "row {row} has width {}, expected {width}",
            a.iter().chain(b).nth(row).map_or(0, Vec::len)
        )));
    }
    Ok(width)
}

/// Euclidean norm of the difference at each sample.
pub fn row_error_norms(a: &[Vec<f64>], b: &[Vec<f64>]) -> Result<Vec<f64>, TrialError> {
    check_widths(a, b)?;
    Ok(a.iter()
        .zip(b)
        .map(|(x, y)| {
            x.iter()
                .zip(y)
                .map(|(p, q)| (p - q).powi(2))
                .sum::<f64>()
                .sqrt()
        })
        .collect())
}

/// Mean over samples of `sum_i w_i (a_i - b_i)^2`.
pub fn weighted_mse(a: &[Vec<f64>], b: &[Vec<f64>], weights: &[f64]) -> Result<f64, TrialError> {
    let width = check_widths(a, b)?;
    if weights.len() != width {
        return Err(TrialError::InvalidData(format!(
            "{} weights for rows of width {width}",
            weights.len()
        )));
    }
    let steps = a.len().min(b.len());
    if steps == 0 {
        return Err(TrialError::InvalidData("no samples to compare".to_string()));
    }
    let total: f64 = a
        .iter()
        .zip(b)
        .map(|(x, y)| {
            x.iter()
                .zip(y)
                .zip(weights)
                .map(|((p, q), w)| w * (p - q).powi(2))
                .sum::<f64>()
        })
        .sum();
    Ok(total / steps as f64)
}

/// Compare `sim` against `reference`. Unit weights are used when none are given.
pub fn compare(
    reference: &[Vec<f64>],
    sim: &[Vec<f64>],
    weights: Option<&[f64]>,
) -> Result<TrajectoryComparison, TrialError> {
    let width = check_widths(reference, sim)?;
    let unit;
    let weights = match weights {
        Some(w) => w,
        None => {
            unit = vec![1.0; width];
            unit.as_slice()
        }
    };
    let norms = row_error_norms(reference, sim)?;
    let error_norm = ErrorStats::from_values(&norms)
        .ok_or_else(|| TrialError::InvalidData("no samples to compare".to_string()))?;
    Ok(TrajectoryComparison {
        steps: norms.len(),
        error_norm,
        weighted_mse: weighted_mse(reference, sim, weights)?,
    })
}
