// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Saved-trajectory extractor.
//!
//! Planner output arrives as `lcmt_saved_traj`: a list of named blocks, each
//! a knot-time vector plus one row of knot values per datatype. Blocks that
//! store values followed by their time derivatives can be resampled as a
//! cubic Hermite spline, or as a clamped cubic spline that only uses the end
//! derivatives.

use std::collections::BTreeMap;

use serde::Serialize;

use super::Fields;
use crate::core::{LogError, Result};

const TRAJECTORY_BLOCK: &str = "lcmt_trajectory_block";

/// One named trajectory from a planner message.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrajectoryBlock {
    /// Knot times in seconds
    pub time_vec: Vec<f64>,
    /// One row per datatype, one column per knot
    pub datapoints: Vec<Vec<f64>>,
    pub datatypes: Vec<String>,
}

impl TrajectoryBlock {
    /// Number of knots.
    pub fn num_points(&self) -> usize {
        self.time_vec.len()
    }

    /// Sample the block as a cubic Hermite spline at `n` evenly spaced times.
    ///
    /// The first half of the rows are knot values and the second half their
    /// derivatives. Returns the sample times and one row per value dimension.
    pub fn hermite_sample(&self, n: usize) -> Result<(Vec<f64>, Vec<Vec<f64>>)> {
        let dim = self.check_layout("TrajectoryBlock::hermite_sample", n)?;
        let (values, slopes) = self.datapoints.split_at(dim);
        Ok(self.sample(n, values, slopes))
    }

    /// Sample the block as a clamped cubic spline at `n` evenly spaced times.
    ///
    /// Uses the value rows and only the first and last knot derivatives; the
    /// interior slopes are chosen so the second derivative is continuous.
    pub fn cubic_c2_sample(&self, n: usize) -> Result<(Vec<f64>, Vec<Vec<f64>>)> {
        let dim = self.check_layout("TrajectoryBlock::cubic_c2_sample", n)?;
        let (values, derivatives) = self.datapoints.split_at(dim);
        let slopes: Vec<Vec<f64>> = values
            .iter()
            .zip(derivatives)
            .map(|(y, dy)| clamped_slopes(&self.time_vec, y, dy[0], dy[dy.len() - 1]))
            .collect();
        Ok(self.sample(n, values, &slopes))
    }

    /// Validate a values-then-derivatives block and return the value dimension.
    fn check_layout(&self, context: &str, n: usize) -> Result<usize> {
        let invalid = |msg: String| LogError::parse(context, msg);

        let rows = self.datapoints.len();
        if rows == 0 || rows % 2 != 0 {
            return Err(invalid(format!(
                "expected an even, non-zero number of rows, got {rows}"
            )));
        }
        let knots = self.time_vec.len();
        if knots < 2 {
            return Err(invalid(format!("need at least two knots, got {knots}")));
        }
        if let Some(row) = self.datapoints.iter().position(|r| r.len() != knots) {
            return Err(invalid(format!(
                "row {row} has {} points, time_vec has {knots}",
                self.datapoints[row].len()
            )));
        }
        if self.time_vec.windows(2).any(|w| w[1] <= w[0]) {
            return Err(invalid("time_vec is not strictly increasing".to_string()));
        }
        if n == 0 {
            return Err(invalid("sample count must be positive".to_string()));
        }
        Ok(rows / 2)
    }

    /// Evaluate piecewise cubic Hermite segments with the given knot slopes.
    fn sample(
        &self,
        n: usize,
        values: &[Vec<f64>],
        slopes: &[Vec<f64>],
    ) -> (Vec<f64>, Vec<Vec<f64>>) {
        let knots = self.time_vec.len();
        let t0 = self.time_vec[0];
        let t_end = self.time_vec[knots - 1];
        let step = if n > 1 {
            (t_end - t0) / (n - 1) as f64
        } else {
            0.0
        };
        let times: Vec<f64> = (0..n)
            .map(|k| if k + 1 == n && n > 1 { t_end } else { t0 + step * k as f64 })
            .collect();

        let mut samples = vec![Vec::with_capacity(n); values.len()];
        let mut segment = 0;
        for &t in &times {
            while segment + 2 < knots && t > self.time_vec[segment + 1] {
                segment += 1;
            }
            let (ta, tb) = (self.time_vec[segment], self.time_vec[segment + 1]);
            let h = tb - ta;
            let s = (t - ta) / h;
            let (s2, s3) = (s * s, s * s * s);
            let h00 = 2.0 * s3 - 3.0 * s2 + 1.0;
            let h10 = s3 - 2.0 * s2 + s;
            let h01 = -2.0 * s3 + 3.0 * s2;
            let h11 = s3 - s2;

            for (d, out) in samples.iter_mut().enumerate() {
                let (y, m) = (&values[d], &slopes[d]);
                out.push(
                    h00 * y[segment]
                        + h10 * h * m[segment]
                        + h01 * y[segment + 1]
                        + h11 * h * m[segment + 1],
                );
            }
        }

        (times, samples)
    }
}

/// Knot slopes of the clamped cubic spline through `(t, y)`.
///
/// Interior slopes solve the tridiagonal system that makes the second
/// derivative continuous at every interior knot.
fn clamped_slopes(t: &[f64], y: &[f64], start: f64, end: f64) -> Vec<f64> {
    let knots = t.len();
    let mut m = vec![0.0; knots];
    m[0] = start;
    m[knots - 1] = end;
    if knots < 3 {
        return m;
    }

    let h: Vec<f64> = t.windows(2).map(|w| w[1] - w[0]).collect();
    let d: Vec<f64> = (0..knots - 1).map(|i| (y[i + 1] - y[i]) / h[i]).collect();

    // Row i (interior knot): h[i] m[i-1] + 2 (h[i-1] + h[i]) m[i] + h[i-1] m[i+1] = rhs
    let interior = knots - 2;
    let mut diag = Vec::with_capacity(interior);
    let mut upper = Vec::with_capacity(interior);
    let mut rhs = Vec::with_capacity(interior);
    for i in 1..knots - 1 {
        let lower = h[i];
        let mut b = 2.0 * (h[i - 1] + h[i]);
        let c = h[i - 1];
        let mut r = 3.0 * (h[i] * d[i - 1] + h[i - 1] * d[i]);
        if i == 1 {
            r -= lower * start;
        }
        if i == knots - 2 {
            r -= c * end;
        }
        if let (Some(&pd), Some(&pc), Some(&pr)) = (diag.last(), upper.last(), rhs.last()) {
            let w = lower / pd;
            b -= w * pc;
            r -= w * pr;
        }
        diag.push(b);
        upper.push(c);
        rhs.push(r);
    }

    let mut next = 0.0;
    for j in (0..interior).rev() {
        let upper_term = if j + 1 < interior { upper[j] * next } else { 0.0 };
        next = (rhs[j] - upper_term) / diag[j];
        m[j + 1] = next;
    }
    m
}

/// All trajectories in one planner message, keyed by name.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SavedTrajectory {
    pub trajectories: BTreeMap<String, TrajectoryBlock>,
}

impl SavedTrajectory {
    pub fn get(&self, name: &str) -> Option<&TrajectoryBlock> {
        self.trajectories.get(name)
    }
}

pub(super) fn extract(fields: &Fields<'_>) -> Result<Option<SavedTrajectory>> {
    if fields.i64("num_trajectories")? <= 0 {
        return Ok(None);
    }

    let blocks = fields.structs("trajectories", TRAJECTORY_BLOCK)?;
    let mut trajectories = BTreeMap::new();
    for block in &blocks {
        trajectories.insert(
            block.str("trajectory_name")?.to_string(),
            TrajectoryBlock {
                time_vec: block.f64_vec("time_vec")?,
                datapoints: block.f64_matrix("datapoints")?,
                datatypes: block.string_vec("datatypes")?,
            },
        );
    }
    Ok(Some(SavedTrajectory { trajectories }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{CodecValue, DecodedMessage};
    use crate::schema::builtin;

    fn block(time_vec: Vec<f64>, rows: Vec<Vec<f64>>) -> TrajectoryBlock {
        let datatypes = (0..rows.len()).map(|i| format!("x{i}")).collect();
        TrajectoryBlock {
            time_vec,
            datapoints: rows,
            datatypes,
        }
    }

    #[test]
    fn test_hermite_reproduces_cubic() {
        // y = t^3, y' = 3t^2 is exact for a single cubic segment
        let traj = block(vec![0.0, 2.0], vec![vec![0.0, 8.0], vec![0.0, 12.0]]);
        let (times, samples) = traj.hermite_sample(5).unwrap();
        assert_eq!(times, vec![0.0, 0.5, 1.0, 1.5, 2.0]);
        for (t, y) in times.iter().zip(&samples[0]) {
            assert!((y - t * t * t).abs() < 1e-12, "t={t} y={y}");
        }
    }

    #[test]
    fn test_hermite_hits_knots() {
        let traj = block(
            vec![0.0, 1.0, 3.0],
            vec![vec![1.0, -1.0, 4.0], vec![0.0, 0.0, 0.0]],
        );
        let (times, samples) = traj.hermite_sample(4).unwrap();
        assert_eq!(times[0], 0.0);
        assert_eq!(times[3], 3.0);
        assert_eq!(samples[0][0], 1.0);
        assert_eq!(samples[0][3], 4.0);
    }

    #[test]
    fn test_cubic_c2_reproduces_cubic() {
        // y = t^3 with end slopes 0 and 27; interior derivative rows are ignored
        let traj = block(
            vec![0.0, 1.0, 2.0, 3.0],
            vec![vec![0.0, 1.0, 8.0, 27.0], vec![0.0, 100.0, -100.0, 27.0]],
        );
        let (times, samples) = traj.cubic_c2_sample(7).unwrap();
        assert_eq!(times, vec![0.0, 0.5, 1.0, 1.5, 2.0, 2.5, 3.0]);
        for (t, y) in times.iter().zip(&samples[0]) {
            assert!((y - t * t * t).abs() < 1e-9, "t={t} y={y}");
        }
    }

    #[test]
    fn test_clamped_slopes_continuous_second_derivative() {
        let t = [0.0, 1.0, 2.5, 4.0];
        let y = [0.0, 2.0, -1.0, 3.0];
        let m = clamped_slopes(&t, &y, 1.0, -2.0);
        assert_eq!(m[0], 1.0);
        assert_eq!(m[3], -2.0);

        // Second derivative of segment i at its left (s = 0) and right (s = 1) ends
        let left_end = |i: usize| {
            let h: f64 = t[i + 1] - t[i];
            -6.0 * (y[i + 1] - y[i]) / (h * h) + (2.0 * m[i] + 4.0 * m[i + 1]) / h
        };
        let right_start = |i: usize| {
            let h: f64 = t[i + 1] - t[i];
            6.0 * (y[i + 1] - y[i]) / (h * h) - (4.0 * m[i] + 2.0 * m[i + 1]) / h
        };
        for knot in 1..3 {
            let (a, b) = (left_end(knot - 1), right_start(knot));
            assert!((a - b).abs() < 1e-9, "knot {knot}: {a} vs {b}");
        }
    }

    #[test]
    fn test_cubic_c2_two_knots_matches_hermite() {
        let traj = block(vec![0.0, 2.0], vec![vec![0.0, 8.0], vec![0.0, 12.0]]);
        assert_eq!(
            traj.cubic_c2_sample(5).unwrap(),
            traj.hermite_sample(5).unwrap()
        );
        assert!(block(vec![0.0, 1.0], vec![vec![0.0, 1.0]])
            .cubic_c2_sample(3)
            .is_err());
    }

    #[test]
    fn test_hermite_rejects_bad_blocks() {
        assert!(block(vec![0.0, 1.0], vec![vec![0.0, 1.0]])
            .hermite_sample(3)
            .is_err());
        assert!(block(vec![0.0], vec![vec![0.0], vec![0.0]])
            .hermite_sample(3)
            .is_err());
        assert!(block(vec![1.0, 1.0], vec![vec![0.0, 1.0], vec![0.0, 0.0]])
            .hermite_sample(3)
            .is_err());
        assert!(block(vec![0.0, 1.0], vec![vec![0.0, 1.0], vec![0.0, 0.0]])
            .hermite_sample(0)
            .is_err());
    }

    fn saved_traj(names: &[&str]) -> DecodedMessage {
        let blocks = names
            .iter()
            .map(|name| {
                CodecValue::Struct(DecodedMessage::from([
                    ("trajectory_name".to_string(), CodecValue::String(name.to_string())),
                    ("num_points".to_string(), CodecValue::Int32(2)),
                    ("num_datatypes".to_string(), CodecValue::Int32(1)),
                    ("time_vec".to_string(), CodecValue::f64_array(&[0.0, 1.0])),
                    (
                        "datapoints".to_string(),
                        CodecValue::Array(vec![CodecValue::f64_array(&[3.0, 4.0])]),
                    ),
                    ("datatypes".to_string(), CodecValue::string_array(&["q"])),
                ]))
            })
            .collect();
        DecodedMessage::from([
            (
                "num_trajectories".to_string(),
                CodecValue::Int32(names.len() as i32),
            ),
            ("trajectories".to_string(), CodecValue::Array(blocks)),
            ("trajectory_names".to_string(), CodecValue::string_array(names)),
        ])
    }

    #[test]
    fn test_extract_keys_blocks_by_name() {
        let msg = saved_traj(&["state_traj", "lambda_traj"]);
        let traj = extract(&Fields::new(builtin::SAVED_TRAJ, &msg))
            .unwrap()
            .unwrap();
        assert_eq!(traj.trajectories.len(), 2);
        let state = traj.get("state_traj").unwrap();
        assert_eq!(state.num_points(), 2);
        assert_eq!(state.datapoints, vec![vec![3.0, 4.0]]);
    }

    #[test]
    fn test_extract_uses_block_names() {
        // The message-level name list disagrees with the blocks
        let mut msg = saved_traj(&["com", "swing_foot", "pelvis"]);
        msg.insert(
            "trajectory_names".to_string(),
            CodecValue::string_array(&["only_one"]),
        );
        let traj = extract(&Fields::new(builtin::SAVED_TRAJ, &msg))
            .unwrap()
            .unwrap();
        let names: Vec<_> = traj.trajectories.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["com", "pelvis", "swing_foot"]);
        assert!(traj.get("only_one").is_none());
    }

    #[test]
    fn test_extract_without_trajectories() {
        let msg = saved_traj(&[]);
        assert!(extract(&Fields::new(builtin::SAVED_TRAJ, &msg))
            .unwrap()
            .is_none());
    }
}
