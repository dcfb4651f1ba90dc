// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Robot state extractor.

use serde::Serialize;

use super::Fields;
use crate::core::Result;
use crate::demux::index_map::IndexMaps;

/// One robot state message, reindexed into canonical order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StateSample {
    /// Publisher time in microseconds
    pub utime: i64,
    /// Positions
    pub q: Vec<f64>,
    /// Velocities
    pub v: Vec<f64>,
    /// Measured efforts
    pub u: Vec<f64>,
    /// IMU acceleration
    pub imu_accel: [f64; 3],
}

impl StateSample {
    /// Full state `[q, v]`.
    pub fn x(&self) -> Vec<f64> {
        let mut x = Vec::with_capacity(self.q.len() + self.v.len());
        x.extend_from_slice(&self.q);
        x.extend_from_slice(&self.v);
        x
    }
}

pub(super) fn extract(
    fields: &Fields<'_>,
    maps: &IndexMaps,
    channel: &str,
    timestamp: i64,
) -> Result<StateSample> {
    let q = maps.positions.reindex(
        "positions",
        &fields.string_vec("position_names")?,
        &fields.f64_vec("position")?,
        channel,
        timestamp,
    )?;
    let v = maps.velocities.reindex(
        "velocities",
        &fields.string_vec("velocity_names")?,
        &fields.f64_vec("velocity")?,
        channel,
        timestamp,
    )?;
    let u = maps.efforts.reindex(
        "efforts",
        &fields.string_vec("effort_names")?,
        &fields.f64_vec("effort")?,
        channel,
        timestamp,
    )?;

    Ok(StateSample {
        utime: fields.i64("utime")?,
        q,
        v,
        u,
        imu_accel: fields.vec3("imu_accel")?,
    })
}
