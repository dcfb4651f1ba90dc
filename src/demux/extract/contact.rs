// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Contact results extractor.
//!
//! Point-pair contacts are sorted into a left and a right slot by looking for
//! `"left"`, then `"right"`, in `body1_name`. Each side keeps only its first
//! contact per step; later ones on the same side are discarded and counted.
//! A side without contact gets zero force at the origin.

use serde::Serialize;
use tracing::debug;

use super::Fields;
use crate::core::Result;
use crate::demux::accumulator::TimeSeries;

const POINT_PAIR_INFO: &str = "lcmt_point_pair_contact_info_for_viz";

/// Slot index of the left foot.
pub const LEFT: usize = 0;
/// Slot index of the right foot.
pub const RIGHT: usize = 1;

/// Contact forces and locations for one step, indexed by [`LEFT`] / [`RIGHT`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ContactSample {
    /// Simulator time from the message, in microseconds
    pub timestamp: i64,
    pub force: [[f64; 3]; 2],
    pub point: [[f64; 3]; 2],
}

/// One contact message, partitioned.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContactUpdate {
    pub sample: ContactSample,
    /// Same-side contacts beyond the first
    pub discarded: u64,
    /// Contacts whose body name matched neither side
    pub unassigned: u64,
}

/// Contact slots accumulated over a log.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ContactTable {
    pub samples: TimeSeries<ContactSample>,
    /// Total same-side contacts dropped
    pub discarded: u64,
    /// Total contacts on neither side
    pub unassigned: u64,
}

impl ContactTable {
    pub(super) fn commit(&mut self, timestamp: i64, update: ContactUpdate) {
        self.samples.push(timestamp, update.sample);
        self.discarded += update.discarded;
        self.unassigned += update.unassigned;
    }

    /// Force history of one side.
    pub fn forces(&self, side: usize) -> Vec<[f64; 3]> {
        self.samples.values.iter().map(|s| s.force[side]).collect()
    }
}

pub(super) fn extract(fields: &Fields<'_>) -> Result<ContactUpdate> {
    let timestamp = fields.i64("timestamp")?;
    let mut sample = ContactSample {
        timestamp,
        force: [[0.0; 3]; 2],
        point: [[0.0; 3]; 2],
    };
    let mut filled = [false; 2];
    let mut discarded = 0;
    let mut unassigned = 0;

    for info in fields.structs("point_pair_contact_info", POINT_PAIR_INFO)? {
        let body = info.str("body1_name")?;
        let side = if body.contains("left") {
            LEFT
        } else if body.contains("right") {
            RIGHT
        } else {
            unassigned += 1;
            continue;
        };

        if filled[side] {
            debug!(timestamp, body, "Extra contact on the same side, discarding");
            discarded += 1;
            continue;
        }
        sample.force[side] = info.vec3("contact_force")?;
        sample.point[side] = info.vec3("contact_point")?;
        filled[side] = true;
    }

    Ok(ContactUpdate {
        sample,
        discarded,
        unassigned,
    })
}
