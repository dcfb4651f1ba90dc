// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Controller debug (OSC) extractor.
//!
//! Each message carries a variable set of named tracking signals. A series
//! is created the first time a name appears and every later appearance is
//! appended to it, tagged with the event timestamp.

use std::collections::BTreeMap;

use serde::Serialize;

use super::Fields;
use crate::core::Result;
use crate::demux::accumulator::TimeSeries;

const TRACKING_DATA: &str = "lcmt_osc_tracking_data";

/// One tracking signal at one controller step.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrackingSample {
    pub is_active: bool,
    pub y: Vec<f64>,
    pub y_des: Vec<f64>,
    pub error_y: Vec<f64>,
    pub ydot: Vec<f64>,
    pub ydot_des: Vec<f64>,
    pub error_ydot: Vec<f64>,
    pub yddot_des: Vec<f64>,
    pub yddot_command: Vec<f64>,
    pub yddot_command_sol: Vec<f64>,
}

/// Per-message scalars.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct OscFrame {
    /// Controller time in microseconds
    pub utime: i64,
    /// Finite state machine state
    pub fsm_state: f64,
}

/// Everything one OSC message contributes.
#[derive(Debug, Clone, PartialEq)]
pub struct OscUpdate {
    pub frame: OscFrame,
    /// Signals in message order
    pub signals: Vec<(String, TrackingSample)>,
}

/// Controller debug output accumulated over a log.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct OscTable {
    /// One frame per message
    pub frames: TimeSeries<OscFrame>,
    /// Per-signal series keyed by tracking data name
    pub signals: BTreeMap<String, TimeSeries<TrackingSample>>,
}

impl OscTable {
    pub(super) fn commit(&mut self, timestamp: i64, update: OscUpdate) {
        self.frames.push(timestamp, update.frame);
        for (name, sample) in update.signals {
            self.signals.entry(name).or_default().push(timestamp, sample);
        }
    }

    /// Series for one tracking signal.
    pub fn signal(&self, name: &str) -> Option<&TimeSeries<TrackingSample>> {
        self.signals.get(name)
    }

    /// FSM state per message.
    pub fn fsm_state(&self) -> Vec<f64> {
        self.frames.values.iter().map(|f| f.fsm_state).collect()
    }
}

pub(super) fn extract(fields: &Fields<'_>) -> Result<OscUpdate> {
    let frame = OscFrame {
        utime: fields.i64("utime")?,
        fsm_state: fields.f64("fsm_state")?,
    };

    let signals = fields
        .structs("tracking_data", TRACKING_DATA)?
        .iter()
        .map(|data| {
            let sample = TrackingSample {
                is_active: data.bool("is_active")?,
                y: data.f64_vec("y")?,
                y_des: data.f64_vec("y_des")?,
                error_y: data.f64_vec("error_y")?,
                ydot: data.f64_vec("ydot")?,
                ydot_des: data.f64_vec("ydot_des")?,
                error_ydot: data.f64_vec("error_ydot")?,
                yddot_des: data.f64_vec("yddot_des")?,
                yddot_command: data.f64_vec("yddot_command")?,
                yddot_command_sol: data.f64_vec("yddot_command_sol")?,
            };
            Ok((data.str("name")?.to_string(), sample))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(OscUpdate { frame, signals })
}
