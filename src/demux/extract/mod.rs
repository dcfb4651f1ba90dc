// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Schema-specific extractors that turn decoded messages into numeric tables.
//!
//! Extraction is split in two steps. [`prepare`] reads a decoded message and
//! builds a pending row, failing without touching any table; [`ExtractedTables::commit`]
//! then appends the row and cannot fail.

pub mod contact;
pub mod input;
pub mod osc;
pub mod state;
pub mod trajectory;

use serde::Serialize;

use super::accumulator::TimeSeries;
use super::index_map::IndexMaps;
use crate::core::{CodecValue, DecodedMessage, LogError, Result};
use crate::schema::builtin;

pub use contact::{ContactSample, ContactTable, ContactUpdate, LEFT, RIGHT};
pub use input::InputSample;
pub use osc::{OscFrame, OscTable, OscUpdate, TrackingSample};
pub use state::StateSample;
pub use trajectory::{SavedTrajectory, TrajectoryBlock};

/// The extractors, one per configurable channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ExtractorKind {
    /// Robot state (`lcmt_robot_output`)
    State,
    /// Commanded efforts (`lcmt_robot_input`)
    Input,
    /// Controller debug output (`lcmt_osc_output`)
    OscDebug,
    /// Simulated contact results (`lcmt_contact_results_for_viz`)
    Contact,
    /// Planner output (`lcmt_saved_traj`)
    SavedTraj,
}

impl ExtractorKind {
    /// Every extractor.
    pub const ALL: [ExtractorKind; 5] = [
        ExtractorKind::State,
        ExtractorKind::Input,
        ExtractorKind::OscDebug,
        ExtractorKind::Contact,
        ExtractorKind::SavedTraj,
    ];

    /// Schema this extractor reads.
    pub fn schema(self) -> &'static str {
        match self {
            ExtractorKind::State => builtin::ROBOT_OUTPUT,
            ExtractorKind::Input => builtin::ROBOT_INPUT,
            ExtractorKind::OscDebug => builtin::OSC_OUTPUT,
            ExtractorKind::Contact => builtin::CONTACT_RESULTS,
            ExtractorKind::SavedTraj => builtin::SAVED_TRAJ,
        }
    }
}

/// A row built from one event, not yet appended.
#[derive(Debug, Clone, PartialEq)]
pub enum PendingRow {
    State(StateSample),
    Input(InputSample),
    Osc(OscUpdate),
    Contact(ContactUpdate),
    /// `None` for planner messages without trajectories
    SavedTraj(Option<SavedTrajectory>),
}

/// Build the pending row for one decoded message.
pub fn prepare(
    kind: ExtractorKind,
    msg: &DecodedMessage,
    maps: &IndexMaps,
    channel: &str,
    timestamp: i64,
) -> Result<PendingRow> {
    let fields = Fields::new(kind.schema(), msg);
    Ok(match kind {
        ExtractorKind::State => {
            PendingRow::State(state::extract(&fields, maps, channel, timestamp)?)
        }
        ExtractorKind::Input => {
            PendingRow::Input(input::extract(&fields, &maps.efforts, channel, timestamp)?)
        }
        ExtractorKind::OscDebug => PendingRow::Osc(osc::extract(&fields)?),
        ExtractorKind::Contact => PendingRow::Contact(contact::extract(&fields)?),
        ExtractorKind::SavedTraj => PendingRow::SavedTraj(trajectory::extract(&fields)?),
    })
}

/// Every table the extractors fill.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ExtractedTables {
    /// Reindexed robot state, keyed by event timestamp
    pub state: TimeSeries<StateSample>,
    /// Reindexed commanded efforts
    pub input: TimeSeries<InputSample>,
    /// Controller debug signals
    pub osc: OscTable,
    /// Left/right contact slots
    pub contact: ContactTable,
    /// Planner outputs that carried at least one trajectory
    pub saved_traj: TimeSeries<SavedTrajectory>,
}

impl ExtractedTables {
    /// Append a prepared row.
    pub fn commit(&mut self, timestamp: i64, row: PendingRow) {
        match row {
            PendingRow::State(sample) => self.state.push(timestamp, sample),
            PendingRow::Input(sample) => self.input.push(timestamp, sample),
            PendingRow::Osc(update) => self.osc.commit(timestamp, update),
            PendingRow::Contact(update) => self.contact.commit(timestamp, update),
            PendingRow::SavedTraj(Some(traj)) => self.saved_traj.push(timestamp, traj),
            PendingRow::SavedTraj(None) => {}
        }
    }
}

/// Typed member access on a decoded message.
pub struct Fields<'m> {
    schema: &'static str,
    msg: &'m DecodedMessage,
}

impl<'m> Fields<'m> {
    /// Wrap a message decoded with `schema`.
    pub fn new(schema: &'static str, msg: &'m DecodedMessage) -> Self {
        Self { schema, msg }
    }

    fn mistyped(&self, name: &str, expected: &str) -> LogError {
        LogError::parse(
            format!("{} message", self.schema),
            format!("member '{name}' missing or not {expected}"),
        )
    }

    /// Raw member value.
    pub fn value(&self, name: &str) -> Result<&'m CodecValue> {
        self.msg
            .get(name)
            .ok_or_else(|| self.mistyped(name, "present"))
    }

    pub fn i64(&self, name: &str) -> Result<i64> {
        self.value(name)?
            .as_i64()
            .ok_or_else(|| self.mistyped(name, "an integer"))
    }

    pub fn f64(&self, name: &str) -> Result<f64> {
        self.value(name)?
            .as_f64()
            .ok_or_else(|| self.mistyped(name, "a number"))
    }

    pub fn bool(&self, name: &str) -> Result<bool> {
        self.value(name)?
            .as_bool()
            .ok_or_else(|| self.mistyped(name, "a boolean"))
    }

    pub fn str(&self, name: &str) -> Result<&'m str> {
        self.value(name)?
            .as_str()
            .ok_or_else(|| self.mistyped(name, "a string"))
    }

    pub fn f64_vec(&self, name: &str) -> Result<Vec<f64>> {
        self.value(name)?
            .to_f64_vec()
            .ok_or_else(|| self.mistyped(name, "a numeric array"))
    }

    pub fn string_vec(&self, name: &str) -> Result<Vec<String>> {
        self.value(name)?
            .to_string_vec()
            .ok_or_else(|| self.mistyped(name, "a string array"))
    }

    /// A fixed three-element numeric array.
    pub fn vec3(&self, name: &str) -> Result<[f64; 3]> {
        let v = self.f64_vec(name)?;
        <[f64; 3]>::try_from(v.as_slice()).map_err(|_| self.mistyped(name, "a 3-vector"))
    }

    /// Rows of a two-dimensional numeric array.
    pub fn f64_matrix(&self, name: &str) -> Result<Vec<Vec<f64>>> {
        let rows = self
            .value(name)?
            .as_array()
            .ok_or_else(|| self.mistyped(name, "a 2-D numeric array"))?;
        rows.iter()
            .map(|r| {
                r.to_f64_vec()
                    .ok_or_else(|| self.mistyped(name, "a 2-D numeric array"))
            })
            .collect()
    }

    /// Elements of an array of nested structs, decoded with `schema`.
    pub fn structs(&self, name: &str, schema: &'static str) -> Result<Vec<Fields<'m>>> {
        let items = self
            .value(name)?
            .as_array()
            .ok_or_else(|| self.mistyped(name, "a struct array"))?;
        items
            .iter()
            .map(|item| {
                item.as_struct()
                    .map(|msg| Fields::new(schema, msg))
                    .ok_or_else(|| self.mistyped(name, "a struct array"))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fields_accessors() {
        let msg = DecodedMessage::from([
            ("utime".to_string(), CodecValue::Int64(5)),
            ("accel".to_string(), CodecValue::f64_array(&[1.0, 2.0, 3.0])),
            ("names".to_string(), CodecValue::string_array(&["a"])),
        ]);
        let fields = Fields::new("demo", &msg);
        assert_eq!(fields.i64("utime").unwrap(), 5);
        assert_eq!(fields.f64("utime").unwrap(), 5.0);
        assert_eq!(fields.vec3("accel").unwrap(), [1.0, 2.0, 3.0]);
        assert_eq!(fields.string_vec("names").unwrap(), vec!["a".to_string()]);
    }

    #[test]
    fn test_fields_errors_name_the_member() {
        let msg = DecodedMessage::from([("v".to_string(), CodecValue::f64_array(&[1.0]))]);
        let fields = Fields::new("demo", &msg);
        let err = fields.vec3("v").unwrap_err();
        assert!(err.to_string().contains("member 'v'"));
        assert!(fields.i64("missing").is_err());
        assert!(fields.str("v").is_err());
    }

    #[test]
    fn test_extractor_schemas_are_builtin() {
        for kind in ExtractorKind::ALL {
            assert!(builtin::KNOWN_TYPES.contains(&kind.schema()));
        }
    }

    #[test]
    fn test_commit_skips_empty_saved_traj() {
        let mut tables = ExtractedTables::default();
        tables.commit(1, PendingRow::SavedTraj(None));
        assert!(tables.saved_traj.is_empty());
    }
}
