// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Shared helpers for integration tests: payload builders, synthetic logs
//! and scratch directories.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use lcmlog::encoding::LcmEncoder;
use lcmlog::schema::{builtin, TypeTable};
use lcmlog::{CodecValue, DecodedMessage, LogWriter};

/// Scratch directory removed on drop.
pub struct TempDir(PathBuf);

impl TempDir {
    pub fn new(name: &str) -> Self {
        let path = std::env::temp_dir().join(format!(
            "lcmlog_it_{}_{}",
            name,
            std::process::id()
        ));
        let _ = fs::remove_dir_all(&path);
        fs::create_dir_all(&path).expect("create temp dir");
        Self(path)
    }

    pub fn path(&self) -> &Path {
        &self.0
    }

    pub fn join(&self, name: &str) -> PathBuf {
        self.0.join(name)
    }
}

impl Drop for TempDir {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.0);
    }
}

fn field(name: &str, value: CodecValue) -> (String, CodecValue) {
    (name.to_string(), value)
}

fn names_and_values(pairs: &[(&str, f64)]) -> (CodecValue, CodecValue) {
    let names: Vec<&str> = pairs.iter().map(|(n, _)| *n).collect();
    let values: Vec<f64> = pairs.iter().map(|(_, v)| *v).collect();
    (CodecValue::string_array(&names), CodecValue::f64_array(&values))
}

/// Encodes built-in messages into LCM payloads.
pub struct Payloads {
    types: TypeTable,
}

impl Default for Payloads {
    fn default() -> Self {
        Self::new()
    }
}

impl Payloads {
    pub fn new() -> Self {
        Self {
            types: TypeTable::builtin().expect("built-in types parse"),
        }
    }

    pub fn encode(&self, type_name: &str, msg: &DecodedMessage) -> Vec<u8> {
        LcmEncoder::new(&self.types)
            .encode(type_name, msg)
            .expect("encode test message")
    }

    /// Robot state with the given named positions and velocities, no efforts.
    pub fn robot_output(&self, utime: i64, positions: &[(&str, f64)], velocities: &[(&str, f64)]) -> Vec<u8> {
        let (q_names, q) = names_and_values(positions);
        let (v_names, v) = names_and_values(velocities);
        let msg = DecodedMessage::from([
            field("utime", CodecValue::Int64(utime)),
            field("num_positions", CodecValue::Int32(positions.len() as i32)),
            field("num_velocities", CodecValue::Int32(velocities.len() as i32)),
            field("num_efforts", CodecValue::Int32(0)),
            field("position_names", q_names),
            field("velocity_names", v_names),
            field("effort_names", CodecValue::Array(vec![])),
            field("position", q),
            field("velocity", v),
            field("effort", CodecValue::Array(vec![])),
            field("imu_accel", CodecValue::f64_array(&[0.0, 0.0, 9.81])),
        ]);
        self.encode(builtin::ROBOT_OUTPUT, &msg)
    }

    pub fn robot_input(&self, utime: i64, efforts: &[(&str, f64)]) -> Vec<u8> {
        let (names, values) = names_and_values(efforts);
        let msg = DecodedMessage::from([
            field("utime", CodecValue::Int64(utime)),
            field("num_efforts", CodecValue::Int32(efforts.len() as i32)),
            field("effort_names", names),
            field("efforts", values),
        ]);
        self.encode(builtin::ROBOT_INPUT, &msg)
    }

    /// Contact results; each contact is `(body1_name, force, point)`.
    pub fn contact_results(&self, timestamp: i64, contacts: &[(&str, [f64; 3], [f64; 3])]) -> Vec<u8> {
        let infos = contacts
            .iter()
            .map(|(body, force, point)| {
                CodecValue::Struct(DecodedMessage::from([
                    field("timestamp", CodecValue::Int64(timestamp)),
                    field("body1_name", CodecValue::String(body.to_string())),
                    field("body2_name", CodecValue::String("ground".to_string())),
                    field("contact_point", CodecValue::f64_array(point)),
                    field("contact_force", CodecValue::f64_array(force)),
                    field("normal", CodecValue::f64_array(&[0.0, 0.0, 1.0])),
                ]))
            })
            .collect();
        let msg = DecodedMessage::from([
            field("timestamp", CodecValue::Int64(timestamp)),
            field("num_point_pair_contacts", CodecValue::Int32(contacts.len() as i32)),
            field("point_pair_contact_info", CodecValue::Array(infos)),
        ]);
        self.encode(builtin::CONTACT_RESULTS, &msg)
    }

    /// Controller debug output; each signal is `(name, y)` with one dimension.
    pub fn osc_output(&self, utime: i64, fsm_state: f64, signals: &[(&str, f64)]) -> Vec<u8> {
        let tracking = signals
            .iter()
            .map(|(name, y)| {
                let one = |v: f64| CodecValue::f64_array(&[v]);
                CodecValue::Struct(DecodedMessage::from([
                    field("name", CodecValue::String(name.to_string())),
                    field("ydim", CodecValue::Int32(1)),
                    field("ydotdim", CodecValue::Int32(1)),
                    field("is_active", CodecValue::Bool(true)),
                    field("y", one(*y)),
                    field("y_des", one(0.0)),
                    field("error_y", one(-*y)),
                    field("ydot", one(0.0)),
                    field("ydot_des", one(0.0)),
                    field("error_ydot", one(0.0)),
                    field("yddot_des", one(0.0)),
                    field("yddot_command", one(0.0)),
                    field("yddot_command_sol", one(0.0)),
                ]))
            })
            .collect();
        let msg = DecodedMessage::from([
            field("utime", CodecValue::Int64(utime)),
            field("fsm_state", CodecValue::Float64(fsm_state)),
            field("num_tracking_data", CodecValue::Int32(signals.len() as i32)),
            field("tracking_data", CodecValue::Array(tracking)),
        ]);
        self.encode(builtin::OSC_OUTPUT, &msg)
    }

    /// Planner output with one single-row trajectory per name.
    pub fn saved_traj(&self, names: &[&str], time_vec: &[f64]) -> Vec<u8> {
        let metadata = DecodedMessage::from([
            field("description", CodecValue::String(String::new())),
            field("datetime", CodecValue::String(String::new())),
            field("git_dirty_flag", CodecValue::String(String::new())),
            field("name", CodecValue::String("plan".to_string())),
            field("git_commit_hash", CodecValue::String(String::new())),
        ]);
        let blocks = names
            .iter()
            .map(|name| {
                CodecValue::Struct(DecodedMessage::from([
                    field("trajectory_name", CodecValue::String(name.to_string())),
                    field("num_points", CodecValue::Int32(time_vec.len() as i32)),
                    field("num_datatypes", CodecValue::Int32(1)),
                    field("time_vec", CodecValue::f64_array(time_vec)),
                    field(
                        "datapoints",
                        CodecValue::Array(vec![CodecValue::f64_array(time_vec)]),
                    ),
                    field("datatypes", CodecValue::string_array(&["x"])),
                ]))
            })
            .collect();
        let msg = DecodedMessage::from([
            field("metadata", CodecValue::Struct(metadata)),
            field("num_trajectories", CodecValue::Int32(names.len() as i32)),
            field("trajectories", CodecValue::Array(blocks)),
            field("trajectory_names", CodecValue::string_array(names)),
        ]);
        self.encode(builtin::SAVED_TRAJ, &msg)
    }
}

/// Serialize events into LCM log bytes.
pub fn log_bytes(events: &[(&str, i64, Vec<u8>)]) -> Vec<u8> {
    let mut writer = LogWriter::new(Vec::new());
    for (channel, timestamp, data) in events {
        writer.write(channel, *timestamp, data).expect("write event");
    }
    writer.finish().expect("finish log")
}

/// Write events to a log file.
pub fn write_log(path: &Path, events: &[(&str, i64, Vec<u8>)]) {
    fs::write(path, log_bytes(events)).expect("write log file");
}
