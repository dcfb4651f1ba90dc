// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Summary metadata for an event log.

use std::collections::BTreeMap;

use serde::Serialize;

/// Per-channel statistics gathered while scanning a log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChannelInfo {
    /// Channel name
    pub name: String,
    /// Number of events on this channel
    pub event_count: u64,
    /// Total payload bytes on this channel
    pub payload_bytes: u64,
    /// Timestamp of the first event (microseconds)
    pub first_timestamp: i64,
    /// Timestamp of the last event (microseconds)
    pub last_timestamp: i64,
}

impl ChannelInfo {
    /// Create statistics for a channel seen once.
    pub fn new(name: impl Into<String>, timestamp: i64, payload_len: usize) -> Self {
        Self {
            name: name.into(),
            event_count: 1,
            payload_bytes: payload_len as u64,
            first_timestamp: timestamp,
            last_timestamp: timestamp,
        }
    }

    /// Account for another event on this channel.
    pub fn record(&mut self, timestamp: i64, payload_len: usize) {
        self.event_count += 1;
        self.payload_bytes += payload_len as u64;
        self.first_timestamp = self.first_timestamp.min(timestamp);
        self.last_timestamp = self.last_timestamp.max(timestamp);
    }

    /// Mean event rate in Hz, if the channel spans a non-zero interval.
    pub fn rate_hz(&self) -> Option<f64> {
        let span = self.last_timestamp - self.first_timestamp;
        (span > 0 && self.event_count > 1)
            .then(|| (self.event_count - 1) as f64 * 1e6 / span as f64)
    }
}

/// Counters for bytes the reader could not attribute to an event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ScanStats {
    /// Bytes skipped while hunting for the next sync word
    pub skipped_bytes: u64,
    /// Number of times the reader lost and regained sync
    pub resyncs: u64,
    /// Whether the log ended in the middle of an event
    pub truncated_tail: bool,
}

/// Summary of a whole log.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LogInfo {
    /// Path of the log, if it was read from disk
    pub path: Option<String>,
    /// Size of the log in bytes
    pub size: u64,
    /// Number of events read
    pub event_count: u64,
    /// Earliest event timestamp (microseconds)
    pub start_time: Option<i64>,
    /// Latest event timestamp (microseconds)
    pub end_time: Option<i64>,
    /// Per-channel statistics, sorted by channel name
    pub channels: BTreeMap<String, ChannelInfo>,
    /// Reader recovery counters
    pub scan: ScanStats,
}

impl LogInfo {
    /// Account for one event.
    pub fn record(&mut self, channel: &str, timestamp: i64, payload_len: usize) {
        self.event_count += 1;
        self.start_time = Some(self.start_time.map_or(timestamp, |t| t.min(timestamp)));
        self.end_time = Some(self.end_time.map_or(timestamp, |t| t.max(timestamp)));
        match self.channels.get_mut(channel) {
            Some(info) => info.record(timestamp, payload_len),
            None => {
                self.channels.insert(
                    channel.to_string(),
                    ChannelInfo::new(channel, timestamp, payload_len),
                );
            }
        }
    }

    /// Duration covered by the log in microseconds.
    pub fn duration(&self) -> i64 {
        match (self.start_time, self.end_time) {
            (Some(start), Some(end)) => end - start,
            _ => 0,
        }
    }
}
