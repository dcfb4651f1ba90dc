// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Event-log record types and container constants.

use serde::Serialize;

/// Sync word that starts every event record.
pub const SYNC_WORD: u32 = 0xEDA1_DA01;

/// Fixed header size: sync, event number, timestamp, channel and data lengths.
pub const EVENT_HEADER_SIZE: usize = 4 + 8 + 8 + 4 + 4;

/// Channel names at or above this length are treated as corruption.
pub const MAX_CHANNEL_LEN: usize = 1000;

/// One record of an LCM event log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Event {
    /// Sequence number assigned by the logger
    pub event_number: i64,
    /// Receive time in microseconds
    pub timestamp: i64,
    /// Channel name
    pub channel: String,
    /// Encoded message payload
    #[serde(skip)]
    pub data: Vec<u8>,
}

impl Event {
    /// Create an event.
    pub fn new(
        event_number: i64,
        timestamp: i64,
        channel: impl Into<String>,
        data: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            event_number,
            timestamp,
            channel: channel.into(),
            data: data.into(),
        }
    }

    /// Size of this event on disk, header included.
    pub fn encoded_len(&self) -> usize {
        EVENT_HEADER_SIZE + self.channel.len() + self.data.len()
    }
}
