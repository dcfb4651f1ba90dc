// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Append-only time series and the per-channel message store.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::core::DecodedMessage;

/// Ordered `(timestamp, value)` pairs, kept in arrival order.
///
/// Timestamps are microseconds. Nothing is sorted or deduplicated.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeSeries<T> {
    /// Timestamps in arrival order
    pub t: Vec<i64>,
    /// Values, parallel to `t`
    pub values: Vec<T>,
}

impl<T> Default for TimeSeries<T> {
    fn default() -> Self {
        Self {
            t: Vec::new(),
            values: Vec::new(),
        }
    }
}

impl<T> TimeSeries<T> {
    /// Create an empty series.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a value.
    pub fn push(&mut self, timestamp: i64, value: T) {
        self.t.push(timestamp);
        self.values.push(value);
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.t.len()
    }

    /// Check if the series is empty.
    pub fn is_empty(&self) -> bool {
        self.t.is_empty()
    }

    /// Entry at `index`.
    pub fn get(&self, index: usize) -> Option<(i64, &T)> {
        Some((*self.t.get(index)?, self.values.get(index)?))
    }

    /// Most recent entry.
    pub fn last(&self) -> Option<(i64, &T)> {
        self.len().checked_sub(1).and_then(|i| self.get(i))
    }

    /// Iterate over entries in arrival order.
    pub fn iter(&self) -> impl Iterator<Item = (i64, &T)> {
        self.t.iter().copied().zip(self.values.iter())
    }

    /// Timestamps converted to seconds.
    pub fn times_seconds(&self) -> Vec<f64> {
        self.t.iter().map(|&t| t as f64 / 1e6).collect()
    }
}

/// Every decoded message of one channel.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChannelSeries {
    /// Schema the channel is bound to
    pub schema: String,
    /// Decoded messages keyed by event timestamp
    pub messages: TimeSeries<DecodedMessage>,
}

/// Decoded messages grouped by channel.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ChannelAccumulator {
    channels: BTreeMap<String, ChannelSeries>,
}

impl ChannelAccumulator {
    /// Create an empty accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a message to its channel, creating the channel on first use.
    pub fn record(&mut self, channel: &str, schema: &str, timestamp: i64, message: DecodedMessage) {
        if !self.channels.contains_key(channel) {
            self.channels.insert(
                channel.to_string(),
                ChannelSeries {
                    schema: schema.to_string(),
                    messages: TimeSeries::new(),
                },
            );
        }
        if let Some(series) = self.channels.get_mut(channel) {
            series.messages.push(timestamp, message);
        }
    }

    /// Messages of one channel.
    pub fn get(&self, channel: &str) -> Option<&ChannelSeries> {
        self.channels.get(channel)
    }

    /// Check if a channel has any recorded message.
    pub fn contains(&self, channel: &str) -> bool {
        self.channels.contains_key(channel)
    }

    /// Iterate over channels sorted by name.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ChannelSeries)> {
        self.channels.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of channels.
    pub fn len(&self) -> usize {
        self.channels.len()
    }

    /// Check if nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    /// Total number of recorded messages.
    pub fn message_count(&self) -> usize {
        self.channels.values().map(|s| s.messages.len()).sum()
    }
}
