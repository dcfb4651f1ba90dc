// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! LCM event-log reader.
//!
//! Logs are memory-mapped and walked record by record. When a record does
//! not start with the sync word, or its header lengths are implausible, the
//! reader scans forward to the next sync word and carries on. A record cut
//! off by the end of the file ends iteration.

use std::fs::File;
use std::path::Path;

use byteorder::{BigEndian, ByteOrder};
use tracing::warn;

use super::event::{Event, EVENT_HEADER_SIZE, MAX_CHANNEL_LEN, SYNC_WORD};
use super::filter::ChannelFilter;
use super::metadata::{LogInfo, ScanStats};
use crate::core::{LogError, Result};

enum Source {
    Mapped(memmap2::Mmap),
    Owned(Vec<u8>),
}

impl Source {
    fn bytes(&self) -> &[u8] {
        match self {
            Source::Mapped(mmap) => &mmap[..],
            Source::Owned(data) => data.as_slice(),
        }
    }
}

/// Reader over a complete LCM event log.
pub struct LogReader {
    path: Option<String>,
    source: Source,
    filter: ChannelFilter,
}

impl LogReader {
    /// Open and memory-map a log file.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_str = path.as_ref().to_string_lossy().to_string();

        let file = File::open(&path_str).map_err(|e| {
            LogError::parse("LogReader::open", format!("Failed to open {path_str}: {e}"))
        })?;
        let file_size = file
            .metadata()
            .map_err(|e| {
                LogError::parse("LogReader::open", format!("Failed to stat {path_str}: {e}"))
            })?
            .len();

        // Zero-length files cannot be mapped.
        let source = if file_size == 0 {
            Source::Owned(Vec::new())
        } else {
            // SAFETY: the map is read-only and logs are not modified while read.
            let mmap = unsafe { memmap2::Mmap::map(&file) }.map_err(|e| {
                LogError::parse("LogReader::open", format!("Failed to mmap {path_str}: {e}"))
            })?;
            Source::Mapped(mmap)
        };

        Ok(Self {
            path: Some(path_str),
            source,
            filter: ChannelFilter::All,
        })
    }

    /// Read a log held in memory.
    pub fn from_bytes(data: Vec<u8>) -> Self {
        Self {
            path: None,
            source: Source::Owned(data),
            filter: ChannelFilter::All,
        }
    }

    /// Only yield events whose channel passes `filter`.
    pub fn with_filter(mut self, filter: ChannelFilter) -> Self {
        self.filter = filter;
        self
    }

    /// Path of the log, if opened from disk.
    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    /// Size of the log in bytes.
    pub fn len(&self) -> usize {
        self.source.bytes().len()
    }

    /// Check if the log is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterate over events in file order.
    pub fn events(&self) -> EventIter<'_> {
        EventIter {
            data: self.source.bytes(),
            offset: 0,
            filter: &self.filter,
            stats: ScanStats::default(),
        }
    }

    /// Scan the whole log and summarize it.
    pub fn info(&self) -> LogInfo {
        let mut info = LogInfo {
            path: self.path.clone(),
            size: self.len() as u64,
            ..LogInfo::default()
        };
        let mut events = self.events();
        for event in events.by_ref() {
            info.record(&event.channel, event.timestamp, event.data.len());
        }
        info.scan = events.stats();
        info
    }
}

/// Iterator over the events of a [`LogReader`].
pub struct EventIter<'a> {
    data: &'a [u8],
    offset: usize,
    filter: &'a ChannelFilter,
    stats: ScanStats,
}

impl EventIter<'_> {
    /// Recovery counters so far.
    pub fn stats(&self) -> ScanStats {
        self.stats
    }

    /// Byte offset of the next record.
    pub fn position(&self) -> usize {
        self.offset
    }

    /// Move to the next sync word at or after `from`, or to the end.
    fn resync(&mut self, from: usize) {
        let sync = SYNC_WORD.to_be_bytes();
        let next = self.data[from.min(self.data.len())..]
            .windows(sync.len())
            .position(|w| w == sync)
            .map_or(self.data.len(), |pos| from + pos);

        let skipped = (next - self.offset) as u64;
        warn!(
            offset = self.offset,
            skipped, "Lost sync in event log, skipping to next record"
        );
        self.stats.skipped_bytes += skipped;
        self.stats.resyncs += 1;
        self.offset = next;
    }

    fn truncated(&mut self) {
        warn!(
            offset = self.offset,
            remaining = self.data.len() - self.offset,
            "Event log ends mid-record, ignoring tail"
        );
        self.stats.truncated_tail = true;
        self.offset = self.data.len();
    }
}

impl Iterator for EventIter<'_> {
    type Item = Event;

    fn next(&mut self) -> Option<Event> {
        loop {
            let remaining = self.data.len() - self.offset;
            if remaining == 0 {
                return None;
            }
            if remaining < EVENT_HEADER_SIZE {
                if self.data[self.offset..].starts_with(&SYNC_WORD.to_be_bytes()) {
                    self.truncated();
                } else {
                    self.resync(self.offset + 1);
                }
                continue;
            }

            let header = &self.data[self.offset..self.offset + EVENT_HEADER_SIZE];
            if BigEndian::read_u32(&header[0..4]) != SYNC_WORD {
                self.resync(self.offset + 1);
                continue;
            }
            let event_number = BigEndian::read_i64(&header[4..12]);
            let timestamp = BigEndian::read_i64(&header[12..20]);
            let channel_len = BigEndian::read_i32(&header[20..24]);
            let data_len = BigEndian::read_i32(&header[24..28]);

            if channel_len <= 0 || channel_len as usize >= MAX_CHANNEL_LEN || data_len < 0 {
                self.resync(self.offset + 1);
                continue;
            }

            let channel_start = self.offset + EVENT_HEADER_SIZE;
            let data_start = channel_start + channel_len as usize;
            let end = data_start + data_len as usize;
            if end > self.data.len() {
                self.truncated();
                continue;
            }

            let channel = String::from_utf8_lossy(&self.data[channel_start..data_start]);
            self.offset = end;
            if !self.filter.should_include(&channel) {
                continue;
            }
            return Some(Event {
                event_number,
                timestamp,
                channel: channel.into_owned(),
                data: self.data[data_start..end].to_vec(),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::writer::LogWriter;

    fn log_bytes(events: &[(&str, i64, &str)]) -> Vec<u8> {
        let mut writer = LogWriter::new(Vec::new());
        for (channel, ts, data) in events {
            writer.write(channel, *ts, data.as_bytes()).unwrap();
        }
        writer.finish().unwrap()
    }

    #[test]
    fn test_read_events_in_order() {
        let bytes = log_bytes(&[("A", 1, "x"), ("B", 2, ""), ("A", 3, "yz")]);
        let reader = LogReader::from_bytes(bytes);
        let events: Vec<_> = reader.events().collect();

        assert_eq!(events.len(), 3);
        assert_eq!(events[0].channel, "A");
        assert!(events[1].data.is_empty());
        assert_eq!(events[2].timestamp, 3);
        assert_eq!(events[2].event_number, 2);
    }

    #[test]
    fn test_resync_after_garbage() {
        let first = log_bytes(&[("A", 1, "x")]);
        let second = log_bytes(&[("B", 2, "y")]);
        let mut bytes = first;
        bytes.extend_from_slice(&[0xDE, 0xAD, 0xBE, 0xEF, 0x00]);
        bytes.extend_from_slice(&second);

        let reader = LogReader::from_bytes(bytes);
        let mut iter = reader.events();
        let channels: Vec<_> = iter.by_ref().map(|e| e.channel).collect();

        assert_eq!(channels, vec!["A", "B"]);
        assert_eq!(iter.stats().skipped_bytes, 5);
        assert_eq!(iter.stats().resyncs, 1);
    }

    #[test]
    fn test_truncated_tail() {
        let mut bytes = log_bytes(&[("A", 1, "x"), ("B", 2, "payload")]);
        bytes.truncate(bytes.len() - 3);

        let reader = LogReader::from_bytes(bytes);
        let mut iter = reader.events();
        let events: Vec<_> = iter.by_ref().collect();

        assert_eq!(events.len(), 1);
        assert!(iter.stats().truncated_tail);
    }

    #[test]
    fn test_bad_header_lengths_resync() {
        let good = log_bytes(&[("A", 1, "x")]);
        let mut bad = good.clone();
        // Negative data length in the first record.
        bad[24..28].copy_from_slice(&(-5i32).to_be_bytes());
        bad.extend_from_slice(&good);

        let reader = LogReader::from_bytes(bad);
        let events: Vec<_> = reader.events().collect();
        assert_eq!(events.len(), 1);
    }

    #[test]
    fn test_filter() {
        let bytes = log_bytes(&[("A", 1, "x"), ("B", 2, "y")]);
        let reader = LogReader::from_bytes(bytes).with_filter(ChannelFilter::exclude(vec!["A".into()]));
        let events: Vec<_> = reader.events().collect();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].channel, "B");
    }

    #[test]
    fn test_info() {
        let bytes = log_bytes(&[("A", 10, "x"), ("B", 20, "yy"), ("A", 40, "z")]);
        let info = LogReader::from_bytes(bytes).info();
        assert_eq!(info.event_count, 3);
        assert_eq!(info.duration(), 30);
        assert_eq!(info.channels.len(), 2);
        assert_eq!(info.channels["B"].payload_bytes, 2);
    }

    #[test]
    fn test_empty_log() {
        let reader = LogReader::from_bytes(Vec::new());
        assert!(reader.is_empty());
        assert_eq!(reader.events().count(), 0);
    }

    #[test]
    fn test_open_missing_file() {
        let err = LogReader::open("/nonexistent/lcmlog-test.log").err().unwrap();
        assert!(err.to_string().contains("Failed to open"));
    }
}
