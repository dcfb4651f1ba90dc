// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! LCM event-log writer.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use byteorder::{BigEndian, WriteBytesExt};

use super::event::{Event, MAX_CHANNEL_LEN, SYNC_WORD};
use crate::core::{LogError, Result};

/// Writes events in the LCM event-log container format.
///
/// # Example
///
/// ```no_run
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// use lcmlog::io::LogWriter;
///
/// let mut writer = LogWriter::create("out.lcmlog")?;
/// writer.write("CASSIE_INPUT", 1_000, &[0u8; 8])?;
/// writer.finish()?;
/// # Ok(())
/// # }
/// ```
pub struct LogWriter<W: Write> {
    inner: W,
    next_event_number: i64,
    events_written: u64,
    bytes_written: u64,
}

impl LogWriter<BufWriter<File>> {
    /// Create (or truncate) a log file.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|e| {
            LogError::encode(
                "LogWriter::create",
                format!("Failed to create {}: {e}", path.display()),
            )
        })?;
        Ok(Self::new(BufWriter::new(file)))
    }
}

impl<W: Write> LogWriter<W> {
    /// Wrap a byte sink.
    pub fn new(inner: W) -> Self {
        Self {
            inner,
            next_event_number: 0,
            events_written: 0,
            bytes_written: 0,
        }
    }

    /// Append an event, numbering it sequentially. Returns the event number.
    pub fn write(&mut self, channel: &str, timestamp: i64, data: &[u8]) -> Result<i64> {
        let event_number = self.next_event_number;
        self.write_record(event_number, timestamp, channel, data)?;
        Ok(event_number)
    }

    /// Append an event keeping its original event number.
    pub fn write_event(&mut self, event: &Event) -> Result<()> {
        self.write_record(event.event_number, event.timestamp, &event.channel, &event.data)
    }

    fn write_record(
        &mut self,
        event_number: i64,
        timestamp: i64,
        channel: &str,
        data: &[u8],
    ) -> Result<()> {
        if channel.is_empty() || channel.len() >= MAX_CHANNEL_LEN {
            return Err(LogError::encode(
                "log",
                format!("channel name length {} out of range", channel.len()),
            ));
        }
        let data_len = i32::try_from(data.len()).map_err(|_| {
            LogError::encode("log", format!("payload of {} bytes too large", data.len()))
        })?;

        self.inner.write_u32::<BigEndian>(SYNC_WORD)?;
        self.inner.write_i64::<BigEndian>(event_number)?;
        self.inner.write_i64::<BigEndian>(timestamp)?;
        self.inner.write_i32::<BigEndian>(channel.len() as i32)?;
        self.inner.write_i32::<BigEndian>(data_len)?;
        self.inner.write_all(channel.as_bytes())?;
        self.inner.write_all(data)?;

        self.next_event_number = event_number.saturating_add(1);
        self.events_written += 1;
        self.bytes_written += (super::event::EVENT_HEADER_SIZE + channel.len() + data.len()) as u64;
        Ok(())
    }

    /// Number of events written so far.
    pub fn events_written(&self) -> u64 {
        self.events_written
    }

    /// Number of bytes written so far.
    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }

    /// Flush and return the underlying sink.
    pub fn finish(mut self) -> Result<W> {
        self.inner.flush()?;
        Ok(self.inner)
    }
}
