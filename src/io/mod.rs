// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! I/O layer for LCM event logs.
//!
//! This module provides the event record type, a memory-mapped log reader,
//! a log writer and channel filtering.

pub mod event;
pub mod filter;
pub mod metadata;
pub mod reader;
pub mod writer;

pub use event::{Event, EVENT_HEADER_SIZE, SYNC_WORD};
pub use filter::ChannelFilter;
pub use metadata::{ChannelInfo, LogInfo, ScanStats};
pub use reader::{EventIter, LogReader};
pub use writer::LogWriter;
