// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! # lcmlog
//!
//! LCM event-log demultiplexing for legged-robot controller logs.
//!
//! A log interleaves many channels, each carrying one LCM message type that
//! is not recorded in the file. This library classifies each channel by
//! trying the known message types against its first payload, decodes every
//! later payload with the bound type, and turns robot state, commanded
//! efforts, controller debug output, contact results and planner output into
//! typed time-series tables.
//!
//! ## Architecture
//!
//! - `core/` - error type and decoded value representation
//! - `schema/` - `.lcm` type definitions, parser and fingerprints
//! - `encoding/` - LCM binary encoder and decoder
//! - `io/` - event-log reader and writer
//! - `demux/` - classifier, accumulator and extractors
//! - `trials/` - worker pool for independent simulator runs
//! - `config` - TOML configuration
//!
//! ## Example
//!
//! ```rust,no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use lcmlog::config::DemuxConfig;
//! use lcmlog::demux::Demultiplexer;
//! use lcmlog::io::LogReader;
//!
//! let config = DemuxConfig::load("demux.toml")?;
//! let reader = LogReader::open("lcmlog-2023-01-01.00")?;
//! let mut demux = Demultiplexer::from_config(&config)?;
//! let summary = demux.run(reader.events())?;
//! println!("{} events recorded", summary.recorded);
//!
//! for (t, sample) in demux.tables().state.iter() {
//!     println!("{t}: q = {:?}", sample.q);
//! }
//! # Ok(())
//! # }
//! ```

// Core types
pub mod core;

pub use core::{CodecValue, DecodedMessage, LogError, Result};

// LCM type definitions
pub mod schema;

// LCM binary codec
pub mod encoding;

// Event-log files
pub mod io;

pub use io::{ChannelFilter, Event, LogInfo, LogReader, LogWriter};

// Demultiplexing
pub mod demux;

pub use demux::{DemuxOutput, DemuxSummary, Demultiplexer, SchemaRegistry};

// Simulator trials
pub mod trials;

pub mod config;
