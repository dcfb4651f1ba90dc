// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Inspect command - show log information and channels.

use std::collections::HashMap;
use std::path::PathBuf;

use clap::Subcommand;
use serde::Serialize;

use crate::common::{format_duration, format_timestamp, open_log, write_json, Result};
use lcmlog::demux::{ChannelBinding, ChannelClassifier, SchemaRegistry};
use lcmlog::io::ChannelInfo;

/// Inspect log contents.
#[derive(Subcommand, Clone, Debug)]
pub enum InspectCmd {
    /// Show basic log information and summary
    Info {
        /// Input log
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// List all channels in the log
    Channels {
        /// Input log
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Filter channels by substring (case-insensitive)
        #[arg(short, long)]
        filter: Option<String>,

        /// Classify each channel against the built-in message types
        #[arg(long)]
        classify: bool,

        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },
}

impl InspectCmd {
    pub fn run(self) -> Result<()> {
        match self {
            InspectCmd::Info { input, json } => cmd_info(input, json),
            InspectCmd::Channels {
                input,
                filter,
                classify,
                json,
            } => cmd_channels(input, filter, classify, json),
        }
    }
}

/// Cmd: Show log info
fn cmd_info(input: PathBuf, json: bool) -> Result<()> {
    let reader = open_log(&input)?;
    let info = reader.info();

    if json {
        return write_json(&info, None);
    }

    println!("=== {} ===", input.display());
    println!("Size: {} bytes", info.size);
    println!("Channels: {}", info.channels.len());
    println!("Events: {}", info.event_count);

    if let (Some(start), Some(end)) = (info.start_time, info.end_time) {
        println!("Start: {}", format_timestamp(start));
        println!("End: {}", format_timestamp(end));
        println!("Duration: {}", format_duration(end - start));
    }
    if info.scan.resyncs > 0 {
        println!(
            "Recovered: {} resyncs, {} bytes skipped",
            info.scan.resyncs, info.scan.skipped_bytes
        );
    }
    if info.scan.truncated_tail {
        println!("Truncated: last record incomplete");
    }

    println!();
    println!("Channels:");
    for ch in info.channels.values() {
        println!("  {} | {} events", ch.name, ch.event_count);
    }

    Ok(())
}

#[derive(Serialize)]
struct ChannelRow<'a> {
    #[serde(flatten)]
    info: &'a ChannelInfo,
    rate_hz: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    schema: Option<String>,
}

/// Cmd: List channels
fn cmd_channels(
    input: PathBuf,
    filter: Option<String>,
    classify: bool,
    json: bool,
) -> Result<()> {
    let reader = open_log(&input)?;
    let info = reader.info();

    let schemas = if classify {
        classify_channels(&reader)?
    } else {
        HashMap::new()
    };

    let pattern = filter.map(|p| p.to_lowercase());
    let rows: Vec<ChannelRow> = info
        .channels
        .values()
        .filter(|ch| {
            pattern
                .as_ref()
                .map_or(true, |p| ch.name.to_lowercase().contains(p))
        })
        .map(|ch| ChannelRow {
            info: ch,
            rate_hz: ch.rate_hz(),
            schema: schemas.get(&ch.name).cloned(),
        })
        .collect();

    if json {
        return write_json(&rows, None);
    }

    println!("=== Channels in {} ===", input.display());
    println!();

    for row in &rows {
        println!("Channel: {}", row.info.name);
        if let Some(schema) = &row.schema {
            println!("  Type: {}", schema);
        }
        println!("  Events: {}", row.info.event_count);
        println!("  Bytes: {}", row.info.payload_bytes);
        if let Some(rate) = row.rate_hz {
            println!("  Rate: {:.1} Hz", rate);
        }
        println!();
    }

    Ok(())
}

/// Bind every channel by its first payload.
fn classify_channels(reader: &lcmlog::LogReader) -> Result<HashMap<String, String>> {
    let registry = SchemaRegistry::builtin()?;
    let mut classifier = ChannelClassifier::new();
    for event in reader.events() {
        if classifier.binding(&event.channel).is_none() {
            classifier.classify(&registry, &event.channel, &event.data);
        }
    }

    Ok(classifier
        .bindings()
        .map(|(channel, binding)| {
            let schema = match binding {
                ChannelBinding::Bound(id) => registry.name(id).to_string(),
                ChannelBinding::Unknown => "unknown".to_string(),
            };
            (channel.to_string(), schema)
        })
        .collect())
}
