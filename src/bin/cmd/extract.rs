// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Extract command - demultiplex logs into tables or copy channel subsets.

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::Subcommand;

use crate::common::{load_demux_config, open_log, write_json, ProgressBar, Result};
use lcmlog::demux::{DemuxOptions, DemuxOutput, Demultiplexer};
use lcmlog::{ChannelFilter, LogWriter};

/// Extract data from logs.
#[derive(Subcommand, Clone, Debug)]
pub enum ExtractCmd {
    /// Demultiplex a log into typed tables (JSON)
    Tables {
        /// Input log
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        /// Channel and index map configuration (TOML)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Only keep the extracted tables, not every decoded message
        #[arg(long)]
        tables_only: bool,

        /// Only process channels matching this regex
        #[arg(long)]
        channels: Option<String>,
    },

    /// Copy selected channels into a new log
    Channels {
        /// Input log
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        /// Output log
        #[arg(value_name = "OUTPUT")]
        output: PathBuf,

        /// Channels to copy (comma-separated)
        #[arg(value_name = "CHANNELS")]
        channels: String,

        /// Treat CHANNELS as a regex
        #[arg(long)]
        regex: bool,

        /// Copy every channel except the selected ones
        #[arg(long)]
        exclude: bool,
    },
}

impl ExtractCmd {
    pub fn run(self) -> Result<()> {
        match self {
            ExtractCmd::Tables {
                input,
                config,
                output,
                tables_only,
                channels,
            } => cmd_tables(input, config, output, tables_only, channels),
            ExtractCmd::Channels {
                input,
                output,
                channels,
                regex,
                exclude,
            } => cmd_channels(input, output, channels, regex, exclude),
        }
    }
}

/// Run the demultiplexer over a log.
pub fn demultiplex(
    input: &Path,
    config: Option<&Path>,
    options: DemuxOptions,
) -> Result<DemuxOutput> {
    let config = load_demux_config(config)?;
    let reader = open_log(input)?;
    let mut demux = Demultiplexer::from_config(&config)?.with_options(options);

    let progress = ProgressBar::new(reader.len() as u64, "Demultiplexing");
    let mut events = reader.events();
    while let Some(event) = events.next() {
        demux
            .push(&event)
            .with_context(|| format!("demultiplexing {}", input.display()))?;
        progress.set_position(events.position() as u64);
    }

    let output = demux.finish();
    progress.finish_with_message(format!("{} events", output.summary.events_seen));
    output.summary.log();
    Ok(output)
}

/// Cmd: Demultiplex into tables
fn cmd_tables(
    input: PathBuf,
    config: Option<PathBuf>,
    output: Option<PathBuf>,
    tables_only: bool,
    channels: Option<String>,
) -> Result<()> {
    let mut options = DemuxOptions::default().with_keep_raw(!tables_only);
    if let Some(pattern) = channels {
        options = options.with_filter(ChannelFilter::regex_include(&pattern)?);
    }

    let result = demultiplex(&input, config.as_deref(), options)?;
    write_json(&result, output.as_deref())?;

    if output.is_some() {
        let summary = &result.summary;
        println!(
            "Recorded {} of {} events on {} channels",
            summary.recorded,
            summary.events_seen,
            summary.bindings.len()
        );
        if !summary.unrecognized.is_empty() {
            println!("Unrecognized channels:");
            for u in &summary.unrecognized {
                println!("  {} ({} events)", u.channel, u.events);
            }
        }
    }
    Ok(())
}

/// Cmd: Copy channels into a new log
fn cmd_channels(
    input: PathBuf,
    output: PathBuf,
    channels: String,
    regex: bool,
    exclude: bool,
) -> Result<()> {
    let filter = match (regex, exclude) {
        (true, false) => ChannelFilter::regex_include(&channels)?,
        (true, true) => ChannelFilter::regex_exclude(&channels)?,
        (false, _) => {
            let names: Vec<String> = channels
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect();
            if exclude {
                ChannelFilter::exclude(names)
            } else {
                ChannelFilter::include(names)
            }
        }
    };

    let reader = open_log(&input)?.with_filter(filter);
    let mut writer = LogWriter::create(&output)?;
    for event in reader.events() {
        writer.write_event(&event)?;
    }
    let written = writer.events_written();
    writer.finish()?;

    println!(
        "Copied {} events from {} to {}",
        written,
        input.display(),
        output.display()
    );
    Ok(())
}
