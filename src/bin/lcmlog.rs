// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! # lcmlog CLI
//!
//! Command-line tool for LCM event logs.
//!
//! ## Usage
//!
//! ```sh
//! # Show log information
//! lcmlog inspect info lcmlog-2023-01-01.00
//!
//! # List channels with the schema each one binds to
//! lcmlog inspect channels lcmlog-2023-01-01.00 --classify
//!
//! # Demultiplex into JSON tables
//! lcmlog extract tables lcmlog-2023-01-01.00 --config demux.toml -o tables.json
//!
//! # Copy selected channels into a new log
//! lcmlog extract channels input.log output.log CASSIE_STATE_SIMULATION,CASSIE_INPUT
//!
//! # Run a batch of simulator trials
//! lcmlog trials run trials.toml
//! ```

mod cmd;
mod common;

use std::process;

use clap::{Parser, Subcommand};
use cmd::{ExtractCmd, InspectCmd, SchemaCmd, TrialsCmd};
use common::Result;

/// lcmlog - LCM event-log toolkit
///
/// Classify, decode and demultiplex LCM logs from legged-robot controllers
/// and simulators.
#[derive(Parser, Clone)]
#[command(name = "lcmlog")]
#[command(about = "LCM event-log demultiplexer for robot controller logs", long_about = None)]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(author = "ArcheBase")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Available commands
#[derive(Subcommand, Clone)]
enum Commands {
    /// Inspect log contents (info, channels)
    #[command(subcommand)]
    Inspect(InspectCmd),

    /// Extract data (typed tables, channel subsets)
    #[command(subcommand)]
    Extract(ExtractCmd),

    /// Built-in message types (list, show)
    #[command(subcommand)]
    Schema(SchemaCmd),

    /// Simulator trials (run, compare)
    #[command(subcommand)]
    Trials(TrialsCmd),
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    common::init_tracing();

    match cli.command {
        Commands::Inspect(cmd) => cmd.run(),
        Commands::Extract(cmd) => cmd.run(),
        Commands::Schema(cmd) => cmd.run(),
        Commands::Trials(cmd) => cmd.run(),
    }
}

fn main() {
    let result = run();

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
