// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Schema command - list and show the built-in message types.

use std::fs;
use std::path::PathBuf;

use anyhow::Context as _;
use clap::Subcommand;
use serde::Serialize;

use crate::common::{format_fingerprint, write_json, Result};
use lcmlog::demux::SchemaRegistry;

/// Schema operations.
#[derive(Subcommand, Clone, Debug)]
pub enum SchemaCmd {
    /// List message types in classification order
    List {
        /// Extra `.lcm` definition files; their types are tried after the built-in ones
        #[arg(long = "lcm", value_name = "FILE")]
        sources: Vec<PathBuf>,

        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the definition of a message type
    Show {
        /// Type name (e.g. lcmt_robot_output)
        #[arg(value_name = "TYPE")]
        type_name: String,

        /// Extra `.lcm` definition files
        #[arg(long = "lcm", value_name = "FILE")]
        sources: Vec<PathBuf>,
    },
}

impl SchemaCmd {
    pub fn run(self) -> Result<()> {
        match self {
            SchemaCmd::List { sources, json } => cmd_list(sources, json),
            SchemaCmd::Show { type_name, sources } => cmd_show(type_name, sources),
        }
    }
}

/// Built-in registry extended with the types defined in `sources`.
fn load_registry(sources: &[PathBuf]) -> Result<SchemaRegistry> {
    let mut registry = SchemaRegistry::builtin()?;
    for path in sources {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let before = registry.types().names().to_vec();
        registry
            .add_lcm_source(&text)
            .with_context(|| format!("invalid LCM definitions in {}", path.display()))?;
        let added: Vec<String> = registry
            .types()
            .names()
            .iter()
            .filter(|n| !before.contains(*n))
            .cloned()
            .collect();
        for name in added {
            registry.register_lcm_type(&name)?;
        }
    }
    Ok(registry)
}

#[derive(Serialize)]
struct SchemaEntry {
    priority: usize,
    name: String,
    fingerprint: String,
}

fn cmd_list(sources: Vec<PathBuf>, json: bool) -> Result<()> {
    let registry = load_registry(&sources)?;
    let types = registry.types();

    let entries = registry
        .names()
        .enumerate()
        .map(|(priority, name)| {
            Ok(SchemaEntry {
                priority,
                name: name.to_string(),
                fingerprint: format_fingerprint(types.fingerprint(name)?),
            })
        })
        .collect::<Result<Vec<_>>>()?;

    if json {
        return write_json(&entries, None);
    }

    println!("=== Message types ({}) ===", entries.len());
    println!();
    for entry in &entries {
        println!("  [{}] {} {}", entry.priority, entry.fingerprint, entry.name);
    }

    Ok(())
}

fn cmd_show(type_name: String, sources: Vec<PathBuf>) -> Result<()> {
    let registry = load_registry(&sources)?;
    let types = registry.types();
    let msg_type = types
        .get(&type_name)
        .with_context(|| format!("unknown message type: {type_name}"))?;

    println!("=== {} ===", msg_type.full_name());
    println!("Fingerprint: {}", format_fingerprint(types.fingerprint(&type_name)?));
    match registry.id_of(&msg_type.name) {
        Some(id) => println!("Classification priority: {}", id.index()),
        None => println!("Classification priority: (nested type only)"),
    }
    println!();
    println!("{}", msg_type.to_lcm_source());

    Ok(())
}
