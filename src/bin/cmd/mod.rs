// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! CLI subcommands.

mod extract;
mod inspect;
mod schema;
mod trials;

pub use extract::ExtractCmd;
pub use inspect::InspectCmd;
pub use schema::SchemaCmd;
pub use trials::TrialsCmd;
