// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Message encoding/decoding implementations.
//!
//! - [`lcm`] - LCM binary encoding/decoding

pub mod lcm;

pub use lcm::{LcmCursor, LcmDecoder, LcmEncoder};
