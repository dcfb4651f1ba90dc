// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Core types used throughout lcmlog.
//!
//! - [`LogError`] - error handling for decoding and demultiplexing
//! - [`CodecValue`] - unified decoded value representation

pub mod error;
pub mod value;

pub use error::{LogError, Result};
pub use value::{CodecValue, DecodedMessage};
