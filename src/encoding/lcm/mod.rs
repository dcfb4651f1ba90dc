// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! LCM binary encoding.
//!
//! Big-endian, unaligned. A top-level message is its type fingerprint
//! followed by its members in declaration order.

pub mod cursor;
pub mod decoder;
pub mod encoder;

pub use cursor::LcmCursor;
pub use decoder::{LcmDecoder, MAX_ARRAY_LENGTH};
pub use encoder::LcmEncoder;
