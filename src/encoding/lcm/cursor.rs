// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Cursor for reading LCM-encoded data.
//!
//! LCM is big-endian with no alignment or padding, so the cursor is a plain
//! bounds-checked reader over a byte slice.

use byteorder::{BigEndian, ByteOrder};

use crate::core::{LogError, Result};

/// Bounds-checked big-endian reader.
///
/// # Example
///
/// ```no_run
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// use lcmlog::encoding::lcm::LcmCursor;
///
/// let data = [0x00, 0x00, 0x00, 0x2A];
/// let mut cursor = LcmCursor::new(&data);
/// assert_eq!(cursor.read_i32()?, 42);
/// # Ok(())
/// # }
/// ```
pub struct LcmCursor<'a> {
    data: &'a [u8],
    offset: usize,
}

impl<'a> LcmCursor<'a> {
    /// Create a cursor at the start of `data`.
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, offset: 0 }
    }

    /// Get the current read position.
    #[inline]
    pub fn position(&self) -> usize {
        self.offset
    }

    /// Get the remaining bytes available to read.
    #[inline]
    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.offset)
    }

    /// Check if at end of buffer.
    #[inline]
    pub fn is_at_end(&self) -> bool {
        self.offset >= self.data.len()
    }

    /// Total length of the underlying buffer.
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Check if the underlying buffer is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[inline]
    fn take(&mut self, count: usize) -> Result<&'a [u8]> {
        if count > self.remaining() {
            return Err(LogError::buffer_too_short(
                count,
                self.remaining(),
                self.offset as u64,
            ));
        }
        let start = self.offset;
        self.offset += count;
        Ok(&self.data[start..self.offset])
    }

    /// Read a single byte.
    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.take(1)?[0])
    }

    /// Read a signed byte.
    pub fn read_i8(&mut self) -> Result<i8> {
        Ok(self.read_u8()? as i8)
    }

    /// Read an LCM `boolean`. Any non-zero byte is `true`.
    pub fn read_bool(&mut self) -> Result<bool> {
        Ok(self.read_u8()? != 0)
    }

    /// Read an i16 value.
    pub fn read_i16(&mut self) -> Result<i16> {
        Ok(BigEndian::read_i16(self.take(2)?))
    }

    /// Read an i32 value.
    pub fn read_i32(&mut self) -> Result<i32> {
        Ok(BigEndian::read_i32(self.take(4)?))
    }

    /// Read an i64 value.
    pub fn read_i64(&mut self) -> Result<i64> {
        Ok(BigEndian::read_i64(self.take(8)?))
    }

    /// Read a u64 value (used for fingerprints).
    pub fn read_u64(&mut self) -> Result<u64> {
        Ok(BigEndian::read_u64(self.take(8)?))
    }

    /// Read an f32 value.
    pub fn read_f32(&mut self) -> Result<f32> {
        Ok(BigEndian::read_f32(self.take(4)?))
    }

    /// Read an f64 value.
    pub fn read_f64(&mut self) -> Result<f64> {
        Ok(BigEndian::read_f64(self.take(8)?))
    }

    /// Read an LCM string: i32 length including the NUL, bytes, NUL.
    ///
    /// Invalid UTF-8 is replaced rather than rejected.
    pub fn read_string(&mut self) -> Result<String> {
        let start = self.offset;
        let len = self.read_i32()?;
        if len <= 0 || len as usize > self.remaining() {
            return Err(LogError::length_exceeded(
                len.max(0) as usize,
                start,
                self.data.len(),
            ));
        }
        let bytes = self.take(len as usize)?;
        let (text, terminator) = bytes.split_at(bytes.len() - 1);
        if terminator[0] != 0 {
            return Err(LogError::parse(
                "LCM string",
                format!("missing NUL terminator at position {}", self.offset - 1),
            ));
        }
        Ok(String::from_utf8_lossy(text).into_owned())
    }

    /// Read a byte slice.
    pub fn read_bytes(&mut self, count: usize) -> Result<&'a [u8]> {
        self.take(count)
    }

    /// Skip bytes.
    pub fn skip(&mut self, count: usize) -> Result<()> {
        self.take(count).map(|_| ())
    }
}
