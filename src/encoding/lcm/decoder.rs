// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! LCM decoder implementation.
//!
//! Decodes LCM-encoded binary data using a schema-driven approach. Top-level
//! payloads start with the 8-byte fingerprint of their type; nested structs
//! are inlined without one.

use std::collections::HashMap;

use crate::core::{CodecValue, DecodedMessage, LogError, Result};
use crate::schema::{Dimension, Field, FieldType, PrimitiveType, TypeTable};

use super::cursor::LcmCursor;

/// Maximum allowed array length to prevent OOM on corrupt size fields.
pub const MAX_ARRAY_LENGTH: usize = 10_000_000;

/// Maximum struct nesting depth.
const MAX_NESTING_DEPTH: usize = 64;

/// Schema-driven LCM decoder over a [`TypeTable`].
pub struct LcmDecoder<'t> {
    types: &'t TypeTable,
}

impl<'t> LcmDecoder<'t> {
    /// Create a decoder resolving types through `types`.
    pub fn new(types: &'t TypeTable) -> Self {
        Self { types }
    }

    /// Decode a top-level message of `type_name`.
    ///
    /// The fingerprint is computed from the table; callers decoding many
    /// messages of the same type should use [`decode_checked`](Self::decode_checked).
    pub fn decode(&self, type_name: &str, data: &[u8]) -> Result<DecodedMessage> {
        let expected = self.types.fingerprint(type_name)?;
        self.decode_checked(type_name, expected, data)
    }

    /// Decode a top-level message whose fingerprint must equal `expected`.
    ///
    /// Bytes after the last member are ignored.
    pub fn decode_checked(
        &self,
        type_name: &str,
        expected: u64,
        data: &[u8],
    ) -> Result<DecodedMessage> {
        let mut cursor = LcmCursor::new(data);
        let actual = cursor.read_u64()?;
        if actual != expected {
            return Err(LogError::fingerprint_mismatch(type_name, expected, actual));
        }
        self.decode_struct(type_name, &mut cursor, 0)
    }

    fn decode_struct(
        &self,
        type_name: &str,
        cursor: &mut LcmCursor<'_>,
        depth: usize,
    ) -> Result<DecodedMessage> {
        if depth > MAX_NESTING_DEPTH {
            return Err(LogError::invalid_schema(
                type_name,
                format!("nesting deeper than {MAX_NESTING_DEPTH}"),
            ));
        }
        let msg_type = self
            .types
            .get(type_name)
            .ok_or_else(|| LogError::type_not_found(type_name))?;

        let mut result = HashMap::with_capacity(msg_type.fields.len());
        for field in &msg_type.fields {
            let start = cursor.position();
            let value = resolve_dimensions(field, &result)
                .and_then(|dims| self.decode_array(field, &dims, cursor, depth))
                .map_err(|e| wrap_field_error(field, start, e))?;
            result.insert(field.name.clone(), value);
        }
        Ok(result)
    }

    fn decode_array(
        &self,
        field: &Field,
        dims: &[usize],
        cursor: &mut LcmCursor<'_>,
        depth: usize,
    ) -> Result<CodecValue> {
        let Some((&len, rest)) = dims.split_first() else {
            return self.decode_element(&field.type_name, cursor, depth);
        };

        // Reject sizes the remaining bytes cannot possibly hold before allocating.
        let min_elem = rest
            .iter()
            .try_fold(min_encoded_size(&field.type_name), |acc, &n| acc.checked_mul(n));
        let too_large = match min_elem {
            Some(min_elem) => len.saturating_mul(min_elem) > cursor.remaining(),
            None => len > 0,
        };
        if len > MAX_ARRAY_LENGTH || too_large {
            return Err(LogError::length_exceeded(
                len,
                cursor.position(),
                cursor.len(),
            ));
        }

        let mut items = Vec::with_capacity(len);
        for _ in 0..len {
            items.push(self.decode_array(field, rest, cursor, depth)?);
        }
        Ok(CodecValue::Array(items))
    }

    fn decode_element(
        &self,
        type_name: &FieldType,
        cursor: &mut LcmCursor<'_>,
        depth: usize,
    ) -> Result<CodecValue> {
        match type_name {
            FieldType::Primitive(prim) => decode_primitive(*prim, cursor),
            FieldType::Nested(nested) => Ok(CodecValue::Struct(self.decode_struct(
                nested,
                cursor,
                depth + 1,
            )?)),
        }
    }
}

fn decode_primitive(prim: PrimitiveType, cursor: &mut LcmCursor<'_>) -> Result<CodecValue> {
    Ok(match prim {
        PrimitiveType::Boolean => CodecValue::Bool(cursor.read_bool()?),
        PrimitiveType::Int8 => CodecValue::Int8(cursor.read_i8()?),
        PrimitiveType::Byte => CodecValue::UInt8(cursor.read_u8()?),
        PrimitiveType::Int16 => CodecValue::Int16(cursor.read_i16()?),
        PrimitiveType::Int32 => CodecValue::Int32(cursor.read_i32()?),
        PrimitiveType::Int64 => CodecValue::Int64(cursor.read_i64()?),
        PrimitiveType::Float => CodecValue::Float32(cursor.read_f32()?),
        PrimitiveType::Double => CodecValue::Float64(cursor.read_f64()?),
        PrimitiveType::String => CodecValue::String(cursor.read_string()?),
    })
}

/// Lower bound on the encoded size of one element.
fn min_encoded_size(type_name: &FieldType) -> usize {
    match type_name {
        // i32 length + NUL
        FieldType::Primitive(PrimitiveType::String) => 5,
        FieldType::Primitive(prim) => prim.size().unwrap_or(1),
        FieldType::Nested(_) => 0,
    }
}

/// Resolve a member's dimensions against the members decoded so far.
pub(crate) fn resolve_dimensions(field: &Field, decoded: &DecodedMessage) -> Result<Vec<usize>> {
    field
        .dimensions
        .iter()
        .map(|dim| match dim {
            Dimension::Const(n) => Ok(*n),
            Dimension::Var(name) => {
                let size = decoded
                    .get(name)
                    .and_then(CodecValue::as_i64)
                    .ok_or_else(|| {
                        LogError::parse("LCM dimension", format!("size member '{name}' not set"))
                    })?;
                usize::try_from(size).map_err(|_| {
                    LogError::parse(
                        "LCM dimension",
                        format!("negative size {size} in member '{name}'"),
                    )
                })
            }
        })
        .collect()
}

fn wrap_field_error(field: &Field, cursor_pos: usize, err: LogError) -> LogError {
    match err {
        LogError::FieldDecodeError { .. } => err,
        other => LogError::FieldDecodeError {
            field_name: field.name.clone(),
            field_type: field.type_name.to_string(),
            cursor_pos: cursor_pos as u64,
            cause: other.to_string(),
        },
    }
}
