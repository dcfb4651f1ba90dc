// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Decoded value type system.
//!
//! Provides a unified value representation for messages decoded from the
//! LCM binary encoding. All variants are serde-serializable.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Type alias for decoded message as field name -> value mapping.
pub type DecodedMessage = HashMap<String, CodecValue>;

/// Unified value type for decoded log data.
///
/// One variant per LCM primitive (`boolean`, `int8_t` .. `int64_t`, `byte`,
/// `float`, `double`, `string`) plus arrays and nested structs. Arrays with
/// more than one dimension are nested `Array` values, outermost dimension
/// first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CodecValue {
    Bool(bool),

    Int8(i8),
    Int16(i16),
    Int32(i32),
    Int64(i64),

    /// LCM `byte`
    UInt8(u8),

    Float32(f32),
    Float64(f64),

    String(String),

    Array(Vec<CodecValue>),

    Struct(DecodedMessage),
}

impl CodecValue {
    // ========================================================================
    // Type Conversion Methods
    // ========================================================================

    /// Try to convert this value to f64 (for numeric values only).
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CodecValue::Int8(v) => Some(*v as f64),
            CodecValue::Int16(v) => Some(*v as f64),
            CodecValue::Int32(v) => Some(*v as f64),
            CodecValue::Int64(v) => Some(*v as f64),
            CodecValue::UInt8(v) => Some(*v as f64),
            CodecValue::Float32(v) => Some(*v as f64),
            CodecValue::Float64(v) => Some(*v),
            _ => None,
        }
    }

    /// Try to convert this value to i64 (for integer types only).
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            CodecValue::Int8(v) => Some(*v as i64),
            CodecValue::Int16(v) => Some(*v as i64),
            CodecValue::Int32(v) => Some(*v as i64),
            CodecValue::Int64(v) => Some(*v),
            CodecValue::UInt8(v) => Some(*v as i64),
            _ => None,
        }
    }

    /// Try to get the inner boolean.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            CodecValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Try to get the inner string value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            CodecValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Try to get the inner struct.
    pub fn as_struct(&self) -> Option<&DecodedMessage> {
        match self {
            CodecValue::Struct(s) => Some(s),
            _ => None,
        }
    }

    /// Try to get the inner array.
    pub fn as_array(&self) -> Option<&[CodecValue]> {
        match self {
            CodecValue::Array(arr) => Some(arr),
            _ => None,
        }
    }

    /// Convert a one-dimensional numeric array into `Vec<f64>`.
    ///
    /// Returns `None` if this is not an array or any element is not numeric.
    pub fn to_f64_vec(&self) -> Option<Vec<f64>> {
        self.as_array()?.iter().map(CodecValue::as_f64).collect()
    }

    /// Convert a one-dimensional string array into `Vec<String>`.
    pub fn to_string_vec(&self) -> Option<Vec<String>> {
        self.as_array()?
            .iter()
            .map(|v| v.as_str().map(str::to_string))
            .collect()
    }

    /// Get the type name of this value as a string.
    pub fn type_name(&self) -> &'static str {
        match self {
            CodecValue::Bool(_) => "bool",
            CodecValue::Int8(_) => "int8",
            CodecValue::Int16(_) => "int16",
            CodecValue::Int32(_) => "int32",
            CodecValue::Int64(_) => "int64",
            CodecValue::UInt8(_) => "byte",
            CodecValue::Float32(_) => "float32",
            CodecValue::Float64(_) => "float64",
            CodecValue::String(_) => "string",
            CodecValue::Array(_) => "array",
            CodecValue::Struct(_) => "struct",
        }
    }

    /// Build a `float64` array value.
    pub fn f64_array(values: &[f64]) -> Self {
        CodecValue::Array(values.iter().copied().map(CodecValue::Float64).collect())
    }

    /// Build a `string` array value.
    pub fn string_array<S: AsRef<str>>(values: &[S]) -> Self {
        CodecValue::Array(
            values
                .iter()
                .map(|s| CodecValue::String(s.as_ref().to_string()))
                .collect(),
        )
    }
}

impl fmt::Display for CodecValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CodecValue::Bool(v) => write!(f, "{v}"),
            CodecValue::Int8(v) => write!(f, "{v}"),
            CodecValue::Int16(v) => write!(f, "{v}"),
            CodecValue::Int32(v) => write!(f, "{v}"),
            CodecValue::Int64(v) => write!(f, "{v}"),
            CodecValue::UInt8(v) => write!(f, "{v}"),
            CodecValue::Float32(v) => write!(f, "{v}"),
            CodecValue::Float64(v) => write!(f, "{v}"),
            CodecValue::String(v) => write!(f, "\"{v}\""),
            CodecValue::Array(v) => write!(f, "[{} elements]", v.len()),
            CodecValue::Struct(v) => write!(f, "{{{} fields}}", v.len()),
        }
    }
}
