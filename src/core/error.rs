// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Core error types for lcmlog.
//!
//! Provides error types for:
//! - Schema parsing and type lookup
//! - Binary decoding (buffer bounds, fingerprints)
//! - The demultiplexing pass (schema violations, index maps)

use std::fmt;

/// Errors that can occur while reading, decoding or demultiplexing a log.
#[derive(Debug, Clone)]
pub enum LogError {
    /// Parse error in schema or data
    ParseError {
        /// What was being parsed
        context: String,
        /// Error message
        message: String,
    },

    /// Invalid schema definition
    InvalidSchema {
        /// Schema name or identifier
        schema_name: String,
        /// Validation error message
        reason: String,
    },

    /// Type not found in registry
    TypeNotFound {
        /// Type name that was not found
        type_name: String,
    },

    /// Buffer too short for requested read
    BufferTooShort {
        /// Requested bytes
        requested: usize,
        /// Available bytes
        available: usize,
        /// Cursor position when error occurred
        cursor_pos: u64,
    },

    /// Array, string or record length exceeded data bounds
    LengthExceeded {
        /// Length that was read
        length: usize,
        /// Position in buffer
        position: usize,
        /// Buffer length
        buffer_len: usize,
    },

    /// Payload fingerprint does not match the schema
    FingerprintMismatch {
        /// Schema the payload was decoded against
        schema: String,
        /// Fingerprint the schema expects
        expected: u64,
        /// Fingerprint found in the payload
        actual: u64,
    },

    /// Encoding error (writing messages or log events)
    EncodeError {
        /// Encoder context (e.g., "LCM", "log")
        codec: String,
        /// Error message
        message: String,
    },

    /// Field decode error with context
    FieldDecodeError {
        /// Field name
        field_name: String,
        /// Field type
        field_type: String,
        /// Cursor position when error occurred
        cursor_pos: u64,
        /// Underlying error
        cause: String,
    },

    /// No known schema decodes the first payload seen on a channel.
    ///
    /// Non-fatal: the channel is dropped from the pass.
    UnrecognizedChannel {
        /// Channel name
        channel: String,
        /// Timestamp of the first event on the channel (microseconds)
        timestamp: i64,
    },

    /// A channel bound to a schema produced a payload that schema rejects
    SchemaViolation {
        /// Channel name
        channel: String,
        /// Schema the channel is bound to
        schema: String,
        /// Event timestamp (microseconds)
        timestamp: i64,
        /// Underlying decode error
        cause: String,
    },

    /// A decoded field name has no entry in the supplied index map
    MissingIndexMapping {
        /// Channel name
        channel: String,
        /// Which map was consulted ("positions", "velocities", "efforts")
        map: String,
        /// Field name that has no slot
        field: String,
        /// Event timestamp (microseconds)
        timestamp: i64,
    },

    /// An index map slot is out of range or written twice
    InvalidIndexSlot {
        /// Channel name
        channel: String,
        /// Which map was consulted
        map: String,
        /// Field name
        field: String,
        /// Slot index from the map
        index: usize,
        /// Width of the vector being filled
        width: usize,
        /// Event timestamp (microseconds)
        timestamp: i64,
    },

    /// Other error
    Other(String),
}

impl LogError {
    /// Create a parse error.
    pub fn parse(context: impl Into<String>, message: impl Into<String>) -> Self {
        LogError::ParseError {
            context: context.into(),
            message: message.into(),
        }
    }

    /// Create an invalid schema error.
    pub fn invalid_schema(schema_name: impl Into<String>, reason: impl Into<String>) -> Self {
        LogError::InvalidSchema {
            schema_name: schema_name.into(),
            reason: reason.into(),
        }
    }

    /// Create a "type not found" error.
    pub fn type_not_found(type_name: impl Into<String>) -> Self {
        LogError::TypeNotFound {
            type_name: type_name.into(),
        }
    }

    /// Create an encoding error.
    pub fn encode(codec: impl Into<String>, message: impl Into<String>) -> Self {
        LogError::EncodeError {
            codec: codec.into(),
            message: message.into(),
        }
    }

    /// Create a buffer too short error.
    pub fn buffer_too_short(requested: usize, available: usize, cursor_pos: u64) -> Self {
        LogError::BufferTooShort {
            requested,
            available,
            cursor_pos,
        }
    }

    /// Create a length exceeded error.
    pub fn length_exceeded(length: usize, position: usize, buffer_len: usize) -> Self {
        LogError::LengthExceeded {
            length,
            position,
            buffer_len,
        }
    }

    /// Create a fingerprint mismatch error.
    pub fn fingerprint_mismatch(schema: impl Into<String>, expected: u64, actual: u64) -> Self {
        LogError::FingerprintMismatch {
            schema: schema.into(),
            expected,
            actual,
        }
    }

    /// Create a schema violation error.
    pub fn schema_violation(
        channel: impl Into<String>,
        schema: impl Into<String>,
        timestamp: i64,
        cause: impl fmt::Display,
    ) -> Self {
        LogError::SchemaViolation {
            channel: channel.into(),
            schema: schema.into(),
            timestamp,
            cause: cause.to_string(),
        }
    }

    /// Create a missing index mapping error.
    pub fn missing_index_mapping(
        channel: impl Into<String>,
        map: impl Into<String>,
        field: impl Into<String>,
        timestamp: i64,
    ) -> Self {
        LogError::MissingIndexMapping {
            channel: channel.into(),
            map: map.into(),
            field: field.into(),
            timestamp,
        }
    }

    /// Create an invalid index slot error.
    pub fn invalid_index_slot(
        channel: impl Into<String>,
        map: impl Into<String>,
        field: impl Into<String>,
        index: usize,
        width: usize,
        timestamp: i64,
    ) -> Self {
        LogError::InvalidIndexSlot {
            channel: channel.into(),
            map: map.into(),
            field: field.into(),
            index,
            width,
            timestamp,
        }
    }

    /// Returns `true` if the demultiplexing pass must stop on this error.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, LogError::UnrecognizedChannel { .. })
    }

    /// Get structured fields for logging.
    pub fn log_fields(&self) -> Vec<(&'static str, String)> {
        match self {
            LogError::ParseError { context, message } => {
                vec![("context", context.clone()), ("message", message.clone())]
            }
            LogError::InvalidSchema {
                schema_name,
                reason,
            } => vec![("schema", schema_name.clone()), ("reason", reason.clone())],
            LogError::TypeNotFound { type_name } => vec![("type", type_name.clone())],
            LogError::BufferTooShort {
                requested,
                available,
                cursor_pos,
            } => vec![
                ("requested", requested.to_string()),
                ("available", available.to_string()),
                ("cursor", cursor_pos.to_string()),
            ],
            LogError::LengthExceeded {
                length,
                position,
                buffer_len,
            } => vec![
                ("length", length.to_string()),
                ("position", position.to_string()),
                ("buffer_len", buffer_len.to_string()),
            ],
            LogError::FingerprintMismatch {
                schema,
                expected,
                actual,
            } => vec![
                ("schema", schema.clone()),
                ("expected", format!("{expected:#018x}")),
                ("actual", format!("{actual:#018x}")),
            ],
            LogError::EncodeError { codec, message } => {
                vec![("codec", codec.clone()), ("message", message.clone())]
            }
            LogError::FieldDecodeError {
                field_name,
                field_type,
                cursor_pos,
                cause,
            } => vec![
                ("field", field_name.clone()),
                ("type", field_type.clone()),
                ("cursor", cursor_pos.to_string()),
                ("cause", cause.clone()),
            ],
            LogError::UnrecognizedChannel { channel, timestamp } => vec![
                ("channel", channel.clone()),
                ("timestamp", timestamp.to_string()),
            ],
            LogError::SchemaViolation {
                channel,
                schema,
                timestamp,
                cause,
            } => vec![
                ("channel", channel.clone()),
                ("schema", schema.clone()),
                ("timestamp", timestamp.to_string()),
                ("cause", cause.clone()),
            ],
            LogError::MissingIndexMapping {
                channel,
                map,
                field,
                timestamp,
            } => vec![
                ("channel", channel.clone()),
                ("map", map.clone()),
                ("field", field.clone()),
                ("timestamp", timestamp.to_string()),
            ],
            LogError::InvalidIndexSlot {
                channel,
                map,
                field,
                index,
                width,
                timestamp,
            } => vec![
                ("channel", channel.clone()),
                ("map", map.clone()),
                ("field", field.clone()),
                ("index", index.to_string()),
                ("width", width.to_string()),
                ("timestamp", timestamp.to_string()),
            ],
            LogError::Other(msg) => vec![("message", msg.clone())],
        }
    }
}

impl fmt::Display for LogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogError::ParseError { context, message } => {
                write!(f, "Parse error in {context}: {message}")
            }
            LogError::InvalidSchema {
                schema_name,
                reason,
            } => {
                write!(f, "Invalid schema '{schema_name}': {reason}")
            }
            LogError::TypeNotFound { type_name } => {
                write!(f, "Type not found: '{type_name}'")
            }
            LogError::BufferTooShort {
                requested,
                available,
                cursor_pos,
            } => write!(
                f,
                "Buffer too short: requested {requested} bytes at position {cursor_pos}, but only {available} bytes available"
            ),
            LogError::LengthExceeded {
                length,
                position,
                buffer_len,
            } => write!(
                f,
                "Length {length} exceeds buffer at position {position} (buffer length: {buffer_len})"
            ),
            LogError::FingerprintMismatch {
                schema,
                expected,
                actual,
            } => write!(
                f,
                "Fingerprint mismatch for '{schema}': expected {expected:#018x}, found {actual:#018x}"
            ),
            LogError::EncodeError { codec, message } => {
                write!(f, "{codec} encode error: {message}")
            }
            LogError::FieldDecodeError {
                field_name,
                field_type,
                cursor_pos,
                cause,
            } => write!(
                f,
                "Failed to decode field '{field_name}' (type: '{field_type}', cursor_pos: {cursor_pos}): {cause}"
            ),
            LogError::UnrecognizedChannel { channel, timestamp } => write!(
                f,
                "Unrecognized channel '{channel}' (first event at {timestamp} us)"
            ),
            LogError::SchemaViolation {
                channel,
                schema,
                timestamp,
                cause,
            } => write!(
                f,
                "Schema violation on channel '{channel}' (bound to '{schema}') at {timestamp} us: {cause}"
            ),
            LogError::MissingIndexMapping {
                channel,
                map,
                field,
                timestamp,
            } => write!(
                f,
                "Missing index mapping for '{field}' in {map} map (channel '{channel}', {timestamp} us)"
            ),
            LogError::InvalidIndexSlot {
                channel,
                map,
                field,
                index,
                width,
                timestamp,
            } => write!(
                f,
                "Invalid slot {index} for '{field}' in {map} map (vector width {width}, channel '{channel}', {timestamp} us)"
            ),
            LogError::Other(msg) => write!(f, "Other error: {msg}"),
        }
    }
}

impl std::error::Error for LogError {}

impl From<std::io::Error> for LogError {
    fn from(err: std::io::Error) -> Self {
        LogError::Other(format!("IO error: {err}"))
    }
}

/// Result type for lcmlog operations.
pub type Result<T> = std::result::Result<T, LogError>;
