// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Message decoder registry.
//!
//! The registry holds an ordered list of decoders. Classification tries them
//! in registration order and the first decoder that accepts a payload wins,
//! so when two schemas can both decode the same bytes the earlier one is
//! chosen.
//!
//! # Example
//!
//! ```no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use lcmlog::demux::{DecodeAttempt, SchemaRegistry};
//!
//! let registry = SchemaRegistry::builtin()?;
//! # let payload: Vec<u8> = Vec::new();
//! match registry.attempt(&payload) {
//!     DecodeAttempt::Decoded(id, _msg) => println!("{}", registry.name(id)),
//!     DecodeAttempt::Unmatched => println!("unknown payload"),
//! }
//! # Ok(())
//! # }
//! ```

use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use tracing::trace;

use crate::core::{DecodedMessage, LogError, Result};
use crate::encoding::LcmDecoder;
use crate::schema::{builtin, TypeTable};

/// A pure decode function for one message schema.
pub trait MessageDecoder: Send + Sync {
    /// Schema name (e.g., "lcmt_robot_output").
    fn name(&self) -> &str;

    /// Decode a payload, or fail without side effects.
    fn decode(&self, data: &[u8]) -> Result<DecodedMessage>;
}

/// Decoder for an LCM struct type, with its fingerprint computed once.
#[derive(Clone)]
pub struct LcmType {
    name: String,
    fingerprint: u64,
    types: Arc<TypeTable>,
}

impl LcmType {
    /// Create a decoder for `name`, which must be defined in `types`.
    pub fn new(types: Arc<TypeTable>, name: &str) -> Result<Self> {
        let msg_type = types
            .get(name)
            .ok_or_else(|| LogError::type_not_found(name))?;
        let name = msg_type.name.clone();
        let fingerprint = types.fingerprint(&name)?;
        Ok(Self {
            name,
            fingerprint,
            types,
        })
    }

    /// The type's fingerprint.
    pub fn fingerprint(&self) -> u64 {
        self.fingerprint
    }
}

impl fmt::Debug for LcmType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LcmType")
            .field("name", &self.name)
            .field("fingerprint", &format_args!("{:#018x}", self.fingerprint))
            .finish()
    }
}

impl MessageDecoder for LcmType {
    fn name(&self) -> &str {
        &self.name
    }

    fn decode(&self, data: &[u8]) -> Result<DecodedMessage> {
        LcmDecoder::new(&self.types).decode_checked(&self.name, self.fingerprint, data)
    }
}

/// Position of a decoder in a [`SchemaRegistry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct SchemaId(usize);

impl SchemaId {
    /// Registration index.
    pub fn index(self) -> usize {
        self.0
    }
}

/// Result of trying every registered decoder against one payload.
#[derive(Debug, Clone, PartialEq)]
pub enum DecodeAttempt {
    /// The first decoder that accepted the payload, and its output
    Decoded(SchemaId, DecodedMessage),
    /// No decoder accepted the payload
    Unmatched,
}

/// Ordered set of message decoders.
pub struct SchemaRegistry {
    decoders: Vec<Box<dyn MessageDecoder>>,
    types: Arc<TypeTable>,
}

impl SchemaRegistry {
    /// Create an empty registry whose LCM types resolve through `types`.
    pub fn new(types: TypeTable) -> Self {
        Self {
            decoders: Vec::new(),
            types: Arc::new(types),
        }
    }

    /// Registry of the built-in log message types, in classification order.
    pub fn builtin() -> Result<Self> {
        let mut registry = Self::new(TypeTable::builtin()?);
        for name in builtin::KNOWN_TYPES {
            registry.register_lcm_type(name)?;
        }
        Ok(registry)
    }

    /// Add struct definitions that later `register_lcm_type` calls can use.
    pub fn add_lcm_source(&mut self, definition: &str) -> Result<()> {
        Arc::make_mut(&mut self.types).add_source(definition)
    }

    /// Append an LCM type from the type table.
    pub fn register_lcm_type(&mut self, name: &str) -> Result<SchemaId> {
        let decoder = LcmType::new(Arc::clone(&self.types), name)?;
        Ok(self.register(Box::new(decoder)))
    }

    /// Append a decoder. It is tried after every decoder registered before it.
    pub fn register(&mut self, decoder: Box<dyn MessageDecoder>) -> SchemaId {
        self.decoders.push(decoder);
        SchemaId(self.decoders.len() - 1)
    }

    /// Look up a decoder by schema name. The earliest registration wins.
    pub fn id_of(&self, name: &str) -> Option<SchemaId> {
        self.decoders
            .iter()
            .position(|d| d.name() == name)
            .map(SchemaId)
    }

    /// Name of a registered schema.
    pub fn name(&self, id: SchemaId) -> &str {
        self.decoders[id.0].name()
    }

    /// Decode with one specific schema.
    pub fn decode_with(&self, id: SchemaId, data: &[u8]) -> Result<DecodedMessage> {
        self.decoders[id.0].decode(data)
    }

    /// Try each decoder in order and report the first that succeeds.
    pub fn attempt(&self, data: &[u8]) -> DecodeAttempt {
        for (index, decoder) in self.decoders.iter().enumerate() {
            match decoder.decode(data) {
                Ok(msg) => return DecodeAttempt::Decoded(SchemaId(index), msg),
                Err(e) => trace!(schema = decoder.name(), error = %e, "Decoder rejected payload"),
            }
        }
        DecodeAttempt::Unmatched
    }

    /// Registered schema names in order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.decoders.iter().map(|d| d.name())
    }

    /// The type table LCM decoders resolve through.
    pub fn types(&self) -> &TypeTable {
        &self.types
    }

    /// Number of registered decoders.
    pub fn len(&self) -> usize {
        self.decoders.len()
    }

    /// Check if no decoders are registered.
    pub fn is_empty(&self) -> bool {
        self.decoders.is_empty()
    }
}

impl fmt::Debug for SchemaRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}
