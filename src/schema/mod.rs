// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Schema parsing for LCM type definitions.
//!
//! This module provides:
//! - [`parser`] - `.lcm` source parsing
//! - [`fingerprint`] - the LCM type hash
//! - [`builtin`] - embedded definitions of the known log message types
//! - [`TypeTable`] - lookup of struct definitions across packages

pub mod ast;
pub mod builtin;
pub mod fingerprint;
pub mod parser;

use std::collections::HashMap;

pub use ast::{
    short_type_name, Constant, Dimension, Field, FieldType, MessageSchema, MessageType,
    PrimitiveType,
};
pub use parser::parse;

use crate::core::{LogError, Result};

/// Struct definitions from one or more `.lcm` sources, keyed by short name.
///
/// Nested member types are resolved by short name, so a type referenced as
/// `drake.lcmt_foo` or `lcmt_foo` finds the same definition.
#[derive(Debug, Clone, Default)]
pub struct TypeTable {
    types: HashMap<String, MessageType>,
    order: Vec<String>,
}

impl TypeTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Table holding every built-in dairlib/drake type.
    pub fn builtin() -> Result<Self> {
        let mut table = Self::new();
        for source in builtin::SOURCES {
            table.add_source(source)?;
        }
        Ok(table)
    }

    /// Parse a `.lcm` source and add all of its structs.
    pub fn add_source(&mut self, definition: &str) -> Result<()> {
        let schema = parse(definition)?;
        self.add_schema(schema)
    }

    /// Add all structs of an already parsed schema.
    ///
    /// Two packages defining the same short name is rejected: nested lookups
    /// would become ambiguous.
    pub fn add_schema(&mut self, mut schema: MessageSchema) -> Result<()> {
        for name in schema.order.drain(..) {
            let Some(msg_type) = schema.types.remove(&name) else {
                continue;
            };
            if let Some(existing) = self.types.get(&name) {
                if existing != &msg_type {
                    return Err(LogError::invalid_schema(
                        msg_type.full_name(),
                        format!("conflicts with {}", existing.full_name()),
                    ));
                }
                continue;
            }
            self.order.push(name.clone());
            self.types.insert(name, msg_type);
        }
        Ok(())
    }

    /// Look up a struct by short or package-qualified name.
    pub fn get(&self, name: &str) -> Option<&MessageType> {
        self.types.get(short_type_name(name))
    }

    /// Fingerprint of a struct.
    pub fn fingerprint(&self, name: &str) -> Result<u64> {
        fingerprint::fingerprint(name, &|n: &str| self.get(n))
    }

    /// Struct names in insertion order.
    pub fn names(&self) -> &[String] {
        &self.order
    }

    /// Number of structs in the table.
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Check if the table is empty.
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}
