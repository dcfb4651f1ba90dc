// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! AST types for parsed LCM `.lcm` schemas.

use std::collections::HashMap;
use std::fmt;

/// A parsed `.lcm` source: an optional package and the structs it declares.
#[derive(Debug, Clone, PartialEq)]
pub struct MessageSchema {
    /// Package name (e.g., "dairlib")
    pub package: Option<String>,
    /// Struct definitions keyed by short name
    pub types: HashMap<String, MessageType>,
    /// Struct names in declaration order
    pub order: Vec<String>,
}

/// A struct definition with its members.
#[derive(Debug, Clone, PartialEq)]
pub struct MessageType {
    /// Short struct name (e.g., "lcmt_robot_output")
    pub name: String,
    /// Package the struct was declared in
    pub package: Option<String>,
    /// Ordered list of members
    pub fields: Vec<Field>,
    /// Named constants declared inside the struct
    pub constants: Vec<Constant>,
}

/// A member of a struct.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    /// Member name
    pub name: String,
    /// Element type
    pub type_name: FieldType,
    /// Array dimensions, outermost first. Empty for scalars.
    pub dimensions: Vec<Dimension>,
}

/// A `const` declaration. Constants are not serialized.
#[derive(Debug, Clone, PartialEq)]
pub struct Constant {
    pub name: String,
    pub type_name: PrimitiveType,
    /// Literal value as written in the source
    pub value: String,
}

/// Member element type - primitive or nested struct.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldType {
    /// Primitive type
    Primitive(PrimitiveType),
    /// Nested struct, possibly package-qualified ("drake.lcmt_foo")
    Nested(String),
}

/// One array dimension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dimension {
    /// Fixed size (`double imu_accel[3]`)
    Const(usize),
    /// Size read from an earlier integer member (`double position[num_positions]`)
    Var(String),
}

/// Primitive LCM types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveType {
    Int8,
    Int16,
    Int32,
    Int64,
    Byte,
    Float,
    Double,
    String,
    Boolean,
}

impl PrimitiveType {
    /// Parse a primitive type from its LCM spelling.
    pub fn try_from_str(s: &str) -> Option<Self> {
        match s {
            "int8_t" => Some(PrimitiveType::Int8),
            "int16_t" => Some(PrimitiveType::Int16),
            "int32_t" => Some(PrimitiveType::Int32),
            "int64_t" => Some(PrimitiveType::Int64),
            "byte" => Some(PrimitiveType::Byte),
            "float" => Some(PrimitiveType::Float),
            "double" => Some(PrimitiveType::Double),
            "string" => Some(PrimitiveType::String),
            "boolean" => Some(PrimitiveType::Boolean),
            _ => None,
        }
    }

    /// The LCM spelling of this type. This string is part of the fingerprint.
    pub fn lcm_name(self) -> &'static str {
        match self {
            PrimitiveType::Int8 => "int8_t",
            PrimitiveType::Int16 => "int16_t",
            PrimitiveType::Int32 => "int32_t",
            PrimitiveType::Int64 => "int64_t",
            PrimitiveType::Byte => "byte",
            PrimitiveType::Float => "float",
            PrimitiveType::Double => "double",
            PrimitiveType::String => "string",
            PrimitiveType::Boolean => "boolean",
        }
    }

    /// Encoded size in bytes, if fixed.
    pub fn size(self) -> Option<usize> {
        match self {
            PrimitiveType::Int8 | PrimitiveType::Byte | PrimitiveType::Boolean => Some(1),
            PrimitiveType::Int16 => Some(2),
            PrimitiveType::Int32 | PrimitiveType::Float => Some(4),
            PrimitiveType::Int64 | PrimitiveType::Double => Some(8),
            PrimitiveType::String => None,
        }
    }

    /// Whether values of this type can size a variable-length dimension.
    pub fn is_integer(self) -> bool {
        matches!(
            self,
            PrimitiveType::Int8
                | PrimitiveType::Int16
                | PrimitiveType::Int32
                | PrimitiveType::Int64
                | PrimitiveType::Byte
        )
    }
}

impl fmt::Display for PrimitiveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.lcm_name())
    }
}

impl FieldType {
    /// Parse a member type: primitive if the name is an LCM primitive, nested otherwise.
    pub fn from_type_str(s: &str) -> Self {
        match PrimitiveType::try_from_str(s) {
            Some(p) => FieldType::Primitive(p),
            None => FieldType::Nested(s.to_string()),
        }
    }

    /// Short name of a nested type, with any package prefix removed.
    pub fn nested_short_name(&self) -> Option<&str> {
        match self {
            FieldType::Nested(name) => Some(short_type_name(name)),
            FieldType::Primitive(_) => None,
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldType::Primitive(p) => write!(f, "{p}"),
            FieldType::Nested(name) => f.write_str(name),
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dimension::Const(n) => write!(f, "[{n}]"),
            Dimension::Var(name) => write!(f, "[{name}]"),
        }
    }
}

/// Strip a package prefix: `"drake.lcmt_foo"` -> `"lcmt_foo"`.
pub fn short_type_name(name: &str) -> &str {
    name.rsplit('.').next().unwrap_or(name)
}

impl MessageSchema {
    /// Create an empty schema for a package.
    pub fn new(package: Option<String>) -> Self {
        Self {
            package,
            types: HashMap::new(),
            order: Vec::new(),
        }
    }

    /// Add a struct, keeping declaration order.
    pub fn add_type(&mut self, msg_type: MessageType) {
        if !self.types.contains_key(&msg_type.name) {
            self.order.push(msg_type.name.clone());
        }
        self.types.insert(msg_type.name.clone(), msg_type);
    }

    /// Look up a struct by short or package-qualified name.
    pub fn get_type(&self, name: &str) -> Option<&MessageType> {
        self.types.get(short_type_name(name))
    }
}

impl MessageType {
    /// Create an empty struct.
    pub fn new(name: impl Into<String>, package: Option<String>) -> Self {
        Self {
            name: name.into(),
            package,
            fields: Vec::new(),
            constants: Vec::new(),
        }
    }

    /// Package-qualified name ("dairlib.lcmt_robot_output").
    pub fn full_name(&self) -> String {
        match &self.package {
            Some(pkg) => format!("{pkg}.{}", self.name),
            None => self.name.clone(),
        }
    }

    /// Find a member by name.
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Render the struct back to `.lcm` syntax.
    pub fn to_lcm_source(&self) -> String {
        let mut out = format!("struct {} {{\n", self.name);
        for c in &self.constants {
            out.push_str(&format!(
                "  const {} {} = {};\n",
                c.type_name, c.name, c.value
            ));
        }
        for field in &self.fields {
            let dims: String = field.dimensions.iter().map(|d| d.to_string()).collect();
            out.push_str(&format!("  {} {}{};\n", field.type_name, field.name, dims));
        }
        out.push('}');
        out
    }
}
