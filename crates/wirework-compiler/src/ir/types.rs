//! Structural type descriptors.
//!
//! These describe the shapes that appear in service signatures independently of
//! any wire format. The schema deriver lowers them to wire types.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Scalar kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrimitiveKind {
    Bool,
    String,
    /// Platform-width signed integer.
    Int,
    Int8,
    Int16,
    Int32,
    Int64,
    /// Platform-width unsigned integer.
    Uint,
    Uint8,
    Uint16,
    Uint32,
    Uint64,
    Byte,
    Rune,
    Float32,
    Float64,
}

impl PrimitiveKind {
    pub const ALL: [PrimitiveKind; 16] = [
        PrimitiveKind::Bool,
        PrimitiveKind::String,
        PrimitiveKind::Int,
        PrimitiveKind::Int8,
        PrimitiveKind::Int16,
        PrimitiveKind::Int32,
        PrimitiveKind::Int64,
        PrimitiveKind::Uint,
        PrimitiveKind::Uint8,
        PrimitiveKind::Uint16,
        PrimitiveKind::Uint32,
        PrimitiveKind::Uint64,
        PrimitiveKind::Byte,
        PrimitiveKind::Rune,
        PrimitiveKind::Float32,
        PrimitiveKind::Float64,
    ];

    pub fn name(self) -> &'static str {
        match self {
            PrimitiveKind::Bool => "bool",
            PrimitiveKind::String => "string",
            PrimitiveKind::Int => "int",
            PrimitiveKind::Int8 => "int8",
            PrimitiveKind::Int16 => "int16",
            PrimitiveKind::Int32 => "int32",
            PrimitiveKind::Int64 => "int64",
            PrimitiveKind::Uint => "uint",
            PrimitiveKind::Uint8 => "uint8",
            PrimitiveKind::Uint16 => "uint16",
            PrimitiveKind::Uint32 => "uint32",
            PrimitiveKind::Uint64 => "uint64",
            PrimitiveKind::Byte => "byte",
            PrimitiveKind::Rune => "rune",
            PrimitiveKind::Float32 => "float32",
            PrimitiveKind::Float64 => "float64",
        }
    }
}

/// A structured type identified by module, package and identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NamedType {
    pub module: String,
    pub package: String,
    pub name: String,
}

impl NamedType {
    pub fn new(module: impl Into<String>, package: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            module: module.into(),
            package: package.into(),
            name: name.into(),
        }
    }

    /// Fully qualified form used in lookup errors: `module:package.Name`.
    pub fn qualified(&self) -> String {
        format!("{}:{}.{}", self.module, self.package, self.name)
    }

    /// The last segment of the package path.
    pub fn package_name(&self) -> &str {
        self.package.rsplit('/').next().unwrap_or(&self.package)
    }
}

impl fmt::Display for NamedType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.package_name(), self.name)
    }
}

/// Canonical structural type representation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeDescriptor {
    Primitive(PrimitiveKind),
    Named(NamedType),
    Pointer(Box<TypeDescriptor>),
    /// Ordered, variable length.
    Sequence(Box<TypeDescriptor>),
    /// Unordered associative collection.
    Map {
        key: Box<TypeDescriptor>,
        value: Box<TypeDescriptor>,
    },
    /// The implicit call-context slot leading every RPC method.
    CallContext,
    /// The implicit error slot trailing every RPC method.
    ErrorSignal,
    /// Interfaces, functions, channels: describable, never serializable.
    Opaque(String),
}

impl TypeDescriptor {
    pub fn primitive(kind: PrimitiveKind) -> Self {
        TypeDescriptor::Primitive(kind)
    }

    pub fn string() -> Self {
        TypeDescriptor::Primitive(PrimitiveKind::String)
    }

    pub fn named(module: impl Into<String>, package: impl Into<String>, name: impl Into<String>) -> Self {
        TypeDescriptor::Named(NamedType::new(module, package, name))
    }

    pub fn pointer(inner: TypeDescriptor) -> Self {
        TypeDescriptor::Pointer(Box::new(inner))
    }

    pub fn sequence(elem: TypeDescriptor) -> Self {
        TypeDescriptor::Sequence(Box::new(elem))
    }

    /// `[]byte`.
    pub fn bytes() -> Self {
        Self::sequence(TypeDescriptor::Primitive(PrimitiveKind::Byte))
    }

    pub fn map(key: TypeDescriptor, value: TypeDescriptor) -> Self {
        TypeDescriptor::Map {
            key: Box::new(key),
            value: Box::new(value),
        }
    }

    /// Follows pointers down to the pointee.
    pub fn strip_pointers(&self) -> &TypeDescriptor {
        match self {
            TypeDescriptor::Pointer(inner) => inner.strip_pointers(),
            other => other,
        }
    }

    pub fn is_byte(&self) -> bool {
        matches!(self, TypeDescriptor::Primitive(PrimitiveKind::Byte))
    }

    pub fn is_map(&self) -> bool {
        matches!(self, TypeDescriptor::Map { .. })
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeDescriptor::Primitive(kind) => f.write_str(kind.name()),
            TypeDescriptor::Named(named) => write!(f, "{}", named),
            TypeDescriptor::Pointer(inner) => write!(f, "*{}", inner),
            TypeDescriptor::Sequence(elem) => write!(f, "[]{}", elem),
            TypeDescriptor::Map { key, value } => write!(f, "map[{}]{}", key, value),
            TypeDescriptor::CallContext => f.write_str("context.Context"),
            TypeDescriptor::ErrorSignal => f.write_str("error"),
            TypeDescriptor::Opaque(desc) => f.write_str(desc),
        }
    }
}
