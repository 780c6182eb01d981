//! Wire types of the RPC schema language.

use std::fmt;

use serde::Serialize;

use crate::ir::PrimitiveKind;

/// Scalar types the wire format accepts as map keys.
pub const MAP_KEY_TYPES: &[&str] = &[
    "int32", "int64", "uint32", "uint64", "sint32", "sint64", "fixed32", "fixed64", "sfixed32",
    "sfixed64", "bool", "string",
];

/// A field type in the wire schema.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub enum WireType {
    Bool,
    String,
    Sint32,
    Sint64,
    Uint32,
    Uint64,
    Uint8,
    Float,
    Double,
    /// Opaque byte string.
    Bytes,
    /// Reference to a message by name.
    Message(String),
    Repeated(Box<WireType>),
    Map {
        key: Box<WireType>,
        value: Box<WireType>,
    },
}

impl WireType {
    /// Fixed primitive table.
    pub fn for_primitive(kind: PrimitiveKind) -> WireType {
        match kind {
            PrimitiveKind::Bool => WireType::Bool,
            PrimitiveKind::String => WireType::String,
            PrimitiveKind::Int | PrimitiveKind::Int64 => WireType::Sint64,
            PrimitiveKind::Int8 | PrimitiveKind::Int16 | PrimitiveKind::Int32 => WireType::Sint32,
            PrimitiveKind::Uint | PrimitiveKind::Uint64 => WireType::Uint64,
            PrimitiveKind::Uint8 | PrimitiveKind::Uint16 | PrimitiveKind::Uint32 => WireType::Uint32,
            PrimitiveKind::Byte | PrimitiveKind::Rune => WireType::Uint8,
            PrimitiveKind::Float32 => WireType::Float,
            PrimitiveKind::Float64 => WireType::Double,
        }
    }

    /// The keyword of a scalar type; `None` for composite types.
    pub fn scalar_keyword(&self) -> Option<&'static str> {
        match self {
            WireType::Bool => Some("bool"),
            WireType::String => Some("string"),
            WireType::Sint32 => Some("sint32"),
            WireType::Sint64 => Some("sint64"),
            WireType::Uint32 => Some("uint32"),
            WireType::Uint64 => Some("uint64"),
            WireType::Uint8 => Some("uint8"),
            WireType::Float => Some("float"),
            WireType::Double => Some("double"),
            WireType::Bytes => Some("bytes"),
            WireType::Message(_) | WireType::Repeated(_) | WireType::Map { .. } => None,
        }
    }

    pub fn is_valid_map_key(&self) -> bool {
        self.scalar_keyword()
            .is_some_and(|keyword| MAP_KEY_TYPES.contains(&keyword))
    }

    /// The message this type refers to, looking through repeated and map values.
    pub fn message_ref(&self) -> Option<&str> {
        match self {
            WireType::Message(name) => Some(name),
            WireType::Repeated(inner) => inner.message_ref(),
            WireType::Map { value, .. } => value.message_ref(),
            _ => None,
        }
    }
}

impl fmt::Display for WireType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WireType::Message(name) => f.write_str(name),
            WireType::Repeated(inner) => write!(f, "repeated {}", inner),
            WireType::Map { key, value } => write!(f, "map<{},{}>", key, value),
            scalar => f.write_str(scalar.scalar_keyword().unwrap_or_default()),
        }
    }
}
