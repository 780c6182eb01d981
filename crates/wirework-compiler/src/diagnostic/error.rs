//! Compiler error types.
#![allow(unused_assignments)]

use std::fmt;
use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

/// Errors that abort a build pass.
#[allow(unused_assignments)]
#[derive(Error, Diagnostic, Debug)]
pub enum CompilerError {
    // =========================================================================
    // IO Errors
    // =========================================================================
    #[error("Failed to read file '{path}': {message}")]
    #[diagnostic(code(wirework::io::read_error))]
    IoError {
        path: PathBuf,
        message: String,
    },

    // =========================================================================
    // Calling Convention Errors
    // =========================================================================
    #[error("invalid method {interface}.{method} due to missing context argument")]
    #[diagnostic(
        code(wirework::convention::missing_context),
        help("The first argument of every RPC method must be the call context")
    )]
    MissingContextArgument {
        interface: String,
        method: String,
    },

    #[error("invalid method {interface}.{method} due to missing error return value")]
    #[diagnostic(
        code(wirework::convention::missing_error),
        help("The last return value of every RPC method must be the error signal")
    )]
    MissingErrorReturn {
        interface: String,
        method: String,
    },

    #[error("invalid method {interface}.{method}: {role} field {name} appears more than once")]
    #[diagnostic(
        code(wirework::convention::duplicate_field),
        help("Unnamed slots are called arg<i> or ret<i>; give the clashing slot another name")
    )]
    DuplicateField {
        interface: String,
        method: String,
        role: SlotRole,
        name: String,
    },

    // =========================================================================
    // Type Errors
    // =========================================================================
    #[error("cannot serialize {interface}.{method} {role} {name} ({type_desc}): {reason}")]
    #[diagnostic(code(wirework::types::unserializable))]
    Unserializable {
        interface: String,
        method: String,
        role: SlotRole,
        name: String,
        type_desc: String,
        reason: WireTypeError,
    },

    #[error("message name {name} is claimed by both {first} and {second}")]
    #[diagnostic(
        code(wirework::types::message_name_collision),
        help("Rename one of the methods or types so the generated message names differ")
    )]
    MessageNameCollision {
        name: String,
        first: String,
        second: String,
    },

    // =========================================================================
    // Artifact Errors
    // =========================================================================
    #[error("incompatible module versions required {existing} and {requested} for module {module}")]
    #[diagnostic(
        code(wirework::artifacts::version_conflict),
        help("Two generation steps require different versions of the same module; align them")
    )]
    ModuleVersionConflict {
        module: String,
        existing: String,
        requested: String,
    },

    // =========================================================================
    // Graph Errors
    // =========================================================================
    #[error("Dependency cycle detected: {}", cycle.join(" -> "))]
    #[diagnostic(
        code(wirework::graph::dependency_cycle),
        help("The IR graph must be acyclic; break the cycle in the wiring")
    )]
    DependencyCycle {
        cycle: Vec<String>,
    },

    #[error("{node} expected {dependency} to expose a service interface")]
    #[diagnostic(code(wirework::graph::interface_unavailable))]
    InterfaceUnavailable {
        node: String,
        dependency: String,
    },

    // =========================================================================
    // Code Generation Errors
    // =========================================================================
    #[error("Failed to generate code for {node}: {message}")]
    #[diagnostic(code(wirework::codegen::generation_failed))]
    CodegenFailed {
        node: String,
        message: String,
    },
}

/// Broad classification of a [`CompilerError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Malformed input: calling convention, unsupported type shape, graph shape.
    Configuration,
    /// A module, package or type the input refers to does not exist.
    Lookup,
    /// Two generation steps disagree.
    Conflict,
    /// Reading inputs from disk failed.
    Io,
}

impl CompilerError {
    /// Creates an IO error.
    pub fn io(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::IoError {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Creates a generation failure attributed to a node.
    pub fn codegen(node: impl Into<String>, message: impl Into<String>) -> Self {
        Self::CodegenFailed {
            node: node.into(),
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::IoError { .. } => ErrorCategory::Io,
            Self::ModuleVersionConflict { .. } | Self::MessageNameCollision { .. } => {
                ErrorCategory::Conflict
            }
            Self::Unserializable { reason, .. } if reason.is_lookup() => ErrorCategory::Lookup,
            _ => ErrorCategory::Configuration,
        }
    }
}

/// Which side of a method signature a value sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotRole {
    Argument,
    Return,
}

impl fmt::Display for SlotRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SlotRole::Argument => f.write_str("argument"),
            SlotRole::Return => f.write_str("retval"),
        }
    }
}

/// Failure to resolve a named type in the parsed-source model.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LookupError {
    #[error("could not find module containing {qualified}, expected {module}")]
    ModuleNotFound { module: String, qualified: String },

    #[error("could not find package containing {qualified}, expected {package}")]
    PackageNotFound { package: String, qualified: String },

    #[error("could not find {name} within {package}")]
    TypeNotFound { name: String, package: String },

    #[error("expected {qualified} to be a struct but it is an unsupported type")]
    NotAStruct { qualified: String },
}

/// Why a type could not be lowered to a wire type.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WireTypeError {
    #[error("the wire format does not support sequences of maps ({type_desc})")]
    RepeatedMap { type_desc: String },

    #[error("{key} cannot be used as a map key")]
    InvalidMapKey { key: String },

    #[error("{type_desc} cannot be serialized")]
    Unserializable { type_desc: String },

    #[error("message name {name} is claimed by both {first} and {second}")]
    NameCollision {
        name: String,
        first: String,
        second: String,
    },

    #[error(transparent)]
    Lookup(#[from] LookupError),

    #[error("field {field} of {owner}: {inner}")]
    InField {
        owner: String,
        field: String,
        inner: Box<WireTypeError>,
    },
}

impl WireTypeError {
    /// Strips field context and returns the underlying failure.
    pub fn root(&self) -> &WireTypeError {
        match self {
            WireTypeError::InField { inner, .. } => inner.root(),
            other => other,
        }
    }

    pub fn is_lookup(&self) -> bool {
        matches!(self.root(), WireTypeError::Lookup(_))
    }
}
