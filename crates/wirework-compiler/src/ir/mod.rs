//! Intermediate representation.
//!
//! The IR graph is produced by an external wiring stage and consumed by the
//! build visitor. It describes the system being built (nodes and their
//! dependencies) and the service interfaces those nodes expose, independent of
//! any deployment target or wire format.

mod node;
mod service;
mod types;

pub use node::{Handler, IrNode, IrNodeBuilder, NodeId, Phase};
pub use service::{MethodDescriptor, ServiceInterfaceDescriptor, SourceLocation, Variable};
pub use types::{NamedType, PrimitiveKind, TypeDescriptor};
