//! RPC wire schema derivation.
//!
//! Given a service interface, the deriver produces a request and a response
//! message per method and, transitively, one message per distinct named type
//! reachable from any signature:
//!
//! 1. Check the calling convention (leading context, trailing error)
//! 2. Lower the remaining arguments and returns to wire types
//! 3. Memoize named types so each is walked once per build
//! 4. Render the service and its messages as a schema document

mod derive;
pub mod registry;
pub mod render;
pub mod wire;

pub use registry::{
    MessageDescriptor, MessageField, MethodSchema, SchemaRegistry, ServiceSchema,
};
pub use render::RenderOptions;
pub use wire::{WireType, MAP_KEY_TYPES};
