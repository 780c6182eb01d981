//! Output accumulation for a build.
//!
//! Generation steps of many independent nodes funnel into two accumulators:
//! - [`ArtifactAccumulator`]: module requirements, generated code, copied files
//! - [`WiringAccumulator`]: imports, instance definitions, instantiation roots
//!
//! Writing these to storage belongs to the packaging stage, not the compiler.

mod artifacts;
mod wiring;

pub use artifacts::ArtifactAccumulator;
pub use wiring::{Constructor, WiringAccumulator};
