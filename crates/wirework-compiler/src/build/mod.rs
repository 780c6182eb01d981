//! Build traversal.
//!
//! One [`BuildVisitor`] runs per phase and owns that phase's [`BuildContext`].
//! The context carries the visited-set, the resolved handles nodes publish
//! for their dependents, and mutable access to the build's accumulators.

mod context;
mod visitor;

pub use context::{BuildContext, BuildState, Resolved};
pub use visitor::BuildVisitor;
