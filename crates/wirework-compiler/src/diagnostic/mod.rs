//! Diagnostic types for error reporting.

mod error;
mod warning;

pub use error::{CompilerError, ErrorCategory, LookupError, SlotRole, WireTypeError};
pub use warning::BuildWarning;
