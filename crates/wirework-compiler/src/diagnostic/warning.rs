//! Non-fatal build diagnostics.

use std::fmt;
use std::path::PathBuf;

/// Something a build step did that did not abort the build but should be
/// visible to whoever reads the output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildWarning {
    /// Generated code at `path` replaced earlier generated code.
    OverwroteCode { path: String },

    /// A copied file at `path` replaced an earlier copy.
    OverwroteFile {
        path: String,
        previous: PathBuf,
        source: PathBuf,
    },

    /// A wiring definition was redefined.
    OverwroteDefinition { name: String },
}

impl fmt::Display for BuildWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuildWarning::OverwroteCode { path } => {
                write!(f, "overwrote existing code at {}", path)
            }
            BuildWarning::OverwroteFile {
                path,
                previous,
                source,
            } => write!(
                f,
                "overwrote existing file at {} (was {}, now {})",
                path,
                previous.display(),
                source.display()
            ),
            BuildWarning::OverwroteDefinition { name } => {
                write!(f, "overwrote existing definition {}", name)
            }
        }
    }
}
