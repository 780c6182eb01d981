//! Build configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::diagnostic::CompilerError;

/// A module dependency at a fixed version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleRequirement {
    pub module: String,
    pub version: String,
}

impl ModuleRequirement {
    pub fn new(module: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            module: module.into(),
            version: version.into(),
        }
    }
}

/// Configuration for a build.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Name of the module the generated code lives in.
    pub target_module: String,

    /// Package (relative to the target module) that receives generated RPC
    /// schemas and clients.
    pub output_package: String,

    /// File extension of rendered wire schemas.
    pub schema_extension: String,

    /// Runtime library every RPC client requires.
    pub rpc_runtime: ModuleRequirement,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            target_module: "wirework/generated".to_string(),
            output_package: "rpc".to_string(),
            schema_extension: "proto".to_string(),
            rpc_runtime: ModuleRequirement::new("google.golang.org/grpc", "v1.41.0"),
        }
    }
}

impl BuildConfig {
    /// Loads a configuration from a JSON file. Missing keys take their defaults.
    pub fn load(path: &Path) -> Result<Self, CompilerError> {
        let content = std::fs::read_to_string(path).map_err(|e| CompilerError::IoError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        serde_json::from_str(&content).map_err(|e| CompilerError::IoError {
            path: path.to_path_buf(),
            message: format!("Failed to parse build config: {}", e),
        })
    }

    /// Full package path of generated RPC code.
    pub fn output_package_path(&self) -> String {
        format!("{}/{}", self.target_module, self.output_package)
    }
}
