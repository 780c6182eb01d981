//! Accumulation of generated output across node generation steps.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::diagnostic::{BuildWarning, CompilerError};

/// Collects module requirements, generated code and copied files.
///
/// Every table is keyed and iterated in sorted order so the packaged output is
/// reproducible regardless of traversal order.
/// Output paths are relative to the target module directory.
#[derive(Debug, Default)]
pub struct ArtifactAccumulator {
    /// Module name -> required version.
    modules: BTreeMap<String, String>,
    /// Output path -> generated code.
    code: BTreeMap<String, String>,
    /// Output path -> file to copy there.
    files: BTreeMap<String, PathBuf>,
    warnings: Vec<BuildWarning>,
}

impl ArtifactAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requires `name` at `version`.
    ///
    /// Requiring the same version again is a no-op; requiring a different one
    /// is a conflict.
    pub fn require_module(
        &mut self,
        name: impl Into<String>,
        version: impl Into<String>,
    ) -> Result<(), CompilerError> {
        let name = name.into();
        let version = version.into();

        match self.modules.get(&name) {
            Some(existing) if *existing != version => Err(CompilerError::ModuleVersionConflict {
                module: name,
                existing: existing.clone(),
                requested: version,
            }),
            Some(_) => Ok(()),
            None => {
                tracing::debug!(module = %name, version = %version, "module required");
                self.modules.insert(name, version);
                Ok(())
            }
        }
    }

    /// Adds generated code at `path`. The last writer wins.
    pub fn put_generated_code(&mut self, path: impl Into<String>, code: impl Into<String>) {
        let path = path.into();
        if self.code.contains_key(&path) {
            tracing::warn!(path = %path, "Overwriting existing code");
            self.warnings.push(BuildWarning::OverwroteCode { path: path.clone() });
        }
        self.code.insert(path, code.into());
    }

    /// Copies `source` to `path` in the output. The last writer wins.
    pub fn copy_file(&mut self, path: impl Into<String>, source: impl Into<PathBuf>) {
        let path = path.into();
        let source = source.into();
        if let Some(previous) = self.files.get(&path) {
            tracing::warn!(
                outputpath = %path,
                inputpath = %source.display(),
                "Overwriting existing file"
            );
            self.warnings.push(BuildWarning::OverwroteFile {
                path: path.clone(),
                previous: previous.clone(),
                source: source.clone(),
            });
        }
        self.files.insert(path, source);
    }

    pub fn module_version(&self, name: &str) -> Option<&str> {
        self.modules.get(name).map(String::as_str)
    }

    pub fn modules(&self) -> impl Iterator<Item = (&str, &str)> {
        self.modules.iter().map(|(name, version)| (name.as_str(), version.as_str()))
    }

    pub fn code_at(&self, path: &str) -> Option<&str> {
        self.code.get(path).map(String::as_str)
    }

    pub fn generated_code(&self) -> impl Iterator<Item = (&str, &str)> {
        self.code.iter().map(|(path, code)| (path.as_str(), code.as_str()))
    }

    pub fn copied_files(&self) -> impl Iterator<Item = (&str, &Path)> {
        self.files.iter().map(|(path, source)| (path.as_str(), source.as_path()))
    }

    /// Overwrites recorded so far.
    pub fn warnings(&self) -> &[BuildWarning] {
        &self.warnings
    }
}
