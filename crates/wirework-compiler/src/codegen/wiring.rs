//! Accumulation of instantiation wiring.
//!
//! During the instantiation phase nodes declare how they are constructed:
//! which packages to import, a named definition per instance, and which
//! instances are roots to instantiate at startup.

use std::collections::{BTreeMap, BTreeSet};

use crate::diagnostic::BuildWarning;

/// A constructor function exported by a generated or user package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Constructor {
    /// Full package path.
    pub package: String,
    pub func: String,
}

impl Constructor {
    pub fn new(package: impl Into<String>, func: impl Into<String>) -> Self {
        Self {
            package: package.into(),
            func: func.into(),
        }
    }

    /// Renders a call with the given argument expressions.
    pub fn call(&self, args: &[String]) -> String {
        let package = self.package.rsplit('/').next().unwrap_or(&self.package);
        format!("{}.{}({})", package, self.func, args.join(", "))
    }
}

/// Collects imports, named definitions and instantiation roots.
#[derive(Debug, Default)]
pub struct WiringAccumulator {
    imports: BTreeSet<String>,
    definitions: BTreeMap<String, String>,
    instantiations: BTreeSet<String>,
    warnings: Vec<BuildWarning>,
}

impl WiringAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn import(&mut self, package: impl Into<String>) {
        self.imports.insert(package.into());
    }

    /// Defines `name`. The last definition wins.
    pub fn define(&mut self, name: impl Into<String>, code: impl Into<String>) {
        let name = name.into();
        if self.definitions.contains_key(&name) {
            tracing::warn!(name = %name, "Overwriting existing definition");
            self.warnings.push(BuildWarning::OverwroteDefinition { name: name.clone() });
        }
        self.definitions.insert(name, code.into());
    }

    pub fn instantiate(&mut self, name: impl Into<String>) {
        self.instantiations.insert(name.into());
    }

    /// Imports the constructor's package and defines `name` as a call to it.
    pub fn declare_constructor(&mut self, name: impl Into<String>, constructor: &Constructor, args: &[String]) {
        self.import(constructor.package.clone());
        self.define(name, constructor.call(args));
    }

    pub fn imports(&self) -> impl Iterator<Item = &str> {
        self.imports.iter().map(String::as_str)
    }

    pub fn definition(&self, name: &str) -> Option<&str> {
        self.definitions.get(name).map(String::as_str)
    }

    pub fn definitions(&self) -> impl Iterator<Item = (&str, &str)> {
        self.definitions.iter().map(|(name, code)| (name.as_str(), code.as_str()))
    }

    pub fn instantiations(&self) -> impl Iterator<Item = &str> {
        self.instantiations.iter().map(String::as_str)
    }

    pub fn warnings(&self) -> &[BuildWarning] {
        &self.warnings
    }
}
