//! The parsed-source model.
//!
//! Parsing application source into type descriptors happens outside the
//! compiler. The schema deriver only needs to look up the fields of named
//! types, which it does through [`SourceModel`]. [`ParsedModuleSet`] is the
//! in-memory implementation; it can be loaded from the JSON a parser emits.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::diagnostic::{CompilerError, LookupError};
use crate::ir::{NamedType, TypeDescriptor};

/// Resolves named types to their struct definitions.
pub trait SourceModel {
    fn resolve_struct(&self, ty: &NamedType) -> Result<&StructDescriptor, LookupError>;
}

/// All parsed modules of a workspace, keyed by module name.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParsedModuleSet {
    #[serde(default)]
    pub modules: BTreeMap<String, ParsedModule>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParsedModule {
    pub name: String,
    #[serde(default)]
    pub version: String,
    /// Packages keyed by full package path.
    #[serde(default)]
    pub packages: BTreeMap<String, ParsedPackage>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParsedPackage {
    pub name: String,
    #[serde(default)]
    pub structs: BTreeMap<String, StructDescriptor>,
    /// Non-struct type declarations (aliases, enums).
    #[serde(default)]
    pub declared_types: BTreeMap<String, TypeDescriptor>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructDescriptor {
    pub name: String,
    #[serde(default)]
    pub fields: Vec<FieldDescriptor>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: TypeDescriptor,
    pub position: usize,
    /// Anonymous or promoted member.
    #[serde(default)]
    pub embedded: bool,
}

impl ParsedModuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_module(mut self, module: ParsedModule) -> Self {
        self.modules.insert(module.name.clone(), module);
        self
    }

    /// Loads a module set from a JSON file.
    pub fn load(path: &Path) -> Result<Self, CompilerError> {
        let content = std::fs::read_to_string(path).map_err(|e| CompilerError::IoError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        serde_json::from_str(&content).map_err(|e| CompilerError::IoError {
            path: path.to_path_buf(),
            message: format!("Failed to parse source model: {}", e),
        })
    }
}

impl SourceModel for ParsedModuleSet {
    fn resolve_struct(&self, ty: &NamedType) -> Result<&StructDescriptor, LookupError> {
        let module = self
            .modules
            .get(&ty.module)
            .ok_or_else(|| LookupError::ModuleNotFound {
                module: ty.module.clone(),
                qualified: ty.qualified(),
            })?;
        let package = module
            .packages
            .get(&ty.package)
            .ok_or_else(|| LookupError::PackageNotFound {
                package: ty.package.clone(),
                qualified: ty.qualified(),
            })?;
        match package.structs.get(&ty.name) {
            Some(structure) => Ok(structure),
            // The name exists but is an alias or enum.
            None if package.declared_types.contains_key(&ty.name) => Err(LookupError::NotAStruct {
                qualified: ty.qualified(),
            }),
            None => Err(LookupError::TypeNotFound {
                name: ty.name.clone(),
                package: ty.package.clone(),
            }),
        }
    }
}

impl ParsedModule {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            packages: BTreeMap::new(),
        }
    }

    /// Adds a package under `path`.
    pub fn with_package(mut self, path: impl Into<String>, package: ParsedPackage) -> Self {
        self.packages.insert(path.into(), package);
        self
    }
}

impl ParsedPackage {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_struct(mut self, structure: StructDescriptor) -> Self {
        self.structs.insert(structure.name.clone(), structure);
        self
    }

    pub fn with_declared_type(mut self, name: impl Into<String>, ty: TypeDescriptor) -> Self {
        self.declared_types.insert(name.into(), ty);
        self
    }
}

impl StructDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    /// Appends a named field at the next position.
    pub fn field(mut self, name: impl Into<String>, ty: TypeDescriptor) -> Self {
        let position = self.fields.len();
        self.fields.push(FieldDescriptor {
            name: name.into(),
            ty,
            position,
            embedded: false,
        });
        self
    }

    /// Appends an anonymous member at the next position.
    pub fn embedded(mut self, ty: TypeDescriptor) -> Self {
        let position = self.fields.len();
        self.fields.push(FieldDescriptor {
            name: ty.to_string(),
            ty,
            position,
            embedded: true,
        });
        self
    }
}
