//! Service interface descriptors.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::TypeDescriptor;

/// Module, version and package that contain a definition.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceLocation {
    pub module: String,
    #[serde(default)]
    pub version: String,
    pub package: String,
}

impl SourceLocation {
    pub fn new(module: impl Into<String>, version: impl Into<String>, package: impl Into<String>) -> Self {
        Self {
            module: module.into(),
            version: version.into(),
            package: package.into(),
        }
    }
}

/// A named, typed argument or return value. The name may be empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Variable {
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type")]
    pub ty: TypeDescriptor,
}

impl Variable {
    pub fn new(name: impl Into<String>, ty: TypeDescriptor) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }

    pub fn unnamed(ty: TypeDescriptor) -> Self {
        Self::new("", ty)
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.name.is_empty() {
            write!(f, "{}", self.ty)
        } else {
            write!(f, "{} {}", self.name, self.ty)
        }
    }
}

/// A method of a service interface.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MethodDescriptor {
    pub name: String,
    #[serde(default)]
    pub arguments: Vec<Variable>,
    #[serde(default)]
    pub returns: Vec<Variable>,
}

impl MethodDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            arguments: Vec::new(),
            returns: Vec::new(),
        }
    }

    /// Appends an argument.
    pub fn arg(mut self, name: impl Into<String>, ty: TypeDescriptor) -> Self {
        self.arguments.push(Variable::new(name, ty));
        self
    }

    /// Appends a return value.
    pub fn ret(mut self, name: impl Into<String>, ty: TypeDescriptor) -> Self {
        self.returns.push(Variable::new(name, ty));
        self
    }

    /// Starts a method that follows the RPC calling convention; finish it
    /// with [`MethodDescriptor::ret`] calls and [`MethodDescriptor::returning_error`].
    pub fn rpc(name: impl Into<String>) -> Self {
        Self::new(name).arg("ctx", TypeDescriptor::CallContext)
    }

    pub fn returning_error(self) -> Self {
        self.ret("", TypeDescriptor::ErrorSignal)
    }
}

impl fmt::Display for MethodDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let args: Vec<String> = self.arguments.iter().map(|a| a.to_string()).collect();
        let rets: Vec<String> = self.returns.iter().map(|r| r.to_string()).collect();
        write!(f, "func {}({})", self.name, args.join(", "))?;
        match rets.len() {
            0 => Ok(()),
            1 => write!(f, " {}", rets[0]),
            _ => write!(f, " ({})", rets.join(", ")),
        }
    }
}

/// A service interface: the unit the schema deriver works on.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ServiceInterfaceDescriptor {
    pub name: String,
    pub source: SourceLocation,
    #[serde(default)]
    pub methods: Vec<MethodDescriptor>,
}

impl ServiceInterfaceDescriptor {
    pub fn new(name: impl Into<String>, source: SourceLocation) -> Self {
        Self {
            name: name.into(),
            source,
            methods: Vec::new(),
        }
    }

    pub fn method(mut self, method: MethodDescriptor) -> Self {
        self.methods.push(method);
        self
    }

    /// Loads an interface description from a JSON file.
    pub fn load(path: &std::path::Path) -> Result<Self, crate::CompilerError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| crate::CompilerError::io(path, e.to_string()))?;
        serde_json::from_str(&content).map_err(|e| {
            crate::CompilerError::io(path, format!("Failed to parse service interface: {}", e))
        })
    }
}
