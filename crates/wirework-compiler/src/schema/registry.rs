//! Message and service memoization for one build.

use std::collections::HashMap;

use serde::Serialize;

use super::derive::Deriver;
use super::wire::WireType;
use crate::diagnostic::CompilerError;
use crate::ir::{NamedType, ServiceInterfaceDescriptor, SourceLocation};
use crate::source::SourceModel;

/// A field of a wire message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MessageField {
    pub name: String,
    pub wire_type: WireType,
    pub tag: usize,
}

/// A wire message definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MessageDescriptor {
    pub name: String,
    pub fields: Vec<MessageField>,
}

/// One RPC of a service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MethodSchema {
    pub name: String,
    pub request: String,
    pub response: String,
}

/// The derived schema of a service interface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceSchema {
    pub name: String,
    pub methods: Vec<MethodSchema>,
    /// Names of every message the service uses, in first-reached order.
    pub messages: Vec<String>,
}

/// Memoizes derived messages and services across every interface of a build.
///
/// Named types map to exactly one message no matter how many signatures
/// reference them; a failed derivation leaves the registry as it was.
#[derive(Debug, Default)]
pub struct SchemaRegistry {
    messages: Vec<MessageDescriptor>,
    /// Message name -> (index, what claimed the name).
    by_name: HashMap<String, (usize, String)>,
    structs: HashMap<NamedType, usize>,
    services: HashMap<(String, SourceLocation), ServiceSchema>,
}

/// Registry size before a derivation started.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Checkpoint(usize);

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Derives (or returns the memoized) schema for `iface`.
    pub fn derive(
        &mut self,
        source: &dyn SourceModel,
        iface: &ServiceInterfaceDescriptor,
    ) -> Result<ServiceSchema, CompilerError> {
        let key = (iface.name.clone(), iface.source.clone());
        if let Some(schema) = self.services.get(&key) {
            return Ok(schema.clone());
        }

        let checkpoint = self.checkpoint();
        match Deriver::new(self, source).derive_service(iface) {
            Ok(schema) => {
                tracing::debug!(
                    service = %schema.name,
                    methods = schema.methods.len(),
                    messages = schema.messages.len(),
                    "derived wire schema"
                );
                self.services.insert(key, schema.clone());
                Ok(schema)
            }
            Err(err) => {
                self.rollback(checkpoint);
                Err(err)
            }
        }
    }

    pub fn message(&self, name: &str) -> Option<&MessageDescriptor> {
        self.by_name.get(name).map(|(idx, _)| &self.messages[*idx])
    }

    /// Every message, in definition order.
    pub fn messages(&self) -> impl Iterator<Item = &MessageDescriptor> {
        self.messages.iter()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn service(&self, iface: &ServiceInterfaceDescriptor) -> Option<&ServiceSchema> {
        self.services.get(&(iface.name.clone(), iface.source.clone()))
    }

    /// The message name already assigned to a named type.
    pub fn struct_message(&self, ty: &NamedType) -> Option<&str> {
        self.structs
            .get(ty)
            .map(|idx| self.messages[*idx].name.as_str())
    }

    // -------------------------------------------------------------------------
    // Deriver support
    // -------------------------------------------------------------------------

    /// Adds an empty message under `name`. Fails if the name is taken.
    pub(crate) fn reserve(&mut self, name: &str, owner: &str) -> Result<usize, (String, String)> {
        if let Some((_, first)) = self.by_name.get(name) {
            return Err((name.to_string(), first.clone()));
        }
        let idx = self.messages.len();
        self.messages.push(MessageDescriptor {
            name: name.to_string(),
            fields: Vec::new(),
        });
        self.by_name.insert(name.to_string(), (idx, owner.to_string()));
        Ok(idx)
    }

    pub(crate) fn bind_struct(&mut self, ty: &NamedType, idx: usize) {
        self.structs.insert(ty.clone(), idx);
    }

    pub(crate) fn fill(&mut self, idx: usize, fields: Vec<MessageField>) {
        self.messages[idx].fields = fields;
    }

    pub(crate) fn checkpoint(&self) -> Checkpoint {
        Checkpoint(self.messages.len())
    }

    pub(crate) fn rollback(&mut self, checkpoint: Checkpoint) {
        let Checkpoint(len) = checkpoint;
        self.messages.truncate(len);
        self.by_name.retain(|_, (idx, _)| *idx < len);
        self.structs.retain(|_, idx| *idx < len);
    }
}
