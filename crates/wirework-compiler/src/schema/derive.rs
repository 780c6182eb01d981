//! Type-directed derivation of wire schemas from service interfaces.

use std::collections::HashSet;

use super::registry::{MessageField, MethodSchema, SchemaRegistry, ServiceSchema};
use super::wire::WireType;
use crate::diagnostic::{CompilerError, SlotRole, WireTypeError};
use crate::ir::{MethodDescriptor, NamedType, ServiceInterfaceDescriptor, TypeDescriptor, Variable};
use crate::source::SourceModel;

/// Walks one service interface, adding its messages to the registry.
pub(crate) struct Deriver<'r> {
    registry: &'r mut SchemaRegistry,
    source: &'r dyn SourceModel,
    /// Messages this service uses, in first-reached order.
    reached: Vec<String>,
    seen: HashSet<String>,
}

impl<'r> Deriver<'r> {
    pub(crate) fn new(registry: &'r mut SchemaRegistry, source: &'r dyn SourceModel) -> Self {
        Self {
            registry,
            source,
            reached: Vec::new(),
            seen: HashSet::new(),
        }
    }

    pub(crate) fn derive_service(
        mut self,
        iface: &ServiceInterfaceDescriptor,
    ) -> Result<ServiceSchema, CompilerError> {
        let mut methods = Vec::with_capacity(iface.methods.len());

        for method in &iface.methods {
            let (arguments, returns) = payload_slots(iface, method)?;

            let request = format!("{}_{}_Request", iface.name, method.name);
            let response = format!("{}_{}_Response", iface.name, method.name);
            self.define_message(&request, iface, method, SlotRole::Argument, arguments)?;
            self.define_message(&response, iface, method, SlotRole::Return, returns)?;

            methods.push(MethodSchema {
                name: method.name.clone(),
                request,
                response,
            });
        }

        Ok(ServiceSchema {
            name: iface.name.clone(),
            methods,
            messages: self.reached,
        })
    }

    /// Builds a request or response message from the payload slots of a method.
    /// Tags are positions within the payload, so they only move when the
    /// signature's order does.
    fn define_message(
        &mut self,
        name: &str,
        iface: &ServiceInterfaceDescriptor,
        method: &MethodDescriptor,
        role: SlotRole,
        slots: &[Variable],
    ) -> Result<(), CompilerError> {
        let owner = format!("{}.{} {}", iface.name, method.name, role);
        let idx = self
            .registry
            .reserve(name, &owner)
            .map_err(|(name, first)| CompilerError::MessageNameCollision {
                name,
                first,
                second: owner.clone(),
            })?;
        self.reach(name);

        let prefix = match role {
            SlotRole::Argument => "arg",
            SlotRole::Return => "ret",
        };

        let mut fields = Vec::with_capacity(slots.len());
        let mut names = HashSet::with_capacity(slots.len());
        for (tag, slot) in slots.iter().enumerate() {
            let field_name = if slot.name.is_empty() {
                format!("{}{}", prefix, tag)
            } else {
                slot.name.clone()
            };
            if !names.insert(field_name.clone()) {
                return Err(CompilerError::DuplicateField {
                    interface: iface.name.clone(),
                    method: method.name.clone(),
                    role,
                    name: field_name,
                });
            }

            let wire_type = self
                .wire_type(&slot.ty)
                .map_err(|reason| CompilerError::Unserializable {
                    interface: iface.name.clone(),
                    method: method.name.clone(),
                    role,
                    name: field_name.clone(),
                    type_desc: slot.ty.to_string(),
                    reason,
                })?;

            fields.push(MessageField {
                name: field_name,
                wire_type,
                tag,
            });
        }

        self.registry.fill(idx, fields);
        Ok(())
    }

    /// Lowers a type descriptor to its wire type.
    fn wire_type(&mut self, ty: &TypeDescriptor) -> Result<WireType, WireTypeError> {
        match ty {
            TypeDescriptor::Primitive(kind) => Ok(WireType::for_primitive(*kind)),
            TypeDescriptor::Named(named) => self.message_for(named).map(WireType::Message),
            // Nullability is not carried over the wire.
            TypeDescriptor::Pointer(inner) => self.wire_type(inner),
            TypeDescriptor::Sequence(elem) => {
                if elem.is_byte() {
                    return Ok(WireType::Bytes);
                }
                if elem.strip_pointers().is_map() {
                    return Err(WireTypeError::RepeatedMap {
                        type_desc: ty.to_string(),
                    });
                }
                Ok(WireType::Repeated(Box::new(self.wire_type(elem)?)))
            }
            TypeDescriptor::Map { key, value } => {
                let key_type = match key.as_ref() {
                    TypeDescriptor::Primitive(kind) => Some(WireType::for_primitive(*kind)),
                    _ => None,
                }
                .filter(WireType::is_valid_map_key)
                .ok_or_else(|| WireTypeError::InvalidMapKey {
                    key: key.to_string(),
                })?;

                Ok(WireType::Map {
                    key: Box::new(key_type),
                    value: Box::new(self.wire_type(value)?),
                })
            }
            TypeDescriptor::CallContext | TypeDescriptor::ErrorSignal | TypeDescriptor::Opaque(_) => {
                Err(WireTypeError::Unserializable {
                    type_desc: ty.to_string(),
                })
            }
        }
    }

    /// Returns the message for a named type, walking its fields the first time
    /// the type is seen in this build.
    fn message_for(&mut self, ty: &NamedType) -> Result<String, WireTypeError> {
        if let Some(existing) = self.registry.struct_message(ty) {
            let existing = existing.to_string();
            self.reach_with_dependencies(&existing);
            return Ok(existing);
        }

        let source = self.source;
        let structure = source.resolve_struct(ty)?;

        let owner = ty.qualified();
        let (name, idx) = match self.registry.reserve(&ty.name, &owner) {
            Ok(idx) => (ty.name.clone(), idx),
            Err(_) => {
                let name = format!("{}_{}", ty.package_name(), ty.name);
                let idx = self.registry.reserve(&name, &owner).map_err(|(name, first)| {
                    WireTypeError::NameCollision {
                        name,
                        first,
                        second: owner.clone(),
                    }
                })?;
                (name, idx)
            }
        };
        // Bound before the walk so self-referencing types terminate.
        self.registry.bind_struct(ty, idx);
        self.reach(&name);

        let mut fields = Vec::with_capacity(structure.fields.len());
        for field in &structure.fields {
            // Anonymous and promoted members are not walked.
            if field.embedded || field.name.is_empty() {
                continue;
            }

            let wire_type = self
                .wire_type(&field.ty)
                .map_err(|inner| WireTypeError::InField {
                    owner: ty.to_string(),
                    field: field.name.clone(),
                    inner: Box::new(inner),
                })?;

            fields.push(MessageField {
                name: field.name.clone(),
                wire_type,
                tag: field.position,
            });
        }

        self.registry.fill(idx, fields);
        Ok(name)
    }

    fn reach(&mut self, name: &str) -> bool {
        if self.seen.insert(name.to_string()) {
            self.reached.push(name.to_string());
            true
        } else {
            false
        }
    }

    /// Marks a memoized message and every message it refers to as used by this
    /// service, without walking source types again.
    fn reach_with_dependencies(&mut self, name: &str) {
        if !self.reach(name) {
            return;
        }
        let refs: Vec<String> = self
            .registry
            .message(name)
            .map(|message| {
                message
                    .fields
                    .iter()
                    .filter_map(|field| field.wire_type.message_ref().map(str::to_string))
                    .collect()
            })
            .unwrap_or_default();
        for dependency in refs {
            self.reach_with_dependencies(&dependency);
        }
    }
}

/// Checks the calling convention and returns the argument and return slots
/// that travel over the wire.
fn payload_slots<'m>(
    iface: &ServiceInterfaceDescriptor,
    method: &'m MethodDescriptor,
) -> Result<(&'m [Variable], &'m [Variable]), CompilerError> {
    let arguments = match method.arguments.split_first() {
        Some((first, rest)) if first.ty == TypeDescriptor::CallContext => rest,
        _ => {
            return Err(CompilerError::MissingContextArgument {
                interface: iface.name.clone(),
                method: method.name.clone(),
            })
        }
    };

    let returns = match method.returns.split_last() {
        Some((last, rest)) if last.ty == TypeDescriptor::ErrorSignal => rest,
        _ => {
            return Err(CompilerError::MissingErrorReturn {
                interface: iface.name.clone(),
                method: method.name.clone(),
            })
        }
    };

    Ok((arguments, returns))
}
