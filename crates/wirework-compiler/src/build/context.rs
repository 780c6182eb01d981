//! State threaded through every handler call of a phase.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::codegen::{ArtifactAccumulator, WiringAccumulator};
use crate::config::BuildConfig;
use crate::diagnostic::CompilerError;
use crate::ir::{IrNode, NodeId, Phase, ServiceInterfaceDescriptor};
use crate::schema::{RenderOptions, SchemaRegistry, ServiceSchema};
use crate::source::SourceModel;

/// Per-build output that outlives individual phases.
#[derive(Debug, Default)]
pub struct BuildState {
    pub schemas: SchemaRegistry,
    pub artifacts: ArtifactAccumulator,
    pub wiring: WiringAccumulator,
}

/// What a node hands to its dependents once its handler has run.
#[derive(Debug, Clone, Default)]
pub struct Resolved {
    /// The service interface the node exposes, if any.
    pub interface: Option<Arc<ServiceInterfaceDescriptor>>,
    /// The name dependents use to refer to the node's instance.
    pub symbol: Option<String>,
}

impl Resolved {
    pub fn interface(interface: Arc<ServiceInterfaceDescriptor>) -> Self {
        Self {
            interface: Some(interface),
            symbol: None,
        }
    }

    pub fn with_symbol(mut self, symbol: impl Into<String>) -> Self {
        self.symbol = Some(symbol.into());
        self
    }
}

/// The build context of one phase.
///
/// Owned by the visitor for the phase's duration and handed to each handler by
/// `&mut`, so all shared bookkeeping has a single writer.
pub struct BuildContext<'a> {
    phase: Phase,
    config: &'a BuildConfig,
    source: &'a dyn SourceModel,
    state: &'a mut BuildState,
    generated: HashSet<(Phase, NodeId)>,
    keys: HashSet<String>,
    resolved: HashMap<NodeId, Resolved>,
}

impl<'a> BuildContext<'a> {
    pub fn new(
        phase: Phase,
        config: &'a BuildConfig,
        source: &'a dyn SourceModel,
        state: &'a mut BuildState,
    ) -> Self {
        Self {
            phase,
            config,
            source,
            state,
            generated: HashSet::new(),
            keys: HashSet::new(),
            resolved: HashMap::new(),
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn config(&self) -> &'a BuildConfig {
        self.config
    }

    pub fn source(&self) -> &'a dyn SourceModel {
        self.source
    }

    pub fn artifacts(&mut self) -> &mut ArtifactAccumulator {
        &mut self.state.artifacts
    }

    pub fn wiring(&mut self) -> &mut WiringAccumulator {
        &mut self.state.wiring
    }

    pub fn schemas(&self) -> &SchemaRegistry {
        &self.state.schemas
    }

    /// Derives the wire schema of `iface` through the build's registry.
    pub fn derive_schema(&mut self, iface: &ServiceInterfaceDescriptor) -> Result<ServiceSchema, CompilerError> {
        self.state.schemas.derive(self.source, iface)
    }

    /// Derives and renders the schema of `iface` into the artifact accumulator.
    /// Returns the output path.
    pub fn generate_schema(&mut self, iface: &ServiceInterfaceDescriptor) -> Result<String, CompilerError> {
        let schema = self.derive_schema(iface)?;
        let options = RenderOptions::new(
            self.config.output_package.clone(),
            self.config.schema_extension.clone(),
        );
        let document = self.state.schemas.render(&schema, &options);
        let path = options.output_path(&schema.name);
        self.state.artifacts.put_generated_code(path.clone(), document);
        Ok(path)
    }

    /// Returns `true` the first time `key` is claimed in this phase.
    ///
    /// Lets several nodes share work that must happen once, such as generating
    /// the client for an interface two nodes connect to.
    pub fn visit_once(&mut self, key: impl Into<String>) -> bool {
        self.keys.insert(key.into())
    }

    /// Publishes `node`'s resolved handle for its dependents.
    pub fn publish(&mut self, node: &IrNode, resolved: Resolved) {
        self.resolved.insert(node.id(), resolved);
    }

    pub fn resolved(&self, node: &IrNode) -> Option<&Resolved> {
        self.resolved.get(&node.id())
    }

    /// The service interface a dependency published, or an error naming both
    /// nodes.
    pub fn interface_of(
        &self,
        node: &IrNode,
        dependency: &IrNode,
    ) -> Result<Arc<ServiceInterfaceDescriptor>, CompilerError> {
        self.resolved(dependency)
            .and_then(|resolved| resolved.interface.clone())
            .ok_or_else(|| CompilerError::InterfaceUnavailable {
                node: node.name().to_string(),
                dependency: dependency.name().to_string(),
            })
    }

    /// Whether `node` has been fully generated in this phase.
    pub fn is_generated(&self, node: &IrNode) -> bool {
        self.generated.contains(&(self.phase, node.id()))
    }

    pub(crate) fn mark_generated(&mut self, node: &IrNode) {
        self.generated.insert((self.phase, node.id()));
    }

    pub(crate) fn generated_count(&self) -> usize {
        self.generated.len()
    }
}
