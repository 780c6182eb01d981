//! # Wirework Compiler
//!
//! This crate compiles the IR graph of a distributed application into the
//! artifacts needed to build and run it: module requirements, generated code
//! such as RPC wire schemas, and the wiring that instantiates every component.
//!
//! ## Architecture
//!
//! ```text
//! IR graph (wiring layer)
//!        │
//!        ▼
//! ┌──────────────┐
//! │  Artifacts   │  Module requirements, copied files
//! │   phase      │
//! └──────┬───────┘
//!        │
//!        ▼
//! ┌──────────────┐
//! │    Funcs     │  Generated code (RPC schemas via the
//! │    phase     │  schema deriver + source model)
//! └──────┬───────┘
//!        │
//!        ▼
//! ┌──────────────┐
//! │ Instantiation│  Imports, definitions, roots
//! │    phase     │
//! └──────┬───────┘
//!        │
//!        ▼
//!   BuildOutput → packaging
//! ```
//!
//! Each phase is a dependency-ordered traversal from the roots in which every
//! node runs at most once.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use wirework_compiler::{nodes, BuildConfig, Compiler, ParsedModuleSet};
//!
//! let service = nodes::service_node("greeter", greeter_iface, vec![]);
//! let addr = nodes::rpc_server_address("greeter_addr", "localhost:9000", service);
//! let client = nodes::rpc_client("greeter_client", addr);
//!
//! let compiler = Compiler::new(BuildConfig::default(), ParsedModuleSet::load(&model_path)?);
//! let output = compiler.build(&[client])?;
//! ```

pub mod build;
pub mod codegen;
pub mod config;
pub mod diagnostic;
pub mod ir;
pub mod nodes;
pub mod schema;
pub mod source;

use std::sync::Arc;

pub use build::{BuildContext, BuildState, BuildVisitor, Resolved};
pub use codegen::{ArtifactAccumulator, WiringAccumulator};
pub use config::BuildConfig;
pub use diagnostic::{BuildWarning, CompilerError};
pub use ir::{IrNode, Phase};
pub use schema::SchemaRegistry;
pub use source::{ParsedModuleSet, SourceModel};

/// The main compiler struct that drives every build phase over a graph.
pub struct Compiler<S: SourceModel> {
    config: BuildConfig,
    source: S,
}

/// Everything a build produced, handed to the packaging stage.
#[derive(Debug)]
pub struct BuildOutput {
    /// Module the generated package belongs to. Artifact paths are relative
    /// to its directory.
    pub target_module: String,
    pub artifacts: ArtifactAccumulator,
    pub wiring: WiringAccumulator,
    pub schemas: SchemaRegistry,
}

impl BuildOutput {
    /// Overwrite warnings from both accumulators.
    pub fn warnings(&self) -> impl Iterator<Item = &BuildWarning> {
        self.artifacts
            .warnings()
            .iter()
            .chain(self.wiring.warnings().iter())
    }
}

impl<S: SourceModel> Compiler<S> {
    /// Creates a new compiler over the given parsed-source model.
    pub fn new(config: BuildConfig, source: S) -> Self {
        Self { config, source }
    }

    pub fn config(&self) -> &BuildConfig {
        &self.config
    }

    /// Builds the graph reachable from `roots`.
    ///
    /// This runs, in order:
    /// 1. Artifacts phase (module requirements, copied files)
    /// 2. Funcs phase (generated code)
    /// 3. Instantiation phase (wiring), then marks each root for instantiation
    ///
    /// The first failing node aborts the build.
    pub fn build(&self, roots: &[Arc<IrNode>]) -> Result<BuildOutput, CompilerError> {
        let mut state = BuildState::default();

        for phase in Phase::ALL {
            tracing::info!(phase = %phase, roots = roots.len(), "running build phase");
            let ctx = BuildContext::new(phase, &self.config, &self.source, &mut state);
            BuildVisitor::new(ctx).visit_all(roots)?;
        }

        for root in roots {
            state.wiring.instantiate(root.name());
        }

        tracing::info!(
            modules = state.artifacts.modules().count(),
            files = state.artifacts.generated_code().count(),
            messages = state.schemas.len(),
            "build complete"
        );

        Ok(BuildOutput {
            target_module: self.config.target_module.clone(),
            artifacts: state.artifacts,
            wiring: state.wiring,
            schemas: state.schemas,
        })
    }
}
