//! IR graph nodes.
//!
//! A node is a deployable unit. Instead of implementing a family of optional
//! generation traits, a node carries a capability set: one handler per build
//! [`Phase`] it participates in. The build visitor only ever calls the handler
//! registered for the phase it is running.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::build::BuildContext;
use crate::diagnostic::CompilerError;

/// Generation phases, in the order the compiler runs them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Phase {
    /// Module requirements and copied files.
    Artifacts,
    /// Generated code.
    Funcs,
    /// Instantiation wiring.
    Instantiation,
}

impl Phase {
    pub const ALL: [Phase; 3] = [Phase::Artifacts, Phase::Funcs, Phase::Instantiation];

    pub fn name(self) -> &'static str {
        match self {
            Phase::Artifacts => "artifacts",
            Phase::Funcs => "funcs",
            Phase::Instantiation => "instantiation",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Process-unique node identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u64);

impl NodeId {
    fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        NodeId(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The generation logic a node runs for one phase.
pub type Handler =
    Box<dyn Fn(&IrNode, &mut BuildContext<'_>) -> Result<(), CompilerError> + Send + Sync>;

/// A node of the IR graph.
///
/// Dependencies may be added after construction with [`IrNode::connect`], as
/// the wiring layer resolves arguments lazily.
pub struct IrNode {
    id: NodeId,
    name: String,
    kind: String,
    dependencies: Mutex<Vec<Arc<IrNode>>>,
    handlers: BTreeMap<Phase, Handler>,
}

impl IrNode {
    /// Starts building a node. `kind` is a label such as `RPCClient` used when
    /// printing the graph.
    pub fn builder(name: impl Into<String>, kind: impl Into<String>) -> IrNodeBuilder {
        IrNodeBuilder {
            name: name.into(),
            kind: kind.into(),
            dependencies: Vec::new(),
            handlers: BTreeMap::new(),
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// Snapshot of the node's dependencies, in the order they were added.
    pub fn dependencies(&self) -> Vec<Arc<IrNode>> {
        self.edges().clone()
    }

    /// Adds `dependency` after construction.
    pub fn connect(&self, dependency: Arc<IrNode>) {
        self.edges().push(dependency);
    }

    fn edges(&self) -> MutexGuard<'_, Vec<Arc<IrNode>>> {
        // Edges are plain data; a panic elsewhere cannot leave them half-written.
        self.dependencies
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn dependency_names(&self) -> Vec<String> {
        self.edges().iter().map(|d| d.name().to_string()).collect()
    }

    /// The phases this node participates in.
    pub fn capabilities(&self) -> impl Iterator<Item = Phase> + '_ {
        self.handlers.keys().copied()
    }

    pub fn has_capability(&self, phase: Phase) -> bool {
        self.handlers.contains_key(&phase)
    }

    pub(crate) fn handler(&self, phase: Phase) -> Option<&Handler> {
        self.handlers.get(&phase)
    }
}

impl fmt::Debug for IrNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IrNode")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("dependencies", &self.dependency_names())
            .field("capabilities", &self.capabilities().collect::<Vec<_>>())
            .finish()
    }
}

impl fmt::Display for IrNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} = {}({})", self.name, self.kind, self.dependency_names().join(", "))
    }
}

/// Builder for [`IrNode`].
pub struct IrNodeBuilder {
    name: String,
    kind: String,
    dependencies: Vec<Arc<IrNode>>,
    handlers: BTreeMap<Phase, Handler>,
}

impl IrNodeBuilder {
    pub fn depends_on(mut self, dependency: Arc<IrNode>) -> Self {
        self.dependencies.push(dependency);
        self
    }

    /// Registers the handler for `phase`, replacing any earlier one.
    pub fn on<F>(mut self, phase: Phase, handler: F) -> Self
    where
        F: Fn(&IrNode, &mut BuildContext<'_>) -> Result<(), CompilerError> + Send + Sync + 'static,
    {
        self.handlers.insert(phase, Box::new(handler));
        self
    }

    pub fn build(self) -> Arc<IrNode> {
        Arc::new(IrNode {
            id: NodeId::next(),
            name: self.name,
            kind: self.kind,
            dependencies: Mutex::new(self.dependencies),
            handlers: self.handlers,
        })
    }
}
