//! Dependency-ordered traversal of the IR graph for one phase.

use std::sync::Arc;

use crate::diagnostic::CompilerError;
use crate::ir::{IrNode, NodeId};

use super::context::BuildContext;

/// Runs one phase over the graph reachable from a set of roots.
///
/// Traversal is depth-first post-order: every dependency of a node is
/// generated before the node's own handler runs. Each node is generated at
/// most once per phase no matter how many paths reach it.
pub struct BuildVisitor<'a> {
    ctx: BuildContext<'a>,
    /// Nodes currently being visited, outermost first.
    stack: Vec<(NodeId, String)>,
}

impl<'a> BuildVisitor<'a> {
    pub fn new(ctx: BuildContext<'a>) -> Self {
        Self {
            ctx,
            stack: Vec::new(),
        }
    }

    /// Visits every root in order. The first failing handler aborts the phase.
    pub fn visit_all(&mut self, roots: &[Arc<IrNode>]) -> Result<(), CompilerError> {
        for root in roots {
            self.visit(root)?;
        }
        tracing::debug!(
            phase = %self.ctx.phase(),
            nodes = self.ctx.generated_count(),
            "phase traversal complete"
        );
        Ok(())
    }

    pub fn visit(&mut self, node: &Arc<IrNode>) -> Result<(), CompilerError> {
        if self.ctx.is_generated(node) {
            return Ok(());
        }

        if let Some(pos) = self.stack.iter().position(|(id, _)| *id == node.id()) {
            let mut cycle: Vec<String> = self.stack[pos..]
                .iter()
                .map(|(_, name)| name.clone())
                .collect();
            cycle.push(node.name().to_string());
            return Err(CompilerError::DependencyCycle { cycle });
        }

        self.stack.push((node.id(), node.name().to_string()));
        for dependency in node.dependencies() {
            self.visit(&dependency)?;
        }
        self.stack.pop();

        let phase = self.ctx.phase();
        if let Some(handler) = node.handler(phase) {
            tracing::debug!(phase = %phase, node = %node.name(), kind = %node.kind(), "generating");
            handler(node.as_ref(), &mut self.ctx)?;
        }
        self.ctx.mark_generated(node);

        Ok(())
    }

    pub fn context(&self) -> &BuildContext<'a> {
        &self.ctx
    }

    pub fn into_context(self) -> BuildContext<'a> {
        self.ctx
    }
}
