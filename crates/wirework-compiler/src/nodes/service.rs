//! Plain service instances.

use std::sync::Arc;

use crate::build::{BuildContext, Resolved};
use crate::codegen::Constructor;
use crate::diagnostic::CompilerError;
use crate::ir::{IrNode, Phase, ServiceInterfaceDescriptor};

/// Builds a node for a user service implementing `iface`.
///
/// The service's constructor is `New<Interface>` in the interface's package,
/// called with the symbols of `dependencies` in order.
pub fn service_node(
    name: impl Into<String>,
    iface: ServiceInterfaceDescriptor,
    dependencies: Vec<Arc<IrNode>>,
) -> Arc<IrNode> {
    let iface = Arc::new(iface);

    let mut builder = IrNode::builder(name, "Service");
    for dependency in dependencies {
        builder = builder.depends_on(dependency);
    }

    let artifacts = Arc::clone(&iface);
    let funcs = Arc::clone(&iface);
    let instantiation = iface;

    builder
        .on(Phase::Artifacts, move |node, ctx| {
            let source = &artifacts.source;
            if !source.version.is_empty() {
                ctx.artifacts()
                    .require_module(source.module.clone(), source.version.clone())?;
            }
            ctx.publish(node, Resolved::interface(Arc::clone(&artifacts)));
            Ok(())
        })
        .on(Phase::Funcs, move |node, ctx| {
            ctx.publish(node, Resolved::interface(Arc::clone(&funcs)));
            Ok(())
        })
        .on(Phase::Instantiation, move |node, ctx| {
            let args = dependency_symbols(node, ctx)?;
            let constructor = Constructor::new(
                instantiation.source.package.clone(),
                format!("New{}", instantiation.name),
            );
            ctx.wiring().declare_constructor(node.name(), &constructor, &args);
            ctx.publish(
                node,
                Resolved::interface(Arc::clone(&instantiation)).with_symbol(node.name()),
            );
            Ok(())
        })
        .build()
}

/// The instance symbols of `node`'s dependencies, in declaration order.
pub(crate) fn dependency_symbols(
    node: &IrNode,
    ctx: &BuildContext<'_>,
) -> Result<Vec<String>, CompilerError> {
    node.dependencies()
        .iter()
        .map(|dependency| {
            ctx.resolved(dependency)
                .and_then(|resolved| resolved.symbol.clone())
                .ok_or_else(|| {
                    CompilerError::codegen(
                        node.name(),
                        format!("dependency {} was not instantiated", dependency.name()),
                    )
                })
        })
        .collect()
}
