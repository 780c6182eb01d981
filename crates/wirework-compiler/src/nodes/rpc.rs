//! RPC transport nodes.
//!
//! A server address wraps a service node and forwards its interface; a client
//! connects to an address. Clients generate the wire schema of the interface
//! they call, once per interface however many clients share it.

use std::sync::Arc;

use crate::build::{BuildContext, Resolved};
use crate::codegen::Constructor;
use crate::diagnostic::CompilerError;
use crate::ir::{IrNode, Phase};

/// Builds the address node for `service`, reachable at `address`.
///
/// The address is exposed to dependents as the symbol `<name>.addr`.
pub fn rpc_server_address(
    name: impl Into<String>,
    address: impl Into<String>,
    service: Arc<IrNode>,
) -> Arc<IrNode> {
    let address = address.into();
    let artifacts = Arc::clone(&service);
    let funcs = Arc::clone(&service);
    let instantiation = Arc::clone(&service);

    IrNode::builder(name, "RPCServerAddress")
        .depends_on(service)
        .on(Phase::Artifacts, move |node, ctx| forward_interface(node, ctx, &artifacts))
        .on(Phase::Funcs, move |node, ctx| forward_interface(node, ctx, &funcs))
        .on(Phase::Instantiation, move |node, ctx| {
            ctx.wiring()
                .define(address_symbol(node), format!("{:?}", address));
            forward_interface(node, ctx, &instantiation)
        })
        .build()
}

/// Republishes the wrapped service's interface under the address symbol.
fn forward_interface(
    node: &IrNode,
    ctx: &mut BuildContext<'_>,
    service: &IrNode,
) -> Result<(), CompilerError> {
    let iface = ctx.interface_of(node, service)?;
    ctx.publish(node, Resolved::interface(iface).with_symbol(address_symbol(node)));
    Ok(())
}

fn address_symbol(node: &IrNode) -> String {
    format!("{}.addr", node.name())
}

/// Builds a client node that calls the service behind `address`.
pub fn rpc_client(name: impl Into<String>, address: Arc<IrNode>) -> Arc<IrNode> {
    let server = Arc::clone(&address);
    let funcs_server = Arc::clone(&address);

    IrNode::builder(name, "RPCClient")
        .depends_on(address)
        .on(Phase::Artifacts, |_, ctx| {
            let runtime = ctx.config().rpc_runtime.clone();
            ctx.artifacts().require_module(runtime.module, runtime.version)
        })
        .on(Phase::Funcs, move |node, ctx| {
            let iface = ctx.interface_of(node, &funcs_server)?;

            // Every client of an interface shares one generated schema.
            if ctx.visit_once(format!("{}.rpc.client", iface.name)) {
                let path = ctx.generate_schema(&iface)?;
                tracing::info!(service = %iface.name, path = %path, "generated RPC schema");
            }

            ctx.publish(node, Resolved::interface(iface));
            Ok(())
        })
        .on(Phase::Instantiation, move |node, ctx| {
            let iface = ctx.interface_of(node, &server)?;
            let addr = ctx
                .resolved(&server)
                .and_then(|resolved| resolved.symbol.clone())
                .ok_or_else(|| CompilerError::InterfaceUnavailable {
                    node: node.name().to_string(),
                    dependency: server.name().to_string(),
                })?;

            let constructor = Constructor::new(
                ctx.config().output_package_path(),
                format!("New_{}_RPCClient", iface.name),
            );
            tracing::info!(
                client = %node.name(),
                package = %constructor.package,
                "instantiating RPC client"
            );
            ctx.wiring().declare_constructor(node.name(), &constructor, &[addr]);

            ctx.publish(node, Resolved::interface(iface).with_symbol(node.name()));
            Ok(())
        })
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build::{BuildState, BuildVisitor};
    use crate::config::BuildConfig;
    use crate::diagnostic::BuildWarning;
    use crate::ir::{MethodDescriptor, ServiceInterfaceDescriptor, SourceLocation, TypeDescriptor};
    use crate::nodes::service_node;
    use crate::source::ParsedModuleSet;

    fn greeter() -> ServiceInterfaceDescriptor {
        ServiceInterfaceDescriptor::new(
            "Greeter",
            SourceLocation::new("example.com/app", "v0.1.0", "example.com/app/greeter"),
        )
        .method(
            MethodDescriptor::rpc("SayHello")
                .arg("name", TypeDescriptor::string())
                .ret("", TypeDescriptor::string())
                .returning_error(),
        )
    }

    fn run(phase: Phase, state: &mut BuildState, roots: &[Arc<IrNode>]) -> Result<(), CompilerError> {
        let config = BuildConfig::default();
        let source = ParsedModuleSet::new();
        let ctx = BuildContext::new(phase, &config, &source, state);
        let mut visitor = BuildVisitor::new(ctx);
        visitor.visit_all(roots)
    }

    #[test]
    fn test_client_wiring() {
        let service = service_node("greeter", greeter(), vec![]);
        let addr = rpc_server_address("greeter_addr", "localhost:9000", service);
        let client = rpc_client("greeter_client", addr);

        let mut state = BuildState::default();
        run(Phase::Instantiation, &mut state, &[client]).unwrap();

        assert_eq!(
            state.wiring.definition("greeter_client"),
            Some("rpc.New_Greeter_RPCClient(greeter_addr.addr)")
        );
        assert_eq!(
            state.wiring.definition("greeter_addr.addr"),
            Some("\"localhost:9000\"")
        );
        assert!(state
            .wiring
            .imports()
            .any(|import| import == "wirework/generated/rpc"));
    }

    #[test]
    fn test_two_clients_share_one_schema() {
        let service = service_node("greeter", greeter(), vec![]);
        let addr = rpc_server_address("greeter_addr", "localhost:9000", service);
        let first = rpc_client("first", Arc::clone(&addr));
        let second = rpc_client("second", addr);

        let mut state = BuildState::default();
        run(Phase::Funcs, &mut state, &[first, second]).unwrap();

        let paths: Vec<_> = state.artifacts.generated_code().map(|(path, _)| path).collect();
        assert_eq!(paths, vec!["rpc/Greeter.proto"]);
        assert!(state.artifacts.warnings().is_empty());
    }

    #[test]
    fn test_same_named_clients_are_both_declared() {
        let east = rpc_server_address(
            "east_addr",
            "east:9000",
            service_node("east", greeter(), vec![]),
        );
        let west = rpc_server_address(
            "west_addr",
            "west:9000",
            service_node("west", greeter(), vec![]),
        );
        let first = rpc_client("greeter_client", east);
        let second = rpc_client("greeter_client", west);

        let mut state = BuildState::default();
        run(Phase::Instantiation, &mut state, &[first, second]).unwrap();

        assert_eq!(
            state.wiring.definition("greeter_client"),
            Some("rpc.New_Greeter_RPCClient(west_addr.addr)")
        );
        assert_eq!(
            state.wiring.warnings(),
            &[BuildWarning::OverwroteDefinition {
                name: "greeter_client".to_string()
            }]
        );
    }

    #[test]
    fn test_client_without_interface() {
        let bare = IrNode::builder("bare", "Opaque").build();
        let client = rpc_client("client", bare);

        let mut state = BuildState::default();
        let err = run(Phase::Funcs, &mut state, &[client]).unwrap_err();
        assert!(matches!(
            err,
            CompilerError::InterfaceUnavailable { ref node, ref dependency }
                if node == "client" && dependency == "bare"
        ));
    }

    #[test]
    fn test_client_requires_runtime() {
        let service = service_node("greeter", greeter(), vec![]);
        let addr = rpc_server_address("greeter_addr", "localhost:9000", service);
        let client = rpc_client("greeter_client", addr);

        let mut state = BuildState::default();
        run(Phase::Artifacts, &mut state, &[client]).unwrap();

        assert_eq!(state.artifacts.module_version("google.golang.org/grpc"), Some("v1.41.0"));
        assert_eq!(state.artifacts.module_version("example.com/app"), Some("v0.1.0"));
    }
}
