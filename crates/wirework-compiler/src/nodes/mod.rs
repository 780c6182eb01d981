//! IR node constructors.
//!
//! Each constructor returns a shared [`IrNode`](crate::ir::IrNode) whose
//! capability set is the phases it registers handlers for.

mod rpc;
mod service;

pub use rpc::{rpc_client, rpc_server_address};
pub use service::service_node;
