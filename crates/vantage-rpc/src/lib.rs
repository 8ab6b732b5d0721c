//! # vantage-rpc
//!
//! The session protocol engine: wire envelope, method registry, and the
//! handlers behind every client command.
//!
//! - **Wire types**: `RpcRequest` (optional `id` — id-less requests are
//!   one-way notifications) and `RpcResponse`
//! - **`MethodRegistry`**: name → handler dispatch with a hard per-call
//!   timeout and metrics
//! - **Handlers**: capture, input, group membership, and notification
//!   fan-out commands, each taking an explicit `CallerContext`
//!
//! Provider failures never escape a handler as an RPC error; they are
//! converted at the operation boundary into a single `error` event to the
//! calling connection, and the connection stays alive.

#![deny(unsafe_code)]

pub mod context;
pub mod errors;
pub mod handlers;
pub mod registry;
pub mod types;

pub use context::RpcContext;
pub use errors::RpcError;
pub use registry::{MethodHandler, MethodRegistry};
pub use types::{RpcErrorBody, RpcRequest, RpcResponse};
