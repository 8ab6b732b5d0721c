//! WebSocket message dispatch — parses incoming text as `RpcRequest` and
//! routes through the `MethodRegistry`.

use tracing::{debug, instrument, warn};
use vantage_core::identity::CallerContext;
use vantage_rpc::context::RpcContext;
use vantage_rpc::errors;
use vantage_rpc::registry::MethodRegistry;
use vantage_rpc::types::{RpcRequest, RpcResponse};

/// Result of handling a WebSocket message.
pub struct HandleResult {
    /// Response to send back, or `None` for one-way requests.
    pub response: Option<RpcResponse>,
    /// The RPC method that was called (empty if parse failed).
    pub method: String,
}

/// Handle an incoming WebSocket text message.
///
/// Parses the message as an [`RpcRequest`] and dispatches it. A request
/// without an `id` is a one-way notification: it is dispatched, but the
/// response is discarded.
#[instrument(skip_all, fields(method))]
pub async fn handle_message(
    message: &str,
    registry: &MethodRegistry,
    caller: &CallerContext,
    ctx: &RpcContext,
) -> HandleResult {
    let request: RpcRequest = match serde_json::from_str(message) {
        Ok(request) => request,
        Err(err) => {
            warn!("invalid JSON received");
            return HandleResult {
                response: Some(RpcResponse::error(
                    "unknown",
                    errors::INVALID_PARAMS,
                    format!("Invalid JSON: {err}"),
                )),
                method: String::new(),
            };
        }
    };

    let method = request.method.clone();
    let one_way = request.is_notification();
    let _ = tracing::Span::current().record("method", method.as_str());
    debug!(method, one_way, "dispatching RPC");

    if !registry.has_method(&method) {
        warn!(method, "unknown RPC method");
    }

    let response = registry.dispatch(request, caller, ctx).await;
    HandleResult {
        response: (!one_way).then_some(response),
        method,
    }
}
