//! Method registry and async dispatch.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use metrics::{counter, histogram};
use serde_json::Value;
use tracing::warn;
use vantage_core::identity::CallerContext;

use crate::context::RpcContext;
use crate::errors::{self, RpcError};
use crate::types::{RpcRequest, RpcResponse};

/// Response id used when the client supplied none.
const UNKNOWN_ID: &str = "unknown";

/// Trait implemented by every RPC method handler.
#[async_trait]
pub trait MethodHandler: Send + Sync {
    /// Execute the handler with the given params, caller, and context.
    async fn handle(
        &self,
        params: Option<Value>,
        caller: &CallerContext,
        ctx: &RpcContext,
    ) -> Result<Value, RpcError>;
}

/// Registry mapping method names to handlers.
pub struct MethodRegistry {
    handlers: HashMap<String, Arc<dyn MethodHandler>>,
}

impl MethodRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// Register a handler for a method name.
    pub fn register(&mut self, method: &str, handler: impl MethodHandler + 'static) {
        let _ = self.handlers.insert(method.to_owned(), Arc::new(handler));
    }

    /// Maximum time a single RPC handler is allowed to run.
    ///
    /// Independent of the (shorter) provider deadline — this is the
    /// backstop that keeps a wedged handler from holding a worker forever.
    const HANDLER_TIMEOUT: Duration = Duration::from_secs(30);

    /// Dispatch a request to the appropriate handler.
    ///
    /// Always produces a response; the caller decides whether to send it
    /// (one-way requests discard theirs).
    pub async fn dispatch(
        &self,
        request: RpcRequest,
        caller: &CallerContext,
        ctx: &RpcContext,
    ) -> RpcResponse {
        let method = request.method.clone();
        let id = request.id.unwrap_or_else(|| UNKNOWN_ID.to_owned());
        counter!("rpc_requests_total", "method" => method.clone()).increment(1);

        let Some(handler) = self.handlers.get(&method) else {
            counter!("rpc_errors_total", "method" => method.clone(), "error_type" => "method_not_found").increment(1);
            return RpcResponse::error(
                &id,
                errors::METHOD_NOT_FOUND,
                format!("Method '{method}' not found"),
            );
        };

        let start = std::time::Instant::now();
        let result = tokio::time::timeout(
            Self::HANDLER_TIMEOUT,
            handler.handle(request.params, caller, ctx),
        )
        .await;

        let response = match result {
            Ok(Ok(result)) => RpcResponse::success(&id, result),
            Ok(Err(err)) => {
                counter!("rpc_errors_total", "method" => method.clone(), "error_type" => err.code().to_owned()).increment(1);
                let body = err.to_error_body();
                RpcResponse {
                    id,
                    success: false,
                    result: None,
                    error: Some(body),
                }
            }
            Err(_elapsed) => {
                counter!("rpc_errors_total", "method" => method.clone(), "error_type" => "timeout").increment(1);
                tracing::error!(method, "RPC handler timed out after {:?}", Self::HANDLER_TIMEOUT);
                RpcResponse::error(
                    &id,
                    errors::INTERNAL_ERROR,
                    format!("Handler for '{method}' timed out"),
                )
            }
        };

        let duration = start.elapsed();
        histogram!("rpc_request_duration_seconds", "method" => method.clone())
            .record(duration.as_secs_f64());

        if duration.as_secs() >= 5 {
            warn!(
                method,
                duration_secs = duration.as_secs_f64(),
                "slow RPC request"
            );
        }

        response
    }

    /// List all registered method names (sorted).
    pub fn methods(&self) -> Vec<String> {
        let mut names: Vec<String> = self.handlers.keys().cloned().collect();
        names.sort();
        names
    }

    /// Check whether a method is registered.
    pub fn has_method(&self, method: &str) -> bool {
        self.handlers.contains_key(method)
    }
}

impl Default for MethodRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::test_helpers::{anonymous_caller, make_test_context};
    use serde_json::json;

    // ── Test handler implementations ────────────────────────────────

    struct EchoHandler;

    #[async_trait]
    impl MethodHandler for EchoHandler {
        async fn handle(
            &self,
            params: Option<Value>,
            _caller: &CallerContext,
            _ctx: &RpcContext,
        ) -> Result<Value, RpcError> {
            Ok(params.unwrap_or(json!(null)))
        }
    }

    struct FailHandler;

    #[async_trait]
    impl MethodHandler for FailHandler {
        async fn handle(
            &self,
            _params: Option<Value>,
            _caller: &CallerContext,
            _ctx: &RpcContext,
        ) -> Result<Value, RpcError> {
            Err(RpcError::Internal {
                message: "boom".into(),
            })
        }
    }

    struct SlowHandler {
        delay: Duration,
    }

    #[async_trait]
    impl MethodHandler for SlowHandler {
        async fn handle(
            &self,
            _params: Option<Value>,
            _caller: &CallerContext,
            _ctx: &RpcContext,
        ) -> Result<Value, RpcError> {
            tokio::time::sleep(self.delay).await;
            Ok(json!("done"))
        }
    }

    fn make_request(id: Option<&str>, method: &str, params: Option<Value>) -> RpcRequest {
        RpcRequest {
            id: id.map(Into::into),
            method: method.into(),
            params,
        }
    }

    // ── Tests ───────────────────────────────────────────────────────

    #[tokio::test]
    async fn register_and_dispatch_success() {
        let ctx = make_test_context();
        let caller = anonymous_caller("c1");
        let mut reg = MethodRegistry::new();
        reg.register("echo", EchoHandler);

        let resp = reg
            .dispatch(
                make_request(Some("r1"), "echo", Some(json!({"x": 1}))),
                &caller,
                &ctx,
            )
            .await;

        assert!(resp.success);
        assert_eq!(resp.id, "r1");
        assert_eq!(resp.result.unwrap()["x"], 1);
    }

    #[tokio::test]
    async fn dispatch_method_not_found() {
        let ctx = make_test_context();
        let caller = anonymous_caller("c1");
        let reg = MethodRegistry::new();

        let resp = reg
            .dispatch(make_request(Some("r2"), "no.such", None), &caller, &ctx)
            .await;

        assert!(!resp.success);
        let err = resp.error.unwrap();
        assert_eq!(err.code, "METHOD_NOT_FOUND");
        assert!(err.message.contains("no.such"));
    }

    #[tokio::test]
    async fn dispatch_handler_error_is_sanitized() {
        let ctx = make_test_context();
        let caller = anonymous_caller("c1");
        let mut reg = MethodRegistry::new();
        reg.register("fail", FailHandler);

        let resp = reg
            .dispatch(make_request(Some("r3"), "fail", None), &caller, &ctx)
            .await;

        assert!(!resp.success);
        let err = resp.error.unwrap();
        assert_eq!(err.code, "INTERNAL_ERROR");
        assert_eq!(err.message, "Internal error");
    }

    #[tokio::test]
    async fn dispatch_without_id_uses_unknown() {
        let ctx = make_test_context();
        let caller = anonymous_caller("c1");
        let mut reg = MethodRegistry::new();
        reg.register("echo", EchoHandler);

        let resp = reg
            .dispatch(make_request(None, "echo", None), &caller, &ctx)
            .await;
        assert_eq!(resp.id, "unknown");
    }

    #[tokio::test]
    async fn list_methods_sorted() {
        let mut reg = MethodRegistry::new();
        reg.register("b.method", EchoHandler);
        reg.register("a.method", EchoHandler);
        assert_eq!(reg.methods(), vec!["a.method", "b.method"]);
    }

    #[tokio::test]
    async fn has_method_check() {
        let mut reg = MethodRegistry::new();
        reg.register("system.ping", EchoHandler);
        assert!(reg.has_method("system.ping"));
        assert!(!reg.has_method("system.pong"));
    }

    #[tokio::test]
    async fn dispatch_preserves_request_id() {
        let ctx = make_test_context();
        let caller = anonymous_caller("c1");
        let mut reg = MethodRegistry::new();
        reg.register("echo", EchoHandler);

        let resp = reg
            .dispatch(make_request(Some("my-unique-id-42"), "echo", None), &caller, &ctx)
            .await;
        assert_eq!(resp.id, "my-unique-id-42");
    }

    #[test]
    fn default_registry_is_empty() {
        let reg = MethodRegistry::default();
        assert!(reg.methods().is_empty());
    }

    #[tokio::test]
    async fn register_overwrites_previous() {
        let ctx = make_test_context();
        let caller = anonymous_caller("c1");
        let mut reg = MethodRegistry::new();
        reg.register("test", EchoHandler);
        reg.register("test", FailHandler);

        let resp = reg
            .dispatch(make_request(Some("r1"), "test", None), &caller, &ctx)
            .await;
        assert!(!resp.success);
    }

    #[tokio::test]
    async fn dispatch_fast_handler_unaffected_by_timeout() {
        let ctx = make_test_context();
        let caller = anonymous_caller("c1");
        let mut reg = MethodRegistry::new();
        reg.register(
            "fast",
            SlowHandler {
                delay: Duration::from_millis(1),
            },
        );

        let resp = reg
            .dispatch(make_request(Some("r1"), "fast", None), &caller, &ctx)
            .await;
        assert!(resp.success);
        assert_eq!(resp.result.unwrap(), "done");
    }

    #[tokio::test]
    async fn dispatch_timeout_returns_error() {
        tokio::time::pause();

        let ctx = make_test_context();
        let caller = anonymous_caller("c1");
        let mut reg = MethodRegistry::new();
        reg.register(
            "slow",
            SlowHandler {
                delay: Duration::from_secs(120),
            },
        );

        let resp = reg
            .dispatch(make_request(Some("r-timeout"), "slow", None), &caller, &ctx)
            .await;

        assert!(!resp.success);
        assert_eq!(resp.id, "r-timeout");
        let err = resp.error.unwrap();
        assert_eq!(err.code, "INTERNAL_ERROR");
        assert!(err.message.contains("timed out"));
    }
}
