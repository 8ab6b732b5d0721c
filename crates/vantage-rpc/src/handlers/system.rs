//! System handlers: ping, getInfo.

use async_trait::async_trait;
use serde_json::Value;
use tracing::instrument;
use vantage_core::identity::CallerContext;

use crate::context::RpcContext;
use crate::errors::RpcError;
use crate::registry::MethodHandler;

/// Returns a pong with the current server timestamp.
pub struct PingHandler;

#[async_trait]
impl MethodHandler for PingHandler {
    #[instrument(skip(self, _ctx), fields(method = "system.ping"))]
    async fn handle(
        &self,
        _params: Option<Value>,
        _caller: &CallerContext,
        _ctx: &RpcContext,
    ) -> Result<Value, RpcError> {
        Ok(serde_json::json!({
            "pong": true,
            "timestamp": chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
        }))
    }
}

/// Returns server version, platform, and live counters.
pub struct GetInfoHandler;

#[async_trait]
impl MethodHandler for GetInfoHandler {
    #[instrument(skip(self, ctx), fields(method = "system.getInfo"))]
    async fn handle(
        &self,
        _params: Option<Value>,
        _caller: &CallerContext,
        ctx: &RpcContext,
    ) -> Result<Value, RpcError> {
        Ok(serde_json::json!({
            "version": env!("CARGO_PKG_VERSION"),
            "uptime": ctx.server_start_time.elapsed().as_secs(),
            "platform": std::env::consts::OS,
            "arch": std::env::consts::ARCH,
            "connections": ctx.connections.connection_count(),
            "groups": ctx.groups.group_count(),
        }))
    }
}
