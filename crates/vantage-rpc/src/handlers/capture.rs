//! Capture handlers: full screen, region, and single monitor.
//!
//! The image travels to the caller as a push event (base64 over the text
//! channel); the RPC response is only a small delivery ack. A provider
//! failure is caught at the operation boundary and becomes exactly one
//! `error` event to the caller — the connection stays alive and usable.

use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde_json::Value;
use tracing::{instrument, warn};
use vantage_capture::{ProviderError, with_deadline};
use vantage_core::events::ServerEvent;
use vantage_core::identity::CallerContext;
use vantage_core::input::Region;
use vantage_hub::Target;

use crate::context::RpcContext;
use crate::errors::RpcError;
use crate::handlers::{quality_param, require_i32_param, require_u32_param};
use crate::registry::MethodHandler;

/// Publish a capture result (or its failure) to the calling connection.
fn deliver(
    ctx: &RpcContext,
    caller: &CallerContext,
    result: Result<Vec<u8>, ProviderError>,
    make_event: fn(String) -> ServerEvent,
    failure_reason: &str,
) -> Result<Value, RpcError> {
    match result {
        Ok(image) => {
            let encoded = BASE64.encode(image);
            let _ = ctx.broadcaster.publish(
                Target::Connection(&caller.connection_id),
                &make_event(encoded),
            );
            Ok(serde_json::json!({ "delivered": true }))
        }
        Err(err) => {
            warn!(connection_id = %caller.connection_id, error = %err, "capture failed");
            let _ = ctx.broadcaster.publish(
                Target::Connection(&caller.connection_id),
                &ServerEvent::error(failure_reason),
            );
            Ok(serde_json::json!({ "delivered": false }))
        }
    }
}

/// Capture the full virtual desktop.
pub struct ScreenCaptureHandler;

#[async_trait]
impl MethodHandler for ScreenCaptureHandler {
    #[instrument(skip(self, ctx), fields(method = "capture.screen"))]
    async fn handle(
        &self,
        params: Option<Value>,
        caller: &CallerContext,
        ctx: &RpcContext,
    ) -> Result<Value, RpcError> {
        let quality = quality_param(params.as_ref())?;
        let result = with_deadline(ctx.provider_deadline, ctx.provider.capture_full(quality)).await;
        deliver(
            ctx,
            caller,
            result,
            ServerEvent::screen_capture,
            "Failed to capture screen",
        )
    }
}

/// Capture a rectangular region.
pub struct RegionCaptureHandler;

#[async_trait]
impl MethodHandler for RegionCaptureHandler {
    #[instrument(skip(self, ctx), fields(method = "capture.region"))]
    async fn handle(
        &self,
        params: Option<Value>,
        caller: &CallerContext,
        ctx: &RpcContext,
    ) -> Result<Value, RpcError> {
        let region = Region {
            x: require_i32_param(params.as_ref(), "x")?,
            y: require_i32_param(params.as_ref(), "y")?,
            width: require_u32_param(params.as_ref(), "width")?,
            height: require_u32_param(params.as_ref(), "height")?,
        };
        let quality = quality_param(params.as_ref())?;
        let result = with_deadline(
            ctx.provider_deadline,
            ctx.provider.capture_region(region, quality),
        )
        .await;
        deliver(
            ctx,
            caller,
            result,
            ServerEvent::region_capture,
            "Failed to capture region",
        )
    }
}

/// Capture a single monitor by index.
pub struct MonitorCaptureHandler;

#[async_trait]
impl MethodHandler for MonitorCaptureHandler {
    #[instrument(skip(self, ctx), fields(method = "capture.monitor"))]
    async fn handle(
        &self,
        params: Option<Value>,
        caller: &CallerContext,
        ctx: &RpcContext,
    ) -> Result<Value, RpcError> {
        let index = require_u32_param(params.as_ref(), "monitorIndex")?;
        let quality = quality_param(params.as_ref())?;
        let result = with_deadline(
            ctx.provider_deadline,
            ctx.provider.capture_monitor(index, quality),
        )
        .await;
        deliver(
            ctx,
            caller,
            result,
            ServerEvent::monitor_capture,
            "Failed to capture monitor",
        )
    }
}
