//! Input-injection handlers.
//!
//! Each handler parses its wire params into an [`InputCommand`] and routes
//! through one dispatch path: provider call under the deadline guard, then
//! an `input.ack` event to the caller for every command except
//! `mouseMove`. Button and modifier parsing is permissive — unknown
//! tokens never fail a command.

use async_trait::async_trait;
use serde_json::Value;
use tracing::{instrument, warn};
use vantage_capture::with_deadline;
use vantage_core::events::ServerEvent;
use vantage_core::identity::CallerContext;
use vantage_core::input::{InputCommand, Modifiers, MouseButton};
use vantage_hub::Target;

use crate::context::RpcContext;
use crate::errors::RpcError;
use crate::handlers::{
    optional_bool_param, optional_string_param, require_i32_param, require_bool_param,
    require_string_param, require_u16_param,
};
use crate::registry::MethodHandler;

/// Dispatch a parsed command to the provider and ack/report to the caller.
async fn dispatch(
    ctx: &RpcContext,
    caller: &CallerContext,
    command: InputCommand,
) -> Result<Value, RpcError> {
    let result = with_deadline(ctx.provider_deadline, ctx.provider.dispatch_input(&command)).await;
    match result {
        Ok(()) => {
            if command.acknowledges() {
                let _ = ctx.broadcaster.publish(
                    Target::Connection(&caller.connection_id),
                    &ServerEvent::input_ack(command.name()),
                );
            }
            Ok(serde_json::json!({ "accepted": true }))
        }
        Err(err) => {
            warn!(
                connection_id = %caller.connection_id,
                command = command.name(),
                error = %err,
                "input dispatch failed"
            );
            let _ = ctx.broadcaster.publish(
                Target::Connection(&caller.connection_id),
                &ServerEvent::error(format!("Failed to execute {}", command.name())),
            );
            Ok(serde_json::json!({ "accepted": false }))
        }
    }
}

/// Click at a point.
pub struct MouseClickHandler;

#[async_trait]
impl MethodHandler for MouseClickHandler {
    #[instrument(skip(self, ctx), fields(method = "input.mouseClick"))]
    async fn handle(
        &self,
        params: Option<Value>,
        caller: &CallerContext,
        ctx: &RpcContext,
    ) -> Result<Value, RpcError> {
        let command = InputCommand::MouseClick {
            x: require_i32_param(params.as_ref(), "x")?,
            y: require_i32_param(params.as_ref(), "y")?,
            button: MouseButton::parse(&optional_string_param(params.as_ref(), "button", "left")),
            double_click: optional_bool_param(params.as_ref(), "isDoubleClick", false),
        };
        dispatch(ctx, caller, command).await
    }
}

/// Move the pointer. One-way; no acknowledgment at any layer.
pub struct MouseMoveHandler;

#[async_trait]
impl MethodHandler for MouseMoveHandler {
    #[instrument(skip(self, ctx), fields(method = "input.mouseMove"))]
    async fn handle(
        &self,
        params: Option<Value>,
        caller: &CallerContext,
        ctx: &RpcContext,
    ) -> Result<Value, RpcError> {
        let command = InputCommand::MouseMove {
            x: require_i32_param(params.as_ref(), "x")?,
            y: require_i32_param(params.as_ref(), "y")?,
        };
        dispatch(ctx, caller, command).await
    }
}

/// Press-drag-release between two points.
pub struct MouseDragHandler;

#[async_trait]
impl MethodHandler for MouseDragHandler {
    #[instrument(skip(self, ctx), fields(method = "input.mouseDrag"))]
    async fn handle(
        &self,
        params: Option<Value>,
        caller: &CallerContext,
        ctx: &RpcContext,
    ) -> Result<Value, RpcError> {
        let command = InputCommand::MouseDrag {
            from_x: require_i32_param(params.as_ref(), "fromX")?,
            from_y: require_i32_param(params.as_ref(), "fromY")?,
            to_x: require_i32_param(params.as_ref(), "toX")?,
            to_y: require_i32_param(params.as_ref(), "toY")?,
            button: MouseButton::parse(&optional_string_param(params.as_ref(), "button", "left")),
        };
        dispatch(ctx, caller, command).await
    }
}

/// Scroll the wheel at a point.
pub struct MouseWheelHandler;

#[async_trait]
impl MethodHandler for MouseWheelHandler {
    #[instrument(skip(self, ctx), fields(method = "input.mouseWheel"))]
    async fn handle(
        &self,
        params: Option<Value>,
        caller: &CallerContext,
        ctx: &RpcContext,
    ) -> Result<Value, RpcError> {
        let command = InputCommand::MouseWheel {
            x: require_i32_param(params.as_ref(), "x")?,
            y: require_i32_param(params.as_ref(), "y")?,
            delta: require_i32_param(params.as_ref(), "delta")?,
        };
        dispatch(ctx, caller, command).await
    }
}

/// Press or release a single key.
pub struct KeyPressHandler;

#[async_trait]
impl MethodHandler for KeyPressHandler {
    #[instrument(skip(self, ctx), fields(method = "input.keyPress"))]
    async fn handle(
        &self,
        params: Option<Value>,
        caller: &CallerContext,
        ctx: &RpcContext,
    ) -> Result<Value, RpcError> {
        let command = InputCommand::KeyPress {
            key_code: require_u16_param(params.as_ref(), "keyCode")?,
            is_down: require_bool_param(params.as_ref(), "isDown")?,
        };
        dispatch(ctx, caller, command).await
    }
}

/// Type a text string.
pub struct TypeTextHandler;

#[async_trait]
impl MethodHandler for TypeTextHandler {
    #[instrument(skip(self, ctx, params), fields(method = "input.typeText"))]
    async fn handle(
        &self,
        params: Option<Value>,
        caller: &CallerContext,
        ctx: &RpcContext,
    ) -> Result<Value, RpcError> {
        let command = InputCommand::TypeText {
            text: require_string_param(params.as_ref(), "text")?,
        };
        dispatch(ctx, caller, command).await
    }
}

/// Press a key with modifiers held.
pub struct KeyCombinationHandler;

#[async_trait]
impl MethodHandler for KeyCombinationHandler {
    #[instrument(skip(self, ctx), fields(method = "input.keyCombination"))]
    async fn handle(
        &self,
        params: Option<Value>,
        caller: &CallerContext,
        ctx: &RpcContext,
    ) -> Result<Value, RpcError> {
        let command = InputCommand::KeyCombination {
            modifiers: Modifiers::parse_csv(&require_string_param(params.as_ref(), "modifiers")?),
            key_code: require_u16_param(params.as_ref(), "keyCode")?,
        };
        dispatch(ctx, caller, command).await
    }
}
