//! Notification fan-out handlers.
//!
//! Every operation here requires a resolved caller identity; an anonymous
//! caller gets the same response shape and zero delivered events. The
//! silent-drop policy is deliberate — unauthorized callers learn nothing
//! about which operations exist.

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, instrument};
use vantage_core::events::ServerEvent;
use vantage_core::identity::CallerContext;
use vantage_hub::Target;

use crate::context::RpcContext;
use crate::errors::RpcError;
use crate::handlers::{
    optional_string_param, require_bool_param, require_i64_param, require_string_param,
};
use crate::registry::MethodHandler;

/// Uniform response for every notify operation.
fn sent() -> Value {
    serde_json::json!({ "sent": true })
}

/// Resolved caller id, or `None` when the operation must silently drop.
fn gate(caller: &CallerContext, operation: &str) -> Option<i64> {
    let user_id = caller.user_id();
    if user_id.is_none() {
        debug!(
            connection_id = %caller.connection_id,
            operation,
            "notify operation dropped for unresolved identity"
        );
    }
    user_id
}

/// Send a directed notification to a user's connections.
pub struct SendToUserHandler;

#[async_trait]
impl MethodHandler for SendToUserHandler {
    #[instrument(skip(self, ctx), fields(method = "notify.sendToUser"))]
    async fn handle(
        &self,
        params: Option<Value>,
        caller: &CallerContext,
        ctx: &RpcContext,
    ) -> Result<Value, RpcError> {
        let target = require_i64_param(params.as_ref(), "targetUserId")?;
        let kind = optional_string_param(params.as_ref(), "type", "info");
        let title = require_string_param(params.as_ref(), "title")?;
        let message = require_string_param(params.as_ref(), "message")?;

        let Some(from) = gate(caller, "sendToUser") else {
            return Ok(sent());
        };
        let _ = ctx
            .broadcaster
            .send_to_user(target, &ServerEvent::notification(kind, title, message, from));
        Ok(sent())
    }
}

/// Relay an incoming phone call to a user's connections.
pub struct PhoneCallHandler;

#[async_trait]
impl MethodHandler for PhoneCallHandler {
    #[instrument(skip(self, ctx), fields(method = "notify.phoneCall"))]
    async fn handle(
        &self,
        params: Option<Value>,
        caller: &CallerContext,
        ctx: &RpcContext,
    ) -> Result<Value, RpcError> {
        let target = require_i64_param(params.as_ref(), "targetUserId")?;
        let caller_name = require_string_param(params.as_ref(), "callerName")?;
        let caller_phone = require_string_param(params.as_ref(), "callerPhoneNumber")?;
        let call_id = require_string_param(params.as_ref(), "callId")?;

        if gate(caller, "phoneCall").is_none() {
            return Ok(sent());
        }
        let _ = ctx.broadcaster.send_to_user(
            target,
            &ServerEvent::incoming_call(call_id, caller_name, caller_phone),
        );
        Ok(sent())
    }
}

/// Relay a new SMS to a user's connections.
///
/// The body is truncated to the preview length inside the event
/// constructor; the stored message (owned by the directory store) is
/// untouched.
pub struct SmsHandler;

#[async_trait]
impl MethodHandler for SmsHandler {
    #[instrument(skip(self, ctx, params), fields(method = "notify.sms"))]
    async fn handle(
        &self,
        params: Option<Value>,
        caller: &CallerContext,
        ctx: &RpcContext,
    ) -> Result<Value, RpcError> {
        let target = require_i64_param(params.as_ref(), "targetUserId")?;
        let sender_name = require_string_param(params.as_ref(), "senderName")?;
        let sender_phone = require_string_param(params.as_ref(), "senderPhoneNumber")?;
        let message = require_string_param(params.as_ref(), "message")?;

        if gate(caller, "sms").is_none() {
            return Ok(sent());
        }
        let _ = ctx
            .broadcaster
            .send_to_user(target, &ServerEvent::sms(sender_name, sender_phone, &message));
        Ok(sent())
    }
}

/// Announce the caller's phone going on- or off-line.
pub struct PhoneStatusHandler;

#[async_trait]
impl MethodHandler for PhoneStatusHandler {
    #[instrument(skip(self, ctx), fields(method = "notify.phoneStatus"))]
    async fn handle(
        &self,
        params: Option<Value>,
        caller: &CallerContext,
        ctx: &RpcContext,
    ) -> Result<Value, RpcError> {
        let is_online = require_bool_param(params.as_ref(), "isOnline")?;

        let Some(user_id) = gate(caller, "phoneStatus") else {
            return Ok(sent());
        };
        let _ = ctx.broadcaster.publish(
            Target::AllExcept(&caller.connection_id),
            &ServerEvent::phone_status(user_id, is_online),
        );
        Ok(sent())
    }
}

/// Send a typing indicator to a user's connections.
pub struct TypingHandler;

#[async_trait]
impl MethodHandler for TypingHandler {
    #[instrument(skip(self, ctx), fields(method = "notify.typing"))]
    async fn handle(
        &self,
        params: Option<Value>,
        caller: &CallerContext,
        ctx: &RpcContext,
    ) -> Result<Value, RpcError> {
        let target = require_i64_param(params.as_ref(), "targetUserId")?;
        let is_typing = require_bool_param(params.as_ref(), "isTyping")?;

        let Some(from) = gate(caller, "typing") else {
            return Ok(sent());
        };
        let _ = ctx
            .broadcaster
            .send_to_user(target, &ServerEvent::typing(from, is_typing));
        Ok(sent())
    }
}

/// Broadcast a system notification to every connection. Admin-gated.
pub struct BroadcastSystemHandler;

#[async_trait]
impl MethodHandler for BroadcastSystemHandler {
    #[instrument(skip(self, ctx), fields(method = "notify.broadcastSystem"))]
    async fn handle(
        &self,
        params: Option<Value>,
        caller: &CallerContext,
        ctx: &RpcContext,
    ) -> Result<Value, RpcError> {
        let title = require_string_param(params.as_ref(), "title")?;
        let message = require_string_param(params.as_ref(), "message")?;
        let kind = optional_string_param(params.as_ref(), "type", "info");

        // The admin gate (and its silent drop) lives in the broadcaster.
        let _ = ctx
            .broadcaster
            .broadcast_system(caller, &title, &message, &kind);
        Ok(sent())
    }
}
