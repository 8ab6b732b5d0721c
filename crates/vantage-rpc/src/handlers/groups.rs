//! Group membership handlers.

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, instrument};
use vantage_core::identity::{CallerContext, user_group_name};

use crate::context::RpcContext;
use crate::errors::RpcError;
use crate::handlers::{require_i64_param, require_string_param};
use crate::registry::MethodHandler;

/// Join an ad-hoc group.
pub struct JoinGroupHandler;

#[async_trait]
impl MethodHandler for JoinGroupHandler {
    #[instrument(skip(self, ctx), fields(method = "group.join"))]
    async fn handle(
        &self,
        params: Option<Value>,
        caller: &CallerContext,
        ctx: &RpcContext,
    ) -> Result<Value, RpcError> {
        let name = require_string_param(params.as_ref(), "name")?;
        ctx.groups.join(&caller.connection_id, &name);
        debug!(connection_id = %caller.connection_id, group = %name, "joined group");
        Ok(serde_json::json!({ "ok": true }))
    }
}

/// Leave an ad-hoc group.
pub struct LeaveGroupHandler;

#[async_trait]
impl MethodHandler for LeaveGroupHandler {
    #[instrument(skip(self, ctx), fields(method = "group.leave"))]
    async fn handle(
        &self,
        params: Option<Value>,
        caller: &CallerContext,
        ctx: &RpcContext,
    ) -> Result<Value, RpcError> {
        let name = require_string_param(params.as_ref(), "name")?;
        ctx.groups.leave(&caller.connection_id, &name);
        debug!(connection_id = %caller.connection_id, group = %name, "left group");
        Ok(serde_json::json!({ "ok": true }))
    }
}

/// Join a per-user group.
///
/// Only the user's own group may be joined this way; a mismatched
/// `userId` is silently dropped (same response, no membership change).
pub struct JoinUserGroupHandler;

#[async_trait]
impl MethodHandler for JoinUserGroupHandler {
    #[instrument(skip(self, ctx), fields(method = "group.joinUser"))]
    async fn handle(
        &self,
        params: Option<Value>,
        caller: &CallerContext,
        ctx: &RpcContext,
    ) -> Result<Value, RpcError> {
        let user_id = require_i64_param(params.as_ref(), "userId")?;
        if caller.user_id() != Some(user_id) {
            debug!(
                connection_id = %caller.connection_id,
                requested = user_id,
                "user-group join dropped for mismatched identity"
            );
            return Ok(serde_json::json!({ "ok": true }));
        }
        ctx.groups.join(&caller.connection_id, &user_group_name(user_id));
        Ok(serde_json::json!({ "ok": true }))
    }
}
