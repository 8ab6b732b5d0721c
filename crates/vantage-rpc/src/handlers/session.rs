//! Session handlers.

use async_trait::async_trait;
use serde_json::Value;
use tracing::instrument;
use vantage_core::identity::CallerContext;

use crate::context::RpcContext;
use crate::errors::RpcError;
use crate::registry::MethodHandler;

/// List every currently active session.
///
/// The list is a point-in-time snapshot; a session may disconnect between
/// snapshot and delivery.
pub struct ListActiveHandler;

#[async_trait]
impl MethodHandler for ListActiveHandler {
    #[instrument(skip(self, ctx), fields(method = "session.listActive"))]
    async fn handle(
        &self,
        _params: Option<Value>,
        _caller: &CallerContext,
        ctx: &RpcContext,
    ) -> Result<Value, RpcError> {
        let sessions = ctx
            .connections
            .list_active()
            .into_iter()
            .map(|session| {
                let is_active = session.is_active();
                let mut value = serde_json::to_value(&session).map_err(|err| {
                    RpcError::Internal {
                        message: format!("failed to serialize session: {err}"),
                    }
                })?;
                if let Value::Object(ref mut map) = value {
                    let _ = map.insert("isActive".into(), Value::Bool(is_active));
                }
                Ok(value)
            })
            .collect::<Result<Vec<_>, RpcError>>()?;
        Ok(serde_json::json!({ "sessions": sessions }))
    }
}
