//! RPC handler modules and registration.

pub mod capture;
pub mod groups;
pub mod input;
pub mod notify;
pub mod session;
pub mod system;

use serde_json::Value;

use crate::errors::RpcError;
use crate::registry::MethodRegistry;

/// Register all RPC handlers with the registry.
pub fn register_all(registry: &mut MethodRegistry) {
    // System
    registry.register("system.ping", system::PingHandler);
    registry.register("system.getInfo", system::GetInfoHandler);

    // Session
    registry.register("session.listActive", session::ListActiveHandler);

    // Capture
    registry.register("capture.screen", capture::ScreenCaptureHandler);
    registry.register("capture.region", capture::RegionCaptureHandler);
    registry.register("capture.monitor", capture::MonitorCaptureHandler);

    // Input
    registry.register("input.mouseClick", input::MouseClickHandler);
    registry.register("input.mouseMove", input::MouseMoveHandler);
    registry.register("input.mouseDrag", input::MouseDragHandler);
    registry.register("input.mouseWheel", input::MouseWheelHandler);
    registry.register("input.keyPress", input::KeyPressHandler);
    registry.register("input.typeText", input::TypeTextHandler);
    registry.register("input.keyCombination", input::KeyCombinationHandler);

    // Groups
    registry.register("group.join", groups::JoinGroupHandler);
    registry.register("group.leave", groups::LeaveGroupHandler);
    registry.register("group.joinUser", groups::JoinUserGroupHandler);

    // Notify
    registry.register("notify.sendToUser", notify::SendToUserHandler);
    registry.register("notify.phoneCall", notify::PhoneCallHandler);
    registry.register("notify.sms", notify::SmsHandler);
    registry.register("notify.phoneStatus", notify::PhoneStatusHandler);
    registry.register("notify.typing", notify::TypingHandler);
    registry.register("notify.broadcastSystem", notify::BroadcastSystemHandler);
}

/// Extract a required parameter from the params object.
pub(crate) fn require_param<'a>(
    params: Option<&'a Value>,
    key: &str,
) -> Result<&'a Value, RpcError> {
    params
        .and_then(|p| p.get(key))
        .ok_or_else(|| RpcError::InvalidParams {
            message: format!("Missing required parameter: {key}"),
        })
}

/// Extract a required string parameter.
pub(crate) fn require_string_param(
    params: Option<&Value>,
    key: &str,
) -> Result<String, RpcError> {
    require_param(params, key)?
        .as_str()
        .map(ToOwned::to_owned)
        .ok_or_else(|| RpcError::InvalidParams {
            message: format!("Parameter '{key}' must be a string"),
        })
}

/// Extract a required integer parameter.
pub(crate) fn require_i64_param(params: Option<&Value>, key: &str) -> Result<i64, RpcError> {
    require_param(params, key)?
        .as_i64()
        .ok_or_else(|| RpcError::InvalidParams {
            message: format!("Parameter '{key}' must be an integer"),
        })
}

/// Extract a required `i32` parameter (screen coordinates, wheel delta).
pub(crate) fn require_i32_param(params: Option<&Value>, key: &str) -> Result<i32, RpcError> {
    i32::try_from(require_i64_param(params, key)?).map_err(|_| RpcError::InvalidParams {
        message: format!("Parameter '{key}' is out of range"),
    })
}

/// Extract a required `u32` parameter (dimensions, monitor index).
pub(crate) fn require_u32_param(params: Option<&Value>, key: &str) -> Result<u32, RpcError> {
    u32::try_from(require_i64_param(params, key)?).map_err(|_| RpcError::InvalidParams {
        message: format!("Parameter '{key}' must be a non-negative integer"),
    })
}

/// Extract a required `u16` parameter (virtual key codes).
pub(crate) fn require_u16_param(params: Option<&Value>, key: &str) -> Result<u16, RpcError> {
    u16::try_from(require_i64_param(params, key)?).map_err(|_| RpcError::InvalidParams {
        message: format!("Parameter '{key}' must be a 16-bit key code"),
    })
}

/// Extract a required boolean parameter.
pub(crate) fn require_bool_param(params: Option<&Value>, key: &str) -> Result<bool, RpcError> {
    require_param(params, key)?
        .as_bool()
        .ok_or_else(|| RpcError::InvalidParams {
            message: format!("Parameter '{key}' must be a boolean"),
        })
}

/// Extract an optional boolean parameter with a default.
pub(crate) fn optional_bool_param(params: Option<&Value>, key: &str, default: bool) -> bool {
    params
        .and_then(|p| p.get(key))
        .and_then(Value::as_bool)
        .unwrap_or(default)
}

/// Extract an optional string parameter with a default.
pub(crate) fn optional_string_param(params: Option<&Value>, key: &str, default: &str) -> String {
    params
        .and_then(|p| p.get(key))
        .and_then(Value::as_str)
        .unwrap_or(default)
        .to_owned()
}

/// Extract the capture quality parameter, clamped to `1..=100`.
#[allow(clippy::cast_possible_truncation)]
pub(crate) fn quality_param(params: Option<&Value>) -> Result<u8, RpcError> {
    let raw = require_i64_param(params, "quality")?;
    Ok(raw.clamp(1, 100) as u8)
}
