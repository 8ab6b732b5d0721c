//! Server→client push events.
//!
//! Every message the server pushes outside the request/response envelope
//! is a variant of [`ServerEvent`]: capture payloads and acks to the
//! calling connection, presence changes, and the notification family
//! fanned out to groups. Events are ephemeral — constructed, serialized,
//! sent, and discarded.

use serde::{Deserialize, Serialize};

use crate::input::{MonitorInfo, ScreenSize};

/// Maximum characters of an SMS body included in its notification preview.
pub const SMS_PREVIEW_MAX_CHARS: usize = 50;

/// Marker appended to a truncated SMS preview.
pub const SMS_PREVIEW_ELLIPSIS: &str = "...";

/// Current UTC timestamp in RFC-3339 millisecond format.
fn now_rfc3339() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}

/// A typed server→client event.
///
/// The envelope tag claims the JSON key `type`, so the notification
/// category inside `notification.receive` / `system.notification` is
/// carried as `kind` on the wire.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ServerEvent {
    /// Screen dimensions and monitor layout, sent once after connect.
    #[serde(rename = "screen.info")]
    #[serde(rename_all = "camelCase")]
    ScreenInfo {
        /// Full virtual-desktop dimensions.
        screen_size: ScreenSize,
        /// Attached monitors.
        monitors: Vec<MonitorInfo>,
    },

    /// Full-screen capture result.
    #[serde(rename = "screen.capture")]
    ScreenCapture {
        /// Base64-encoded image bytes.
        image: String,
        /// Capture time.
        timestamp: String,
    },

    /// Region capture result.
    #[serde(rename = "region.capture")]
    RegionCapture {
        /// Base64-encoded image bytes.
        image: String,
        /// Capture time.
        timestamp: String,
    },

    /// Single-monitor capture result.
    #[serde(rename = "monitor.capture")]
    MonitorCapture {
        /// Base64-encoded image bytes.
        image: String,
        /// Capture time.
        timestamp: String,
    },

    /// Acknowledgment of a dispatched input command.
    #[serde(rename = "input.ack")]
    InputAck {
        /// Name of the acknowledged command (e.g. `mouseClick`).
        operation: String,
    },

    /// Operation-scoped failure report to the calling connection.
    #[serde(rename = "error")]
    Error {
        /// Human-readable reason.
        reason: String,
    },

    /// A user came online.
    #[serde(rename = "user.online")]
    #[serde(rename_all = "camelCase")]
    UserOnline {
        /// The user in question.
        user_id: i64,
    },

    /// A user went offline.
    #[serde(rename = "user.offline")]
    #[serde(rename_all = "camelCase")]
    UserOffline {
        /// The user in question.
        user_id: i64,
    },

    /// Directed notification from another user.
    #[serde(rename = "notification.receive")]
    #[serde(rename_all = "camelCase")]
    ReceiveNotification {
        /// Notification category (e.g. `info`, `warning`).
        kind: String,
        /// Short title.
        title: String,
        /// Body text.
        message: String,
        /// Sending user.
        from_user_id: i64,
        /// Send time.
        timestamp: String,
    },

    /// Incoming phone call.
    #[serde(rename = "call.incoming")]
    #[serde(rename_all = "camelCase")]
    IncomingCall {
        /// Call identifier from the telephony layer.
        call_id: String,
        /// Caller display name.
        caller_name: String,
        /// Caller number.
        caller_phone_number: String,
        /// Ring time.
        timestamp: String,
    },

    /// New SMS notification with a truncated preview.
    #[serde(rename = "sms.new")]
    #[serde(rename_all = "camelCase")]
    NewSms {
        /// Sender display name.
        sender_name: String,
        /// Sender number.
        sender_phone_number: String,
        /// Message preview, at most [`SMS_PREVIEW_MAX_CHARS`] characters
        /// plus the ellipsis marker.
        message: String,
        /// Receive time.
        timestamp: String,
    },

    /// A user's phone went on- or off-line.
    #[serde(rename = "phone.status")]
    #[serde(rename_all = "camelCase")]
    PhoneStatusChanged {
        /// The user whose phone changed state.
        user_id: i64,
        /// New state.
        is_online: bool,
        /// Change time.
        timestamp: String,
    },

    /// Typing indicator.
    #[serde(rename = "typing.indicator")]
    #[serde(rename_all = "camelCase")]
    TypingIndicator {
        /// Typing user.
        from_user_id: i64,
        /// Whether typing started (`true`) or stopped (`false`).
        is_typing: bool,
        /// Indicator time.
        timestamp: String,
    },

    /// Admin-originated system-wide notification.
    #[serde(rename = "system.notification")]
    SystemNotification {
        /// Short title.
        title: String,
        /// Body text.
        message: String,
        /// Notification category.
        kind: String,
        /// Send time.
        timestamp: String,
    },
}

impl ServerEvent {
    /// Wire tag of this event (the JSON `type` field).
    #[must_use]
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::ScreenInfo { .. } => "screen.info",
            Self::ScreenCapture { .. } => "screen.capture",
            Self::RegionCapture { .. } => "region.capture",
            Self::MonitorCapture { .. } => "monitor.capture",
            Self::InputAck { .. } => "input.ack",
            Self::Error { .. } => "error",
            Self::UserOnline { .. } => "user.online",
            Self::UserOffline { .. } => "user.offline",
            Self::ReceiveNotification { .. } => "notification.receive",
            Self::IncomingCall { .. } => "call.incoming",
            Self::NewSms { .. } => "sms.new",
            Self::PhoneStatusChanged { .. } => "phone.status",
            Self::TypingIndicator { .. } => "typing.indicator",
            Self::SystemNotification { .. } => "system.notification",
        }
    }

    /// Screen-info event.
    #[must_use]
    pub fn screen_info(screen_size: ScreenSize, monitors: Vec<MonitorInfo>) -> Self {
        Self::ScreenInfo {
            screen_size,
            monitors,
        }
    }

    /// Full-screen capture event with the current timestamp.
    #[must_use]
    pub fn screen_capture(image: String) -> Self {
        Self::ScreenCapture {
            image,
            timestamp: now_rfc3339(),
        }
    }

    /// Region capture event with the current timestamp.
    #[must_use]
    pub fn region_capture(image: String) -> Self {
        Self::RegionCapture {
            image,
            timestamp: now_rfc3339(),
        }
    }

    /// Monitor capture event with the current timestamp.
    #[must_use]
    pub fn monitor_capture(image: String) -> Self {
        Self::MonitorCapture {
            image,
            timestamp: now_rfc3339(),
        }
    }

    /// Input acknowledgment tagged with the command name.
    #[must_use]
    pub fn input_ack(operation: impl Into<String>) -> Self {
        Self::InputAck {
            operation: operation.into(),
        }
    }

    /// Operation-scoped error report.
    #[must_use]
    pub fn error(reason: impl Into<String>) -> Self {
        Self::Error {
            reason: reason.into(),
        }
    }

    /// Presence event for `user_id` coming online or going offline.
    #[must_use]
    pub fn presence(user_id: i64, is_online: bool) -> Self {
        if is_online {
            Self::UserOnline { user_id }
        } else {
            Self::UserOffline { user_id }
        }
    }

    /// Directed notification.
    #[must_use]
    pub fn notification(
        kind: impl Into<String>,
        title: impl Into<String>,
        message: impl Into<String>,
        from_user_id: i64,
    ) -> Self {
        Self::ReceiveNotification {
            kind: kind.into(),
            title: title.into(),
            message: message.into(),
            from_user_id,
            timestamp: now_rfc3339(),
        }
    }

    /// Incoming-call notification.
    #[must_use]
    pub fn incoming_call(
        call_id: impl Into<String>,
        caller_name: impl Into<String>,
        caller_phone_number: impl Into<String>,
    ) -> Self {
        Self::IncomingCall {
            call_id: call_id.into(),
            caller_name: caller_name.into(),
            caller_phone_number: caller_phone_number.into(),
            timestamp: now_rfc3339(),
        }
    }

    /// SMS notification.
    ///
    /// The body is truncated to [`SMS_PREVIEW_MAX_CHARS`] characters with
    /// a trailing ellipsis marker. This is a presentation contract of the
    /// event; the stored message is untouched.
    #[must_use]
    pub fn sms(
        sender_name: impl Into<String>,
        sender_phone_number: impl Into<String>,
        message: &str,
    ) -> Self {
        Self::NewSms {
            sender_name: sender_name.into(),
            sender_phone_number: sender_phone_number.into(),
            message: sms_preview(message),
            timestamp: now_rfc3339(),
        }
    }

    /// Phone-status change.
    #[must_use]
    pub fn phone_status(user_id: i64, is_online: bool) -> Self {
        Self::PhoneStatusChanged {
            user_id,
            is_online,
            timestamp: now_rfc3339(),
        }
    }

    /// Typing indicator.
    #[must_use]
    pub fn typing(from_user_id: i64, is_typing: bool) -> Self {
        Self::TypingIndicator {
            from_user_id,
            is_typing,
            timestamp: now_rfc3339(),
        }
    }

    /// System-wide notification.
    #[must_use]
    pub fn system_notification(
        title: impl Into<String>,
        message: impl Into<String>,
        kind: impl Into<String>,
    ) -> Self {
        Self::SystemNotification {
            title: title.into(),
            message: message.into(),
            kind: kind.into(),
            timestamp: now_rfc3339(),
        }
    }
}

/// Truncate an SMS body for notification display.
///
/// Counts characters, not bytes, so multi-byte text never splits.
#[must_use]
pub fn sms_preview(message: &str) -> String {
    if message.chars().count() > SMS_PREVIEW_MAX_CHARS {
        let mut preview: String = message.chars().take(SMS_PREVIEW_MAX_CHARS).collect();
        preview.push_str(SMS_PREVIEW_ELLIPSIS);
        preview
    } else {
        message.to_owned()
    }
}
