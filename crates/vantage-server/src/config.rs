//! Server configuration.

use serde::{Deserialize, Serialize};
use vantage_core::identity::{Identity, Role};

/// Configuration for the Vantage gateway.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host to bind (default `"127.0.0.1"`).
    pub host: String,
    /// Port to bind (default `0` for auto-assign).
    pub port: u16,
    /// Maximum concurrent WebSocket connections.
    pub max_connections: usize,
    /// Heartbeat interval in seconds.
    pub heartbeat_interval_secs: u64,
    /// Heartbeat timeout in seconds (close after this long without a pong).
    pub heartbeat_timeout_secs: u64,
    /// Max WebSocket message size in bytes.
    pub max_message_size: usize,
    /// Upper bound in seconds on any single provider (capture/input) call.
    pub provider_deadline_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 0,
            max_connections: 50,
            heartbeat_interval_secs: 30,
            heartbeat_timeout_secs: 90,
            max_message_size: 16 * 1024 * 1024, // 16 MB
            provider_deadline_secs: 10,
        }
    }
}

/// A pre-shared development/test token mapped to an identity.
///
/// Production deployments inject a real [`vantage_core::IdentityResolver`];
/// these entries only feed the built-in static resolver.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenEntry {
    /// Opaque token presented at upgrade time.
    pub token: String,
    /// User id the token resolves to.
    pub user_id: i64,
    /// Role granted to the token.
    #[serde(default)]
    pub role: Role,
    /// Optional display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

impl TokenEntry {
    /// The identity this entry resolves to.
    #[must_use]
    pub fn identity(&self) -> Identity {
        Identity {
            user_id: self.user_id,
            display_name: self.display_name.clone(),
            role: self.role,
        }
    }
}

/// Identity-resolution configuration for the static resolver.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Known tokens.
    pub tokens: Vec<TokenEntry>,
}

/// Full configuration file layout.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Gateway settings.
    pub server: ServerConfig,
    /// Static identity entries.
    pub auth: AuthConfig,
}
