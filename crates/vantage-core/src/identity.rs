//! Caller identity, roles, and the per-user group naming scheme.
//!
//! Identity verification itself is external: an [`IdentityResolver`]
//! implementation (backed by whatever the host application uses for
//! authentication) turns an opaque token into a verified [`Identity`].
//! This crate only defines the seam and the types that flow through it.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::ids::ConnectionId;

/// Authorization role attached to a verified identity.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Regular user.
    #[default]
    User,
    /// Administrator — may broadcast system notifications.
    Admin,
}

impl Role {
    /// Whether this role grants admin-gated operations.
    #[must_use]
    pub fn is_admin(self) -> bool {
        matches!(self, Self::Admin)
    }
}

/// A verified subject identity handed to the core by the identity provider.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    /// Stable numeric user id.
    pub user_id: i64,
    /// Optional human-readable name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    /// Authorization role.
    #[serde(default)]
    pub role: Role,
}

impl Identity {
    /// Create an identity with no display name.
    #[must_use]
    pub fn new(user_id: i64, role: Role) -> Self {
        Self {
            user_id,
            display_name: None,
            role,
        }
    }

    /// The deterministic per-user group name for this identity.
    #[must_use]
    pub fn group_name(&self) -> String {
        user_group_name(self.user_id)
    }
}

/// Deterministic per-user group name.
///
/// Every connection with a resolved identity is auto-subscribed to this
/// group for the duration of the connection.
#[must_use]
pub fn user_group_name(user_id: i64) -> String {
    format!("user:{user_id}")
}

/// Explicit caller context passed into every RPC handler.
///
/// Authorization checks are pure functions of this value — there is no
/// ambient request principal anywhere in the core.
#[derive(Clone, Debug)]
pub struct CallerContext {
    /// The caller's connection.
    pub connection_id: ConnectionId,
    /// Resolved identity, if any. `None` means the connection is anonymous.
    pub identity: Option<Identity>,
}

impl CallerContext {
    /// Context for a connection with a resolved identity.
    #[must_use]
    pub fn new(connection_id: ConnectionId, identity: Identity) -> Self {
        Self {
            connection_id,
            identity: Some(identity),
        }
    }

    /// Context for a connection whose identity never resolved.
    #[must_use]
    pub fn anonymous(connection_id: ConnectionId) -> Self {
        Self {
            connection_id,
            identity: None,
        }
    }

    /// The caller's user id, if identity resolved.
    #[must_use]
    pub fn user_id(&self) -> Option<i64> {
        self.identity.as_ref().map(|i| i.user_id)
    }

    /// Whether the caller holds the admin role.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.identity.as_ref().is_some_and(|i| i.role.is_admin())
    }
}

/// External identity provider seam.
///
/// Implementations validate `token` however the host application
/// authenticates (cookie, JWT, opaque session key) and hand back a
/// verified identity, or `None` when the token is absent or invalid.
#[async_trait]
pub trait IdentityResolver: Send + Sync {
    /// Resolve a transport-level token into a verified identity.
    async fn resolve(&self, token: &str) -> Option<Identity>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_admin_check() {
        assert!(Role::Admin.is_admin());
        assert!(!Role::User.is_admin());
    }

    #[test]
    fn default_role_is_user() {
        assert_eq!(Role::default(), Role::User);
    }

    #[test]
    fn user_group_name_is_deterministic() {
        assert_eq!(user_group_name(7), "user:7");
        assert_eq!(user_group_name(7), Identity::new(7, Role::User).group_name());
    }

    #[test]
    fn identity_serde_camel_case() {
        let identity = Identity {
            user_id: 3,
            display_name: Some("Dana".into()),
            role: Role::Admin,
        };
        let json = serde_json::to_value(&identity).unwrap();
        assert_eq!(json["userId"], 3);
        assert_eq!(json["displayName"], "Dana");
        assert_eq!(json["role"], "admin");
    }

    #[test]
    fn identity_deserializes_without_role() {
        let identity: Identity = serde_json::from_str(r#"{"userId": 9}"#).unwrap();
        assert_eq!(identity.user_id, 9);
        assert_eq!(identity.role, Role::User);
    }

    #[test]
    fn anonymous_caller_has_no_user_id() {
        let caller = CallerContext::anonymous(ConnectionId::from("c1"));
        assert!(caller.user_id().is_none());
        assert!(!caller.is_admin());
    }

    #[test]
    fn resolved_caller_exposes_user_id() {
        let caller = CallerContext::new(ConnectionId::from("c1"), Identity::new(42, Role::User));
        assert_eq!(caller.user_id(), Some(42));
        assert!(!caller.is_admin());
    }

    #[test]
    fn admin_caller_is_admin() {
        let caller = CallerContext::new(ConnectionId::from("c1"), Identity::new(1, Role::Admin));
        assert!(caller.is_admin());
    }
}
