//! The session table.
//!
//! The registry is the single shared mutable resource of the subsystem:
//! all connect/disconnect mutation is serialized through its lock, and
//! disconnect cleanup (including group membership removal) happens here
//! so no other component can observe a half-torn-down connection.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::Serialize;
use tracing::debug;
use vantage_core::identity::Identity;
use vantage_core::ids::ConnectionId;

use crate::connection::ClientConnection;
use crate::groups::GroupDirectory;

/// In-memory record of a connection's lifecycle.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    /// Owning connection.
    pub connection_id: ConnectionId,
    /// Resolved subject identity, absent for anonymous connections.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject_user_id: Option<i64>,
    /// When the connection was established.
    pub connected_at: DateTime<Utc>,
    /// When the connection ended. Unset while the session is active.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disconnected_at: Option<DateTime<Utc>>,
}

impl Session {
    /// Whether the session is still live.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.disconnected_at.is_none()
    }
}

struct Entry {
    connection: Arc<ClientConnection>,
    session: Session,
}

/// Live connection/session table.
pub struct ConnectionRegistry {
    entries: RwLock<HashMap<ConnectionId, Entry>>,
    groups: Arc<GroupDirectory>,
}

impl ConnectionRegistry {
    /// Create an empty registry sharing the given group directory.
    pub fn new(groups: Arc<GroupDirectory>) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            groups,
        }
    }

    /// Register a new connection and create its session.
    ///
    /// When an identity is present the connection is auto-subscribed to
    /// its per-user group.
    pub fn on_connect(
        &self,
        connection: Arc<ClientConnection>,
        identity: Option<&Identity>,
    ) -> Session {
        let session = Session {
            connection_id: connection.id.clone(),
            subject_user_id: identity.map(|i| i.user_id),
            connected_at: Utc::now(),
            disconnected_at: None,
        };
        {
            let mut entries = self.entries.write();
            let _ = entries.insert(
                connection.id.clone(),
                Entry {
                    connection,
                    session: session.clone(),
                },
            );
        }
        if let Some(identity) = identity {
            self.groups.join(&session.connection_id, &identity.group_name());
        }
        debug!(
            connection_id = %session.connection_id,
            user_id = ?session.subject_user_id,
            "session registered"
        );
        session
    }

    /// Tear down a connection's session.
    ///
    /// Idempotent: a second disconnect for an unknown or already-removed
    /// connection returns `None` and touches nothing. Group membership
    /// removal runs unconditionally so a partially registered connection
    /// can never leak edges.
    pub fn on_disconnect(&self, connection_id: &ConnectionId) -> Option<Session> {
        let entry = self.entries.write().remove(connection_id);
        self.groups.leave_all(connection_id);
        entry.map(|entry| {
            let mut session = entry.session;
            session.disconnected_at = Some(Utc::now());
            debug!(connection_id = %session.connection_id, "session closed");
            session
        })
    }

    /// Look up the live connection handle for an id.
    pub fn get(&self, connection_id: &ConnectionId) -> Option<Arc<ClientConnection>> {
        self.entries
            .read()
            .get(connection_id)
            .map(|entry| entry.connection.clone())
    }

    /// Point-in-time snapshot of every active session.
    ///
    /// Callers must tolerate staleness — a session may disconnect between
    /// snapshot and use.
    pub fn list_active(&self) -> Vec<Session> {
        self.entries
            .read()
            .values()
            .map(|entry| entry.session.clone())
            .collect()
    }

    /// Every live connection handle.
    pub fn connections(&self) -> Vec<Arc<ClientConnection>> {
        self.entries
            .read()
            .values()
            .map(|entry| entry.connection.clone())
            .collect()
    }

    /// Number of live connections.
    pub fn connection_count(&self) -> usize {
        self.entries.read().len()
    }
}
