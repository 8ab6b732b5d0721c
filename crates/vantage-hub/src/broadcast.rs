//! Event fan-out to connected clients.

use std::sync::Arc;

use tracing::{debug, warn};
use vantage_core::events::ServerEvent;
use vantage_core::identity::{CallerContext, user_group_name};
use vantage_core::ids::ConnectionId;

use crate::connection::ClientConnection;
use crate::groups::GroupDirectory;
use crate::registry::ConnectionRegistry;

/// Addressing for a single publish.
#[derive(Clone, Copy, Debug)]
pub enum Target<'a> {
    /// One connection.
    Connection(&'a ConnectionId),
    /// Every current member of a named group.
    Group(&'a str),
    /// Every live connection.
    All,
    /// Every live connection except one (typically the originator).
    AllExcept(&'a ConnectionId),
}

/// Publishes events to sets of connections.
///
/// Delivery is best-effort and at-most-once per currently-connected
/// target: the recipient set is resolved at publish time, the event is
/// serialized once, and each recipient gets a non-blocking enqueue. A
/// target that is not connected at publish time never receives the event.
pub struct Broadcaster {
    registry: Arc<ConnectionRegistry>,
    groups: Arc<GroupDirectory>,
}

impl Broadcaster {
    /// Create a broadcaster over the shared registry and group directory.
    pub fn new(registry: Arc<ConnectionRegistry>, groups: Arc<GroupDirectory>) -> Self {
        Self { registry, groups }
    }

    /// Publish an event to a target set.
    ///
    /// Returns the number of connections the event was enqueued for.
    pub fn publish(&self, target: Target<'_>, event: &ServerEvent) -> usize {
        let json = match serde_json::to_string(event) {
            Ok(json) => Arc::new(json),
            Err(err) => {
                warn!(event_type = event.event_type(), error = %err, "failed to serialize event");
                return 0;
            }
        };

        let recipients: Vec<Arc<ClientConnection>> = match target {
            Target::Connection(id) => self.registry.get(id).into_iter().collect(),
            Target::Group(name) => self
                .groups
                .members(name)
                .iter()
                .filter_map(|id| self.registry.get(id))
                .collect(),
            Target::All => self.registry.connections(),
            Target::AllExcept(excluded) => self
                .registry
                .connections()
                .into_iter()
                .filter(|conn| &conn.id != excluded)
                .collect(),
        };

        let mut delivered = 0;
        for conn in &recipients {
            if conn.send(json.clone()) {
                delivered += 1;
            } else {
                warn!(
                    conn_id = %conn.id,
                    event_type = event.event_type(),
                    "failed to enqueue event for client"
                );
            }
        }
        debug!(
            event_type = event.event_type(),
            recipients = recipients.len(),
            delivered,
            "published event"
        );
        delivered
    }

    /// Publish an event to a user's per-user group.
    pub fn send_to_user(&self, target_user_id: i64, event: &ServerEvent) -> usize {
        self.publish(Target::Group(&user_group_name(target_user_id)), event)
    }

    /// Announce a presence change to everyone except the originating
    /// connection.
    pub fn notify_presence(&self, user_id: i64, is_online: bool, origin: &ConnectionId) -> usize {
        self.publish(
            Target::AllExcept(origin),
            &ServerEvent::presence(user_id, is_online),
        )
    }

    /// Broadcast a system notification to every connection.
    ///
    /// Admin-gated: a caller without the admin role is silently dropped —
    /// no event is sent and no error is surfaced.
    pub fn broadcast_system(
        &self,
        caller: &CallerContext,
        title: &str,
        message: &str,
        kind: &str,
    ) -> usize {
        if !caller.is_admin() {
            debug!(
                connection_id = %caller.connection_id,
                "system broadcast dropped for non-admin caller"
            );
            return 0;
        }
        self.publish(
            Target::All,
            &ServerEvent::system_notification(title, message, kind),
        )
    }
}
