//! Group membership directory.
//!
//! A group is not a stored entity — only the `(group, connection)`
//! membership edges exist, and a group vanishes when its last member
//! leaves. The directory never expires memberships on its own; the
//! connection registry's disconnect cleanup is authoritative.

use std::collections::{HashMap, HashSet};

use parking_lot::RwLock;
use vantage_core::ids::ConnectionId;

/// Maps group names to the set of currently subscribed connections.
pub struct GroupDirectory {
    members: RwLock<HashMap<String, HashSet<ConnectionId>>>,
}

impl GroupDirectory {
    /// Create an empty directory.
    pub fn new() -> Self {
        Self {
            members: RwLock::new(HashMap::new()),
        }
    }

    /// Add a connection to a group. Idempotent.
    pub fn join(&self, connection_id: &ConnectionId, group: &str) {
        let mut members = self.members.write();
        let _ = members
            .entry(group.to_owned())
            .or_default()
            .insert(connection_id.clone());
    }

    /// Remove a connection from a group. Idempotent.
    pub fn leave(&self, connection_id: &ConnectionId, group: &str) {
        let mut members = self.members.write();
        if let Some(set) = members.get_mut(group) {
            let _ = set.remove(connection_id);
            if set.is_empty() {
                let _ = members.remove(group);
            }
        }
    }

    /// Remove a connection from every group it belongs to.
    pub fn leave_all(&self, connection_id: &ConnectionId) {
        let mut members = self.members.write();
        members.retain(|_, set| {
            let _ = set.remove(connection_id);
            !set.is_empty()
        });
    }

    /// Point-in-time membership snapshot for a group.
    pub fn members(&self, group: &str) -> HashSet<ConnectionId> {
        self.members
            .read()
            .get(group)
            .cloned()
            .unwrap_or_default()
    }

    /// Whether a connection is currently in a group.
    pub fn contains(&self, group: &str, connection_id: &ConnectionId) -> bool {
        self.members
            .read()
            .get(group)
            .is_some_and(|set| set.contains(connection_id))
    }

    /// Number of groups with at least one member.
    pub fn group_count(&self) -> usize {
        self.members.read().len()
    }
}

impl Default for GroupDirectory {
    fn default() -> Self {
        Self::new()
    }
}
