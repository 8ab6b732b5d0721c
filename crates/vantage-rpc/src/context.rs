//! RPC dependency-injection context.

use std::sync::Arc;
use std::time::{Duration, Instant};

use vantage_capture::DesktopProvider;
use vantage_hub::{Broadcaster, ConnectionRegistry, GroupDirectory};

/// Shared context passed to every RPC handler.
///
/// Everything a handler touches arrives through this struct — there is no
/// ambient global state anywhere in the protocol engine.
pub struct RpcContext {
    /// Live connection/session table.
    pub connections: Arc<ConnectionRegistry>,
    /// Group membership directory.
    pub groups: Arc<GroupDirectory>,
    /// Event fan-out engine.
    pub broadcaster: Arc<Broadcaster>,
    /// Injected desktop capture/input capability.
    pub provider: Arc<dyn DesktopProvider>,
    /// Upper bound on any single provider call.
    pub provider_deadline: Duration,
    /// When the server started (for uptime calculation).
    pub server_start_time: Instant,
}

#[cfg(test)]
mod tests {
    use crate::handlers::test_helpers::make_test_context;

    #[test]
    fn context_has_server_start_time() {
        let ctx = make_test_context();
        assert!(ctx.server_start_time.elapsed().as_secs() < 5);
    }

    #[test]
    fn context_starts_with_no_connections() {
        let ctx = make_test_context();
        assert_eq!(ctx.connections.connection_count(), 0);
        assert_eq!(ctx.groups.group_count(), 0);
    }

    #[test]
    fn context_provider_deadline_is_positive() {
        let ctx = make_test_context();
        assert!(ctx.provider_deadline.as_millis() > 0);
    }

    #[test]
    fn context_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<super::RpcContext>();
    }
}
