//! WebSocket session lifecycle — handles a single connected client from
//! upgrade through disconnect.
//!
//! One task pair per connection: the inbound loop dispatches commands in
//! arrival order (a single client's commands are never reordered), the
//! outbound task drains the connection's ordered send channel and owns
//! the Ping/Pong heartbeat. Handlers from different connections run
//! concurrently on the runtime's worker pool.

use std::sync::Arc;
use std::time::Duration;

use axum::extract::ws::{Message, WebSocket};
use futures::{SinkExt, StreamExt};
use metrics::{counter, gauge, histogram};
use tokio::sync::mpsc;
use tracing::{debug, info, instrument, warn};
use vantage_capture::with_deadline;
use vantage_core::events::ServerEvent;
use vantage_core::identity::{CallerContext, Identity};
use vantage_core::ids::ConnectionId;
use vantage_hub::ClientConnection;
use vantage_rpc::context::RpcContext;
use vantage_rpc::registry::MethodRegistry;

use super::handler::handle_message;

/// Outbound channel depth per connection.
const SEND_QUEUE_DEPTH: usize = 1024;

/// Run a WebSocket session for a connected client.
///
/// 1. Registers the session (auto-joining the per-user group)
/// 2. Sends a `screen.info` event to the new client
/// 3. Announces `user.online` to everyone else
/// 4. Dispatches incoming frames as RPC requests, in arrival order
/// 5. Forwards outbound events/responses and sends periodic Pings
/// 6. On disconnect: deregisters, strips memberships, announces
///    `user.offline`
#[instrument(skip_all, fields(connection_id, user_id))]
pub async fn run_ws_session(
    ws: WebSocket,
    identity: Option<Identity>,
    registry: Arc<MethodRegistry>,
    ctx: Arc<RpcContext>,
    heartbeat_interval: Duration,
    pong_timeout: Duration,
) {
    let (mut ws_tx, mut ws_rx) = ws.split();

    let connection_id = ConnectionId::new();
    let (send_tx, mut send_rx) = mpsc::channel::<Arc<String>>(SEND_QUEUE_DEPTH);
    let connection = Arc::new(ClientConnection::new(connection_id.clone(), send_tx));

    let span = tracing::Span::current();
    let _ = span.record("connection_id", connection_id.as_str());
    if let Some(ref identity) = identity {
        let _ = span.record("user_id", identity.user_id);
    }

    let caller = match identity.clone() {
        Some(identity) => CallerContext::new(connection_id.clone(), identity),
        None => CallerContext::anonymous(connection_id.clone()),
    };

    info!("client connected");
    counter!("ws_connections_total").increment(1);
    gauge!("ws_connections_active").increment(1.0);

    let session = ctx.connections.on_connect(connection.clone(), identity.as_ref());

    // Screen info goes to the new client once, before anything else.
    send_screen_info(&ctx, &connection).await;

    if let Some(user_id) = session.subject_user_id {
        let _ = ctx.broadcaster.notify_presence(user_id, true, &connection_id);
    }

    // Outbound forwarder with periodic Ping frames.
    let outbound_conn = connection.clone();
    let outbound = tokio::spawn(async move {
        let mut ping_interval = tokio::time::interval(heartbeat_interval);
        // Skip the immediate first tick
        let _ = ping_interval.tick().await;

        loop {
            tokio::select! {
                msg = send_rx.recv() => {
                    match msg {
                        Some(text) => {
                            if ws_tx.send(Message::Text(text.as_str().into())).await.is_err() {
                                break;
                            }
                        }
                        None => break,
                    }
                }
                _ = ping_interval.tick() => {
                    if !outbound_conn.check_alive()
                        && outbound_conn.last_pong_elapsed() > pong_timeout
                    {
                        warn!("client unresponsive for {pong_timeout:?}, disconnecting");
                        break;
                    }
                    if ws_tx.send(Message::Ping(Vec::new().into())).await.is_err() {
                        break;
                    }
                }
            }
        }
    });

    // Process incoming messages, one at a time, in arrival order.
    while let Some(Ok(msg)) = ws_rx.next().await {
        let text = match msg {
            Message::Text(ref text) => Some(text.to_string()),
            Message::Binary(ref data) => match std::str::from_utf8(data) {
                Ok(text) => Some(text.to_owned()),
                Err(_) => {
                    debug!(len = data.len(), "ignoring non-UTF8 binary frame");
                    None
                }
            },
            Message::Close(_) => {
                debug!("client sent close frame");
                break;
            }
            Message::Ping(_) | Message::Pong(_) => {
                connection.mark_alive();
                None
            }
        };

        let Some(text) = text else { continue };

        let result = handle_message(&text, &registry, &caller, &ctx).await;
        if let Some(response) = result.response {
            match serde_json::to_string(&response) {
                Ok(json) => {
                    if !connection.send(Arc::new(json)) {
                        debug!("failed to enqueue response (channel full or closed)");
                    }
                }
                Err(err) => {
                    tracing::error!(error = %err, "failed to serialize response");
                }
            }
        }
    }

    // Clean up
    info!(dropped = connection.drop_count(), "client disconnected");
    counter!("ws_disconnections_total").increment(1);
    gauge!("ws_connections_active").decrement(1.0);
    histogram!("ws_connection_duration_seconds").record(connection.age().as_secs_f64());
    outbound.abort();

    if let Some(finished) = ctx.connections.on_disconnect(&connection_id) {
        if let Some(user_id) = finished.subject_user_id {
            let _ = ctx.broadcaster.notify_presence(user_id, false, &connection_id);
        }
    }
}

/// Push the screen layout to a freshly connected client.
///
/// Provider failure here is not fatal to the connection — the client just
/// doesn't get a `screen.info` event.
async fn send_screen_info(ctx: &RpcContext, connection: &ClientConnection) {
    let size = with_deadline(ctx.provider_deadline, ctx.provider.screen_size()).await;
    let monitors = with_deadline(ctx.provider_deadline, ctx.provider.monitors()).await;
    match (size, monitors) {
        (Ok(size), Ok(monitors)) => {
            let _ = connection.send_event(&ServerEvent::screen_info(size, monitors));
        }
        (Err(err), _) | (_, Err(err)) => {
            warn!(error = %err, "screen info unavailable at connect");
        }
    }
}

#[cfg(test)]
mod tests {
    // Full session behavior (upgrade, heartbeat, presence) requires real
    // WebSocket connections and is covered by tests/integration.rs. The
    // unit tests here pin the connect-time screen.info contract.

    use super::*;
    use std::time::Instant;
    use vantage_capture::UnsupportedProvider;
    use vantage_hub::{Broadcaster, ConnectionRegistry, GroupDirectory};

    fn make_ctx(provider: Arc<dyn vantage_capture::DesktopProvider>) -> RpcContext {
        let groups = Arc::new(GroupDirectory::new());
        let connections = Arc::new(ConnectionRegistry::new(groups.clone()));
        let broadcaster = Arc::new(Broadcaster::new(connections.clone(), groups.clone()));
        RpcContext {
            connections,
            groups,
            broadcaster,
            provider,
            provider_deadline: Duration::from_millis(200),
            server_start_time: Instant::now(),
        }
    }

    #[tokio::test]
    async fn screen_info_skipped_when_provider_unavailable() {
        let ctx = make_ctx(Arc::new(UnsupportedProvider));
        let (tx, mut rx) = mpsc::channel(8);
        let connection = ClientConnection::new(ConnectionId::from("c1"), tx);

        send_screen_info(&ctx, &connection).await;
        assert!(rx.try_recv().is_err());
    }
}
