//! `VantageServer` — axum HTTP + WebSocket gateway assembly.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::Router;
use axum::extract::ws::WebSocketUpgrade;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use axum::routing::get;
use metrics_exporter_prometheus::PrometheusHandle;
use tokio::task::JoinHandle;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use vantage_capture::DesktopProvider;
use vantage_core::identity::IdentityResolver;
use vantage_hub::{Broadcaster, ConnectionRegistry, GroupDirectory};
use vantage_rpc::context::RpcContext;
use vantage_rpc::registry::MethodRegistry;

use crate::config::ServerConfig;
use crate::health::{self, HealthResponse};
use crate::shutdown::ShutdownCoordinator;
use crate::websocket::session::run_ws_session;

/// Shared state accessible from axum handlers.
#[derive(Clone)]
pub struct AppState {
    /// RPC method registry.
    pub registry: Arc<MethodRegistry>,
    /// Handler dependencies (registry, groups, broadcaster, provider).
    pub ctx: Arc<RpcContext>,
    /// External identity provider seam.
    pub resolver: Arc<dyn IdentityResolver>,
    /// Shutdown coordinator.
    pub shutdown: Arc<ShutdownCoordinator>,
    /// Gateway settings.
    pub config: ServerConfig,
    /// Prometheus render handle (`None` = `/metrics` disabled).
    pub metrics_handle: Option<PrometheusHandle>,
    /// When the server started.
    pub start_time: Instant,
}

/// The main Vantage gateway.
pub struct VantageServer {
    state: AppState,
}

impl VantageServer {
    /// Assemble a server from its injected collaborators.
    pub fn new(
        config: ServerConfig,
        registry: MethodRegistry,
        provider: Arc<dyn DesktopProvider>,
        resolver: Arc<dyn IdentityResolver>,
        metrics_handle: Option<PrometheusHandle>,
    ) -> Self {
        let groups = Arc::new(GroupDirectory::new());
        let connections = Arc::new(ConnectionRegistry::new(groups.clone()));
        let broadcaster = Arc::new(Broadcaster::new(connections.clone(), groups.clone()));
        let ctx = Arc::new(RpcContext {
            connections,
            groups,
            broadcaster,
            provider,
            provider_deadline: Duration::from_secs(config.provider_deadline_secs),
            server_start_time: Instant::now(),
        });
        Self {
            state: AppState {
                registry: Arc::new(registry),
                ctx,
                resolver,
                shutdown: Arc::new(ShutdownCoordinator::new()),
                config,
                metrics_handle,
                start_time: Instant::now(),
            },
        }
    }

    /// Build the axum router with all routes.
    pub fn router(&self) -> Router {
        Router::new()
            .route("/health", get(health_handler))
            .route("/metrics", get(metrics_handler))
            .route("/ws", get(ws_handler))
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive())
            .with_state(self.state.clone())
    }

    /// Handler dependencies (also the root of all hub state).
    pub fn context(&self) -> &Arc<RpcContext> {
        &self.state.ctx
    }

    /// Get the shutdown coordinator.
    pub fn shutdown_coordinator(&self) -> &Arc<ShutdownCoordinator> {
        &self.state.shutdown
    }

    /// Get the server configuration.
    pub fn config(&self) -> &ServerConfig {
        &self.state.config
    }

    /// Bind and start serving. Returns the bound address and the serve
    /// task handle; the task runs until the shutdown token fires.
    pub async fn listen(&self) -> anyhow::Result<(SocketAddr, JoinHandle<()>)> {
        let listener =
            tokio::net::TcpListener::bind((self.state.config.host.as_str(), self.state.config.port))
                .await?;
        let addr = listener.local_addr()?;
        let app = self.router();
        let token = self.state.shutdown.token();

        let handle = tokio::spawn(async move {
            let serve = axum::serve(listener, app).with_graceful_shutdown(async move {
                token.cancelled().await;
            });
            if let Err(err) = serve.await {
                tracing::error!(error = %err, "server error");
            }
        });

        info!(%addr, "server listening");
        Ok((addr, handle))
    }
}

/// GET /health
async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    let connections = state.ctx.connections.connection_count();
    let sessions = state.ctx.connections.list_active().len();
    Json(health::health_check(state.start_time, connections, sessions))
}

/// GET /metrics
async fn metrics_handler(State(state): State<AppState>) -> Response {
    match state.metrics_handle {
        Some(handle) => handle.render().into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

/// GET /ws — WebSocket upgrade.
///
/// Identity is resolved from the `token` query parameter before the
/// upgrade completes; an absent or invalid token yields an anonymous
/// session. The connection cap is enforced here with a 503.
async fn ws_handler(
    ws: WebSocketUpgrade,
    Query(params): Query<HashMap<String, String>>,
    State(state): State<AppState>,
) -> Response {
    if state.ctx.connections.connection_count() >= state.config.max_connections {
        warn!(
            max = state.config.max_connections,
            "connection limit reached, rejecting upgrade"
        );
        return StatusCode::SERVICE_UNAVAILABLE.into_response();
    }

    let identity = match params.get("token") {
        Some(token) => state.resolver.resolve(token).await,
        None => None,
    };

    let registry = state.registry.clone();
    let ctx = state.ctx.clone();
    let heartbeat_interval = Duration::from_secs(state.config.heartbeat_interval_secs);
    let pong_timeout = Duration::from_secs(state.config.heartbeat_timeout_secs);

    ws.max_message_size(state.config.max_message_size)
        .on_upgrade(move |socket| {
            run_ws_session(socket, identity, registry, ctx, heartbeat_interval, pong_timeout)
        })
}
