//! # vantage-server
//!
//! Axum HTTP + `WebSocket` gateway for the Vantage remote-session core.
//!
//! - HTTP endpoints: health check, Prometheus metrics
//! - `WebSocket` gateway: identity resolution at upgrade, connection
//!   registration, in-order message dispatch, heartbeat, presence fan-out
//! - Graceful shutdown via `tokio::signal` + `CancellationToken`

#![deny(unsafe_code)]

pub mod config;
pub mod health;
pub mod resolver;
pub mod server;
pub mod shutdown;
pub mod telemetry;
pub mod websocket;

pub use config::{AuthConfig, Config, ServerConfig, TokenEntry};
pub use resolver::StaticResolver;
pub use server::{AppState, VantageServer};
pub use shutdown::ShutdownCoordinator;
