//! WebSocket gateway: message dispatch and per-connection lifecycle.

pub mod handler;
pub mod session;
