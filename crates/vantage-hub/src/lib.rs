//! # vantage-hub
//!
//! In-memory connection state and event fan-out.
//!
//! - **[`ClientConnection`]**: a connected client's outbound channel and
//!   liveness state
//! - **[`ConnectionRegistry`]**: the single shared session table — every
//!   connect/disconnect mutation is serialized through it
//! - **[`GroupDirectory`]**: explicit `(group, connection)` membership
//!   edges for addressed fan-out
//! - **[`Broadcaster`]**: best-effort, at-most-once event delivery to a
//!   connection, a group, or all connections
//!
//! Nothing in this crate is persisted; all state dies with the process.

#![deny(unsafe_code)]

pub mod broadcast;
pub mod connection;
pub mod groups;
pub mod registry;

pub use broadcast::{Broadcaster, Target};
pub use connection::ClientConnection;
pub use groups::GroupDirectory;
pub use registry::{ConnectionRegistry, Session};
