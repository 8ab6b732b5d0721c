//! # vantage-core
//!
//! Foundation types for the Vantage remote-session core.
//!
//! This crate provides the shared vocabulary that all other Vantage crates
//! depend on:
//!
//! - **Branded IDs**: `ConnectionId` as a newtype for type safety
//! - **Identity**: `Identity`, `Role`, and the explicit `CallerContext`
//!   passed into every handler
//! - **Server events**: `ServerEvent` tagged union covering every
//!   server→client push message
//! - **Input vocabulary**: `InputCommand`, `MouseButton`, `Modifiers`,
//!   and screen geometry types

#![deny(unsafe_code)]

pub mod events;
pub mod identity;
pub mod ids;
pub mod input;

pub use events::ServerEvent;
pub use identity::{CallerContext, Identity, IdentityResolver, Role};
pub use ids::ConnectionId;
pub use input::{InputCommand, Modifiers, MonitorInfo, MouseButton, Region, ScreenSize};
