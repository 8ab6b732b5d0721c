//! # vantage-capture
//!
//! The boundary between the session protocol engine and the machine it
//! drives. Actual pixel capture and OS input injection live outside this
//! repository; hosts inject a [`DesktopProvider`] implementation and the
//! rest of the system treats it as an opaque, fallible capability.
//!
//! - **[`DesktopProvider`]**: async trait covering screen queries, capture,
//!   and input injection
//! - **[`ProviderError`]**: the only error type that crosses the boundary
//! - **[`with_deadline`]**: converts a hung provider call into a timeout
//!   error instead of tying up a worker indefinitely
//! - **[`UnsupportedProvider`]**: stand-in for deployments without an
//!   injected capability

#![deny(unsafe_code)]

pub mod deadline;
pub mod errors;
pub mod provider;

pub use deadline::with_deadline;
pub use errors::ProviderError;
pub use provider::{DesktopProvider, UnsupportedProvider};
