//! shiftboard: client for a single-endpoint time-clock and team dashboard backend.
//!
//! SYSTEM CONTEXT
//! ==============
//! `client` owns the request/response exchange with the gateway endpoint,
//! `identity` decides which email is attached to each call, `feedback`
//! carries the in-flight indicator and error notifier collaborators,
//! `actions` gives the named actions typed payloads, and `bootstrap` runs the
//! startup sequence that fills the dashboard.

pub mod actions;
pub mod bootstrap;
pub mod client;
pub mod config;
pub mod envelope;
pub mod error;
pub mod feedback;
pub mod identity;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use client::{Gateway, GatewayClient};
pub use envelope::{Method, ResponseEnvelope};
pub use error::ApiError;
