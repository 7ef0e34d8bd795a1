//! Upstream forwarding and the session-cookie translation around it.

mod client;
mod config;
pub mod cookies;
mod error;
mod model;

pub use client::Relay;
pub use config::{RelayConfig, DEFAULT_ALLOWED_ORIGIN, DEFAULT_UPSTREAM_URL};
pub use error::RelayError;
pub use model::{Credentials, Session, TokenPair, UpstreamResponse};
