//! # Pulse Relay (Browser Session Relay)
//!
//! `pulse-relay` sits between the Pulse web client and the upstream identity
//! API. The browser never holds bearer tokens in script-visible storage: the
//! relay forwards login, registration and refresh calls upstream and turns the
//! returned token pair into `HttpOnly` cookies.
//!
//! ## Routes
//!
//! - `POST /auth/login`, `POST /auth/register`: forward `{email, password}`;
//!   on `200` set `access_token` (1h) and `refresh_token` (7d) cookies and
//!   return the upstream body unchanged. Any other status is relayed as-is.
//! - `GET /auth/validate`: forward the `access_token` cookie as a bearer
//!   credential. Without the cookie the relay answers `401 {"active": false}`
//!   and upstream is never contacted.
//! - `POST /auth/refresh`: rotate both cookies using the `refresh_token` cookie.
//! - `POST /auth/logout`: best-effort upstream logout, then clear both cookies.
//!
//! ## State
//!
//! None. Tokens pass through a single request and are dropped; there is no
//! session store and no retry. Upstream calls are bounded by an explicit
//! timeout and transport failures surface as a bare `500`.
//!
//! ## Cross-origin
//!
//! One configured origin is echoed on every response, credentialed requests
//! are allowed, and `OPTIONS` preflights are answered locally.

pub mod api;
pub mod cli;
pub mod relay;

#[cfg(test)]
mod test_log;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);
