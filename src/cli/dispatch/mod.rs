//! Map validated CLI arguments to an action.

use crate::cli::actions::{server::Args, Action};
use crate::cli::commands::{session, upstream, ARG_PORT};
use anyhow::Result;

/// # Errors
/// Returns an error if required arguments are missing or inconsistent.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    let port = matches.get_one::<u16>(ARG_PORT).copied().unwrap_or(3001);

    let upstream_opts = upstream::Options::parse(matches)?;
    let session_opts = session::Options::parse(matches);

    Ok(Action::Server(Args {
        port,
        upstream_url: upstream_opts.url,
        allowed_origin: upstream_opts.allowed_origin,
        upstream_timeout_seconds: upstream_opts.timeout_seconds,
        access_token_ttl_seconds: session_opts.access_token_ttl_seconds,
        refresh_token_ttl_seconds: session_opts.refresh_token_ttl_seconds,
        cookie_secure: session_opts.cookie_secure,
    }))
}
