//! Relay configuration, built once at startup and shared read-only.

use std::time::Duration;
use url::Url;

use super::RelayError;

pub const DEFAULT_UPSTREAM_URL: &str = "https://api.pulse.kwako.nl";
pub const DEFAULT_ALLOWED_ORIGIN: &str = "http://localhost:3000";

const DEFAULT_UPSTREAM_TIMEOUT_SECONDS: u64 = 10;
const DEFAULT_ACCESS_TOKEN_TTL_SECONDS: i64 = 60 * 60;
const DEFAULT_REFRESH_TOKEN_TTL_SECONDS: i64 = 7 * 24 * 60 * 60;

#[derive(Clone, Debug)]
pub struct RelayConfig {
    upstream_url: String,
    allowed_origin: String,
    upstream_timeout: Duration,
    access_token_ttl_seconds: i64,
    refresh_token_ttl_seconds: i64,
    cookie_secure: bool,
}

impl RelayConfig {
    /// Build a config for the given upstream API and browser origin.
    ///
    /// # Errors
    /// Returns an error if the upstream URL is not an absolute `http(s)` URL,
    /// or if the origin cannot be reduced to `scheme://host[:port]`.
    pub fn new(upstream_url: &str, allowed_origin: &str) -> Result<Self, RelayError> {
        Ok(Self {
            upstream_url: normalize_upstream(upstream_url)?,
            allowed_origin: normalize_origin(allowed_origin)?,
            upstream_timeout: Duration::from_secs(DEFAULT_UPSTREAM_TIMEOUT_SECONDS),
            access_token_ttl_seconds: DEFAULT_ACCESS_TOKEN_TTL_SECONDS,
            refresh_token_ttl_seconds: DEFAULT_REFRESH_TOKEN_TTL_SECONDS,
            cookie_secure: false,
        })
    }

    #[must_use]
    pub fn with_upstream_timeout(mut self, timeout: Duration) -> Self {
        self.upstream_timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_access_token_ttl_seconds(mut self, seconds: i64) -> Self {
        self.access_token_ttl_seconds = seconds;
        self
    }

    #[must_use]
    pub fn with_refresh_token_ttl_seconds(mut self, seconds: i64) -> Self {
        self.refresh_token_ttl_seconds = seconds;
        self
    }

    #[must_use]
    pub fn with_cookie_secure(mut self, secure: bool) -> Self {
        self.cookie_secure = secure;
        self
    }

    /// Upstream base URL without a trailing slash.
    #[must_use]
    pub fn upstream_url(&self) -> &str {
        &self.upstream_url
    }

    #[must_use]
    pub fn allowed_origin(&self) -> &str {
        &self.allowed_origin
    }

    #[must_use]
    pub fn upstream_timeout(&self) -> Duration {
        self.upstream_timeout
    }

    #[must_use]
    pub fn access_token_ttl_seconds(&self) -> i64 {
        self.access_token_ttl_seconds
    }

    #[must_use]
    pub fn refresh_token_ttl_seconds(&self) -> i64 {
        self.refresh_token_ttl_seconds
    }

    #[must_use]
    pub fn cookie_secure(&self) -> bool {
        self.cookie_secure
    }

    /// Join an upstream path (`/auth/login`) onto the base URL, keeping any base path.
    pub(crate) fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.upstream_url)
    }
}

fn normalize_upstream(upstream_url: &str) -> Result<String, RelayError> {
    let invalid = |reason: &str| RelayError::InvalidConfig(format!("upstream URL {reason}: {upstream_url}"));

    let parsed = Url::parse(upstream_url).map_err(|_| invalid("is not a valid URL"))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(invalid("must use http or https"));
    }
    if parsed.host_str().is_none() {
        return Err(invalid("must include a host"));
    }
    if parsed.query().is_some() || parsed.fragment().is_some() {
        return Err(invalid("must not carry a query or fragment"));
    }

    Ok(parsed.as_str().trim_end_matches('/').to_string())
}

fn normalize_origin(allowed_origin: &str) -> Result<String, RelayError> {
    let parsed = Url::parse(allowed_origin).map_err(|_| {
        RelayError::InvalidConfig(format!("allowed origin is not a valid URL: {allowed_origin}"))
    })?;
    let host = parsed.host_str().ok_or_else(|| {
        RelayError::InvalidConfig(format!("allowed origin must include a host: {allowed_origin}"))
    })?;
    let port = parsed
        .port()
        .map_or_else(String::new, |port| format!(":{port}"));

    Ok(format!("{}://{}{}", parsed.scheme(), host, port))
}
