//! Session cookies carrying the upstream bearer tokens.

use axum::http::{
    header::{InvalidHeaderValue, COOKIE},
    HeaderMap, HeaderValue,
};
use secrecy::{ExposeSecret, SecretString};
use tracing::{error, warn};

use super::{RelayConfig, TokenPair};

pub const ACCESS_TOKEN_COOKIE: &str = "access_token";
pub const REFRESH_TOKEN_COOKIE: &str = "refresh_token";

/// Build an `HttpOnly` cookie for one token.
///
/// # Errors
/// Returns an error if the value cannot be carried in a header.
pub fn session_cookie(
    config: &RelayConfig,
    name: &str,
    value: &str,
    max_age_seconds: i64,
) -> Result<HeaderValue, InvalidHeaderValue> {
    let mut cookie =
        format!("{name}={value}; Path=/; HttpOnly; SameSite=Lax; Max-Age={max_age_seconds}");
    if config.cookie_secure() {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie)
}

/// Build an expired cookie that makes the browser drop `name`.
///
/// # Errors
/// Returns an error if `name` cannot be carried in a header.
pub fn clear_cookie(config: &RelayConfig, name: &str) -> Result<HeaderValue, InvalidHeaderValue> {
    session_cookie(config, name, "", 0)
}

/// Cookies for every token present in `tokens`, access token first.
///
/// A token that is not a valid cookie value is dropped so it cannot smuggle
/// extra attributes into `Set-Cookie`.
#[must_use]
pub fn session_cookies(config: &RelayConfig, tokens: &TokenPair) -> Vec<HeaderValue> {
    if tokens.is_partial() {
        warn!(
            access_token = tokens.access_token.is_some(),
            refresh_token = tokens.refresh_token.is_some(),
            "Upstream returned a partial token pair"
        );
    }

    [
        (
            ACCESS_TOKEN_COOKIE,
            tokens.access_token.as_ref(),
            config.access_token_ttl_seconds(),
        ),
        (
            REFRESH_TOKEN_COOKIE,
            tokens.refresh_token.as_ref(),
            config.refresh_token_ttl_seconds(),
        ),
    ]
    .into_iter()
    .filter_map(|(name, token, ttl)| {
        let value = token?.expose_secret();
        if !valid_cookie_value(value) {
            warn!("Upstream {name} is not a valid cookie value, skipping");
            return None;
        }
        session_cookie(config, name, value, ttl)
            .map_err(|err| error!("Failed to build {name} cookie: {err}"))
            .ok()
    })
    .collect()
}

/// Cookies that clear both tokens.
#[must_use]
pub fn clear_session_cookies(config: &RelayConfig) -> Vec<HeaderValue> {
    [ACCESS_TOKEN_COOKIE, REFRESH_TOKEN_COOKIE]
        .into_iter()
        .filter_map(|name| clear_cookie(config, name).ok())
        .collect()
}

/// Read cookie `name` from the request; empty values count as missing.
#[must_use]
pub fn extract_cookie(headers: &HeaderMap, name: &str) -> Option<SecretString> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|header| header.to_str().ok())
        .flat_map(|value| value.split(';'))
        .find_map(|pair| {
            let (key, val) = pair.trim().split_once('=')?;
            let val = val.trim().trim_matches('"');
            (key.trim() == name && !val.is_empty()).then(|| SecretString::from(val.to_string()))
        })
}

// RFC 6265 cookie-octet.
fn valid_cookie_value(value: &str) -> bool {
    !value.is_empty()
        && value.bytes().all(|b| {
            matches!(b, 0x21 | 0x23..=0x2B | 0x2D..=0x3A | 0x3C..=0x5B | 0x5D..=0x7E)
        })
}
