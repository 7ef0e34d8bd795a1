use axum::{
    extract::Extension,
    http::{header::SET_COOKIE, HeaderMap, StatusCode},
    response::IntoResponse,
};
use std::sync::Arc;
use tracing::{instrument, warn};

use crate::relay::{
    cookies::{clear_session_cookies, extract_cookie, ACCESS_TOKEN_COOKIE},
    Relay,
};

#[utoipa::path(
    post,
    path = "/auth/logout",
    responses(
        (status = 204, description = "Session cookies cleared")
    ),
    tag = "auth"
)]
#[instrument(skip_all)]
pub async fn logout(headers: HeaderMap, relay: Extension<Arc<Relay>>) -> impl IntoResponse {
    if let Some(access_token) = extract_cookie(&headers, ACCESS_TOKEN_COOKIE) {
        match relay.logout(&access_token).await {
            Ok(upstream) if !upstream.status.is_success() => {
                warn!("Upstream logout returned {}", upstream.status);
            }
            Ok(_) => {}
            Err(err) => warn!("Upstream logout failed: {err}"),
        }
    }

    // Always clear the cookies, even if upstream never saw the request.
    let mut response_headers = HeaderMap::new();
    for cookie in clear_session_cookies(relay.config()) {
        response_headers.append(SET_COOKIE, cookie);
    }
    (StatusCode::NO_CONTENT, response_headers)
}
