//! Endpoints that mint a session: login, registration, and token refresh.

use axum::{
    extract::{rejection::JsonRejection, Extension},
    http::HeaderMap,
    response::{IntoResponse, Json, Response},
};
use std::sync::Arc;
use tracing::{info, instrument};

use super::{
    bad_request, session_response,
    types::{CredentialsRequest, ErrorResponse, TokenResponse, ValidateResponse},
};
use crate::relay::{
    cookies::{extract_cookie, REFRESH_TOKEN_COOKIE},
    Credentials, Relay, RelayError,
};

#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = CredentialsRequest,
    responses(
        (status = 200, description = "Login accepted; access_token and refresh_token cookies set", body = TokenResponse),
        (status = 400, description = "Missing or malformed credentials", body = ErrorResponse),
        (status = 500, description = "Upstream unreachable", body = ErrorResponse)
    ),
    tag = "auth"
)]
#[instrument(skip_all)]
pub async fn login(
    relay: Extension<Arc<Relay>>,
    payload: Result<Json<CredentialsRequest>, JsonRejection>,
) -> Response {
    let credentials: Credentials = match payload {
        Ok(Json(request)) => request.into(),
        Err(rejection) => return bad_request(&rejection),
    };

    match relay.login(&credentials).await {
        Ok(session) => {
            info!("Login accepted upstream");
            session_response(relay.config(), session)
        }
        Err(err) => err.into_response(),
    }
}

#[utoipa::path(
    post,
    path = "/auth/register",
    request_body = CredentialsRequest,
    responses(
        (status = 200, description = "Registration accepted; session cookies set", body = TokenResponse),
        (status = 400, description = "Missing or malformed credentials", body = ErrorResponse),
        (status = 500, description = "Upstream unreachable", body = ErrorResponse)
    ),
    tag = "auth"
)]
#[instrument(skip_all)]
pub async fn register(
    relay: Extension<Arc<Relay>>,
    payload: Result<Json<CredentialsRequest>, JsonRejection>,
) -> Response {
    let credentials: Credentials = match payload {
        Ok(Json(request)) => request.into(),
        Err(rejection) => return bad_request(&rejection),
    };

    match relay.register(&credentials).await {
        Ok(session) => {
            info!("Registration accepted upstream");
            session_response(relay.config(), session)
        }
        Err(err) => err.into_response(),
    }
}

#[utoipa::path(
    post,
    path = "/auth/refresh",
    responses(
        (status = 200, description = "Tokens rotated; session cookies replaced", body = TokenResponse),
        (status = 401, description = "No refresh_token cookie", body = ValidateResponse),
        (status = 500, description = "Upstream unreachable", body = ErrorResponse)
    ),
    tag = "auth"
)]
#[instrument(skip_all)]
pub async fn refresh(headers: HeaderMap, relay: Extension<Arc<Relay>>) -> Response {
    let Some(refresh_token) = extract_cookie(&headers, REFRESH_TOKEN_COOKIE) else {
        return RelayError::MissingCredentialCookie.into_response();
    };

    match relay.refresh(&refresh_token).await {
        Ok(session) => session_response(relay.config(), session),
        Err(err) => err.into_response(),
    }
}
