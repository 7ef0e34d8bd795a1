use axum::{extract::Extension, http::HeaderMap, response::IntoResponse};
use std::sync::Arc;
use tracing::instrument;

use super::types::{ErrorResponse, ValidateResponse};
use crate::relay::{
    cookies::{extract_cookie, ACCESS_TOKEN_COOKIE},
    Relay, RelayError,
};

#[utoipa::path(
    get,
    path = "/auth/validate",
    responses(
        (status = 200, description = "Upstream verdict for the access_token cookie", body = ValidateResponse),
        (status = 401, description = "No access_token cookie, or upstream rejected it", body = ValidateResponse),
        (status = 500, description = "Upstream unreachable", body = ErrorResponse)
    ),
    tag = "auth"
)]
// Without a cookie there is nothing to ask upstream about.
#[instrument(skip_all)]
pub async fn validate(
    headers: HeaderMap,
    relay: Extension<Arc<Relay>>,
) -> Result<impl IntoResponse, RelayError> {
    let access_token =
        extract_cookie(&headers, ACCESS_TOKEN_COOKIE).ok_or(RelayError::MissingCredentialCookie)?;

    relay.validate(&access_token).await
}
