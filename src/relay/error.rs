use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde_json::json;
use thiserror::Error;

use super::UpstreamResponse;

#[derive(Debug, Error)]
pub enum RelayError {
    /// Upstream answered with a non-success status; the reply is relayed as-is.
    #[error("upstream rejected the request with status {}", .0.status)]
    UpstreamRejected(UpstreamResponse),
    #[error("missing credential cookie")]
    MissingCredentialCookie,
    #[error("upstream transport failure: {0}")]
    TransportFailure(#[from] reqwest::Error),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        match self {
            Self::UpstreamRejected(upstream) => upstream.into_response(),
            Self::MissingCredentialCookie => {
                (StatusCode::UNAUTHORIZED, Json(json!({ "active": false }))).into_response()
            }
            // Transport details stay in the logs.
            Self::TransportFailure(_) | Self::InvalidConfig(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Internal server error" })),
            )
                .into_response(),
        }
    }
}
