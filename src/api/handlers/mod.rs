pub mod health;
pub use self::health::health;

pub mod logout;
pub use self::logout::logout;

pub mod session;
pub use self::session::{login, refresh, register};

pub mod validate;
pub use self::validate::validate;

pub mod types;


// common functions for the handlers
use crate::relay::{cookies::session_cookies, RelayConfig, Session};
use axum::{
    extract::rejection::JsonRejection,
    http::{header::SET_COOKIE, StatusCode},
    response::{IntoResponse, Json, Response},
};
use tracing::debug;

use self::types::ErrorResponse;

/// Relay the upstream body and attach a cookie for each token it carried.
pub(crate) fn session_response(config: &RelayConfig, session: Session) -> Response {
    let cookies = session_cookies(config, &session.tokens);
    let mut response = session.response.into_response();
    for cookie in cookies {
        response.headers_mut().append(SET_COOKIE, cookie);
    }
    response
}

pub(crate) fn bad_request(rejection: &JsonRejection) -> Response {
    debug!("Rejected credentials payload with status {}", rejection.status());
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse {
            error: "Missing or invalid credentials payload".to_string(),
        }),
    )
        .into_response()
}
