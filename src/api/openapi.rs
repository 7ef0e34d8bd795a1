#![allow(clippy::needless_for_each)]

use utoipa::OpenApi;

use super::handlers::{health, logout, session, types, validate};

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health,
        session::login,
        session::register,
        session::refresh,
        validate::validate,
        logout::logout,
    ),
    components(schemas(
        health::Health,
        types::CredentialsRequest,
        types::TokenResponse,
        types::ValidateResponse,
        types::ErrorResponse,
    )),
    tags(
        (name = "auth", description = "Session relay to the upstream identity API"),
        (name = "health", description = "Liveness and build metadata"),
    )
)]
struct ApiDoc;

/// `OpenAPI` document for every route the relay serves.
#[must_use]
pub fn openapi() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}
