use axum::{
    body::{Body, Bytes},
    http::{header::CONTENT_TYPE, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use secrecy::{ExposeSecret, SecretString};
use serde_json::{json, Value};

/// Email/password pair, alive for a single forwarded request.
#[derive(Debug)]
pub struct Credentials {
    pub email: String,
    pub password: SecretString,
}

impl Credentials {
    #[must_use]
    pub fn new(email: String, password: SecretString) -> Self {
        Self { email, password }
    }

    pub(crate) fn to_json(&self) -> Value {
        json!({
            "email": self.email,
            "password": self.password.expose_secret(),
        })
    }
}

/// Opaque bearer tokens taken from a successful upstream body.
///
/// Either half may be missing; the relay never looks inside them.
#[derive(Debug, Default)]
pub struct TokenPair {
    pub access_token: Option<SecretString>,
    pub refresh_token: Option<SecretString>,
}

impl TokenPair {
    /// Pull `access_token` / `refresh_token` out of a JSON body.
    ///
    /// Bodies that are not JSON objects, and token fields that are not
    /// non-empty strings, yield no token.
    #[must_use]
    pub fn from_body(body: &[u8]) -> Self {
        let Ok(Value::Object(map)) = serde_json::from_slice::<Value>(body) else {
            return Self::default();
        };

        let token = |key: &str| {
            map.get(key)
                .and_then(Value::as_str)
                .filter(|value| !value.is_empty())
                .map(|value| SecretString::from(value.to_string()))
        };

        Self {
            access_token: token("access_token"),
            refresh_token: token("refresh_token"),
        }
    }

    #[must_use]
    pub fn is_partial(&self) -> bool {
        self.access_token.is_some() != self.refresh_token.is_some()
    }
}

/// Raw upstream reply: relayed to the browser byte for byte.
#[derive(Debug, Clone)]
pub struct UpstreamResponse {
    pub status: StatusCode,
    pub content_type: Option<HeaderValue>,
    pub body: Bytes,
}

impl UpstreamResponse {
    #[must_use]
    pub fn new(status: StatusCode, content_type: Option<HeaderValue>, body: Bytes) -> Self {
        Self {
            status,
            content_type,
            body,
        }
    }
}

impl IntoResponse for UpstreamResponse {
    fn into_response(self) -> Response {
        let body_is_empty = self.body.is_empty();
        let mut response = Response::new(Body::from(self.body));
        *response.status_mut() = self.status;
        match self.content_type {
            Some(content_type) => {
                response.headers_mut().insert(CONTENT_TYPE, content_type);
            }
            None if !body_is_empty => {
                response
                    .headers_mut()
                    .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
            }
            None => {}
        }
        response
    }
}

/// Result of a successful login, registration, or refresh.
#[derive(Debug)]
pub struct Session {
    pub response: UpstreamResponse,
    pub tokens: TokenPair,
}
