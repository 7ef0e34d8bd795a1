use reqwest::{header::CONTENT_TYPE, redirect, Client, RequestBuilder, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde_json::json;
use tracing::{debug, error, instrument};

use super::{Credentials, RelayConfig, RelayError, Session, TokenPair, UpstreamResponse};

const LOGIN_PATH: &str = "/auth/login";
const REGISTER_PATH: &str = "/auth/register";
const REFRESH_PATH: &str = "/auth/refresh";
const VALIDATE_PATH: &str = "/auth/validate";
const LOGOUT_PATH: &str = "/auth/logout";

/// Stateless forwarder to the upstream identity API.
///
/// Holds nothing per session; the only shared resource is the `reqwest`
/// connection pool.
#[derive(Debug, Clone)]
pub struct Relay {
    config: RelayConfig,
    client: Client,
}

impl Relay {
    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: RelayConfig) -> Result<Self, RelayError> {
        let client = Client::builder()
            .user_agent(crate::APP_USER_AGENT)
            .timeout(config.upstream_timeout())
            .redirect(redirect::Policy::none())
            .build()?;

        Ok(Self { config, client })
    }

    #[must_use]
    pub fn config(&self) -> &RelayConfig {
        &self.config
    }

    /// Forward credentials to upstream `/auth/login`. Redirects are relayed, never followed.
    ///
    /// # Errors
    /// `UpstreamRejected` for any status other than `200`, `TransportFailure`
    /// if upstream cannot be reached.
    #[instrument(skip_all)]
    pub async fn login(&self, credentials: &Credentials) -> Result<Session, RelayError> {
        let request = self
            .client
            .post(self.config.endpoint(LOGIN_PATH))
            .json(&credentials.to_json());
        session(self.send(request).await?)
    }

    /// Forward credentials to upstream `/auth/register`.
    ///
    /// # Errors
    /// Same as [`Relay::login`].
    #[instrument(skip_all)]
    pub async fn register(&self, credentials: &Credentials) -> Result<Session, RelayError> {
        let request = self
            .client
            .post(self.config.endpoint(REGISTER_PATH))
            .json(&credentials.to_json());
        session(self.send(request).await?)
    }

    /// Exchange a refresh token for a new token pair.
    ///
    /// # Errors
    /// Same as [`Relay::login`].
    #[instrument(skip_all)]
    pub async fn refresh(&self, refresh_token: &SecretString) -> Result<Session, RelayError> {
        let request = self
            .client
            .post(self.config.endpoint(REFRESH_PATH))
            .json(&json!({ "refresh_token": refresh_token.expose_secret() }));
        session(self.send(request).await?)
    }

    /// Ask upstream whether `access_token` is active; any status is returned as-is.
    ///
    /// # Errors
    /// `TransportFailure` if upstream cannot be reached.
    #[instrument(skip_all)]
    pub async fn validate(&self, access_token: &SecretString) -> Result<UpstreamResponse, RelayError> {
        let request = self
            .client
            .get(self.config.endpoint(VALIDATE_PATH))
            .bearer_auth(access_token.expose_secret());
        self.send(request).await
    }

    /// Revoke the refresh tokens of the user owning `access_token`.
    ///
    /// # Errors
    /// `TransportFailure` if upstream cannot be reached.
    #[instrument(skip_all)]
    pub async fn logout(&self, access_token: &SecretString) -> Result<UpstreamResponse, RelayError> {
        let request = self
            .client
            .get(self.config.endpoint(LOGOUT_PATH))
            .bearer_auth(access_token.expose_secret());
        self.send(request).await
    }

    async fn send(&self, request: RequestBuilder) -> Result<UpstreamResponse, RelayError> {
        let response = request.send().await.map_err(|err| {
            error!("Error contacting upstream: {err}");
            RelayError::TransportFailure(err)
        })?;

        let status = response.status();
        let content_type = response.headers().get(CONTENT_TYPE).cloned();
        let body = response.bytes().await.map_err(|err| {
            error!("Error reading upstream response: {err}");
            RelayError::TransportFailure(err)
        })?;

        debug!(status = status.as_u16(), bytes = body.len(), "upstream response");

        Ok(UpstreamResponse::new(status, content_type, body))
    }
}

fn session(response: UpstreamResponse) -> Result<Session, RelayError> {
    if response.status != StatusCode::OK {
        debug!("Upstream rejected request: {}", response.status);
        return Err(RelayError::UpstreamRejected(response));
    }

    let tokens = TokenPair::from_body(&response.body);
    Ok(Session { response, tokens })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use anyhow::{bail, Result};
    use std::{net::TcpListener, time::Duration};
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn can_bind_localhost() -> bool {
        TcpListener::bind("127.0.0.1:0").is_ok()
    }

    fn relay(server: &MockServer) -> Result<Relay> {
        let config = RelayConfig::new(&server.uri(), "http://localhost:3000")?;
        Ok(Relay::new(config)?)
    }

    fn credentials() -> Credentials {
        Credentials::new("a@b.com".to_string(), SecretString::from("x".to_string()))
    }

    #[tokio::test]
    async fn login_forwards_credentials_and_parses_tokens() -> Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/auth/login"))
            .and(header("content-type", "application/json"))
            .and(body_json(json!({ "email": "a@b.com", "password": "x" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": "AT",
                "refresh_token": "RT"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let session = relay(&server)?.login(&credentials()).await?;
        assert_eq!(session.response.status, StatusCode::OK);
        assert_eq!(
            session.tokens.access_token.as_ref().map(|t| t.expose_secret()),
            Some("AT")
        );
        assert_eq!(
            session.tokens.refresh_token.as_ref().map(|t| t.expose_secret()),
            Some("RT")
        );
        Ok(())
    }

    #[tokio::test]
    async fn login_rejection_keeps_status_and_body() -> Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/auth/login"))
            .respond_with(
                ResponseTemplate::new(401).set_body_json(json!({ "detail": "Invalid credentials" })),
            )
            .mount(&server)
            .await;

        match relay(&server)?.login(&credentials()).await {
            Err(RelayError::UpstreamRejected(response)) => {
                assert_eq!(response.status, StatusCode::UNAUTHORIZED);
                let body: serde_json::Value = serde_json::from_slice(&response.body)?;
                assert_eq!(body, json!({ "detail": "Invalid credentials" }));
            }
            other => bail!("expected UpstreamRejected, got {other:?}"),
        }
        Ok(())
    }

    #[tokio::test]
    async fn non_200_success_is_still_a_rejection() -> Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/auth/register"))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "access_token": "AT",
                "refresh_token": "RT"
            })))
            .mount(&server)
            .await;

        let result = relay(&server)?.register(&credentials()).await;
        assert!(matches!(result, Err(RelayError::UpstreamRejected(ref r)) if r.status == StatusCode::CREATED));
        Ok(())
    }

    #[tokio::test]
    async fn refresh_posts_refresh_token() -> Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/auth/refresh"))
            .and(body_json(json!({ "refresh_token": "RT" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": "AT2",
                "refresh_token": "RT2"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let session = relay(&server)?
            .refresh(&SecretString::from("RT".to_string()))
            .await?;
        assert_eq!(
            session.tokens.access_token.as_ref().map(|t| t.expose_secret()),
            Some("AT2")
        );
        Ok(())
    }

    #[tokio::test]
    async fn validate_sends_bearer_and_returns_any_status() -> Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/auth/validate"))
            .and(header("authorization", "Bearer T1"))
            .respond_with(ResponseTemplate::new(401).set_body_string("expired"))
            .expect(1)
            .mount(&server)
            .await;

        let response = relay(&server)?
            .validate(&SecretString::from("T1".to_string()))
            .await?;
        assert_eq!(response.status, StatusCode::UNAUTHORIZED);
        assert_eq!(&response.body[..], b"expired");
        Ok(())
    }

    #[tokio::test]
    async fn logout_sends_bearer() -> Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/auth/logout"))
            .and(header("authorization", "Bearer T1"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let response = relay(&server)?
            .logout(&SecretString::from("T1".to_string()))
            .await?;
        assert_eq!(response.status, StatusCode::NO_CONTENT);
        Ok(())
    }

    #[tokio::test]
    async fn slow_upstream_is_a_transport_failure() -> Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/auth/validate"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
            .mount(&server)
            .await;

        let config = RelayConfig::new(&server.uri(), "http://localhost:3000")?
            .with_upstream_timeout(Duration::from_millis(200));
        let result = Relay::new(config)?
            .validate(&SecretString::from("T1".to_string()))
            .await;
        assert!(matches!(result, Err(RelayError::TransportFailure(_))));
        Ok(())
    }

    #[tokio::test]
    async fn unreachable_upstream_is_a_transport_failure() -> Result<()> {
        // Reserve a port, then release it so nothing is listening.
        let port = match TcpListener::bind("127.0.0.1:0") {
            Ok(listener) => listener.local_addr()?.port(),
            Err(_) => {
                eprintln!("Skipping test: cannot bind localhost");
                return Ok(());
            }
        };

        let config = RelayConfig::new(&format!("http://127.0.0.1:{port}"), "http://localhost:3000")?;
        let result = Relay::new(config)?.login(&credentials()).await;
        assert!(matches!(result, Err(RelayError::TransportFailure(_))));
        Ok(())
    }

    #[tokio::test]
    async fn login_spans_do_not_record_credentials() -> Result<()> {
        let port = match TcpListener::bind("127.0.0.1:0") {
            Ok(listener) => listener.local_addr()?.port(),
            Err(_) => {
                eprintln!("Skipping test: cannot bind localhost");
                return Ok(());
            }
        };

        let logs = crate::test_log::CapturedLogs::default();
        let _guard = logs.install();

        let config = RelayConfig::new(&format!("http://127.0.0.1:{port}"), "http://localhost:3000")?;
        let credentials = Credentials::new(
            "alice@secret.example".to_string(),
            SecretString::from("hunter2-secret".to_string()),
        );
        let relay = Relay::new(config)?;
        assert!(relay.login(&credentials).await.is_err());
        assert!(relay.register(&credentials).await.is_err());

        let output = logs.contents();
        assert!(output.contains("Error contacting upstream"));
        assert!(!output.contains("alice@secret.example"));
        assert!(!output.contains("hunter2-secret"));
        Ok(())
    }
}

