use anyhow::Result;
use pulse_relay::{
    api,
    relay::{Relay, RelayConfig},
};
use reqwest::{header::SET_COOKIE, StatusCode};
use serde_json::{json, Value};
use std::{net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn can_bind_localhost() -> bool {
    std::net::TcpListener::bind("127.0.0.1:0").is_ok()
}

async fn spawn_relay(upstream: &str) -> Result<SocketAddr> {
    let config = RelayConfig::new(upstream, "http://localhost:3000")?;
    let app = api::app(Arc::new(Relay::new(config)?))?;

    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        if let Err(err) = axum::serve(listener, app.into_make_service()).await {
            eprintln!("relay server stopped: {err}");
        }
    });

    Ok(addr)
}

#[tokio::test]
async fn login_then_validate_with_issued_cookie() -> Result<()> {
    if !can_bind_localhost() {
        eprintln!("Skipping test: cannot bind localhost");
        return Ok(());
    }
    let upstream = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "AT",
            "refresh_token": "RT"
        })))
        .expect(1)
        .mount(&upstream)
        .await;

    Mock::given(method("GET"))
        .and(path("/auth/validate"))
        .and(header("authorization", "Bearer AT"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "active": true,
            "payload": { "sub": "u-1" }
        })))
        .expect(1)
        .mount(&upstream)
        .await;

    let addr = spawn_relay(&upstream.uri()).await?;
    let client = reqwest::Client::new();

    let login = client
        .post(format!("http://{addr}/auth/login"))
        .json(&json!({ "email": "a@b.com", "password": "x" }))
        .send()
        .await?;
    assert_eq!(login.status(), StatusCode::OK);

    let cookies: Vec<String> = login
        .headers()
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .filter_map(|value| value.split(';').next().map(ToString::to_string))
        .collect();
    assert_eq!(cookies, vec!["access_token=AT", "refresh_token=RT"]);

    let validate = client
        .get(format!("http://{addr}/auth/validate"))
        .header("cookie", cookies.join("; "))
        .send()
        .await?;
    assert_eq!(validate.status(), StatusCode::OK);
    let body: Value = validate.json().await?;
    assert_eq!(body, json!({ "active": true, "payload": { "sub": "u-1" } }));
    Ok(())
}

#[tokio::test]
async fn validate_without_session_stays_local() -> Result<()> {
    if !can_bind_localhost() {
        eprintln!("Skipping test: cannot bind localhost");
        return Ok(());
    }
    let upstream = MockServer::start().await;
    let addr = spawn_relay(&upstream.uri()).await?;

    let response = reqwest::get(format!("http://{addr}/auth/validate")).await?;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body: Value = response.json().await?;
    assert_eq!(body, json!({ "active": false }));

    let received = upstream.received_requests().await.unwrap_or_default();
    assert!(received.is_empty());
    Ok(())
}

#[tokio::test]
async fn logout_always_clears_cookies() -> Result<()> {
    if !can_bind_localhost() {
        eprintln!("Skipping test: cannot bind localhost");
        return Ok(());
    }
    let upstream = MockServer::start().await;
    let addr = spawn_relay(&upstream.uri()).await?;

    let response = reqwest::Client::new()
        .post(format!("http://{addr}/auth/logout"))
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let cleared = response
        .headers()
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .filter(|value| value.contains("Max-Age=0"))
        .count();
    assert_eq!(cleared, 2);
    Ok(())
}
