//! HTTP client tests against an in-process upstream.
//!
//! The upstream echoes the credentials it receives so tests can assert on
//! what the client attached.

use axum::Json;
use axum::Router;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use serde::Deserialize;

use mesos_client::{BasicAuth, ClientConfig, ClientError, HttpClient, StrictAuth};
use mesos_metrics::ErrorCounter;

const PRIVATE_KEY: &str = include_str!("fixtures/test_key.pem");

#[derive(Debug, Deserialize, PartialEq)]
struct Echo {
    authorization: String,
    user_agent: String,
}

async fn echo(headers: HeaderMap) -> Json<serde_json::Value> {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string()
    };
    Json(serde_json::json!({
        "authorization": header("authorization"),
        "user_agent": header("user-agent"),
    }))
}

async fn spawn_upstream() -> String {
    let router = Router::new()
        .route("/echo", get(echo))
        .route("/missing", get(|| async { StatusCode::NOT_FOUND }))
        .route("/garbage", get(|| async { "{not json" }))
        .route(
            "/login",
            post(|| async { Json(serde_json::json!({ "token": "opaque" })) }),
        )
        .route("/login-broken", post(|| async { StatusCode::UNAUTHORIZED }));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

#[tokio::test]
async fn fetch_plain_with_user_agent() {
    let base = spawn_upstream().await;
    let mut config = ClientConfig::new(format!("{base}/"));
    config.user_agent = "exporter-test".to_string();
    let mut client = HttpClient::new(&config, ErrorCounter::new()).unwrap();

    let echo: Echo = client.fetch("/echo").await.unwrap();
    assert_eq!(echo.user_agent, "exporter-test");
    assert_eq!(echo.authorization, "");
}

#[tokio::test]
async fn fetch_attaches_basic_auth() {
    let base = spawn_upstream().await;
    let mut config = ClientConfig::new(base);
    config.basic_auth = Some(BasicAuth {
        username: "ops".to_string(),
        password: "secret".to_string(),
    });
    let mut client = HttpClient::new(&config, ErrorCounter::new()).unwrap();

    let echo: Echo = client.fetch("/echo").await.unwrap();
    // base64("ops:secret")
    assert_eq!(echo.authorization, "Basic b3BzOnNlY3JldA==");
}

#[tokio::test]
async fn fetch_skips_incomplete_basic_auth() {
    let base = spawn_upstream().await;
    let mut config = ClientConfig::new(base);
    config.basic_auth = Some(BasicAuth {
        username: "ops".to_string(),
        password: String::new(),
    });
    let mut client = HttpClient::new(&config, ErrorCounter::new()).unwrap();

    let echo: Echo = client.fetch("/echo").await.unwrap();
    assert_eq!(echo.authorization, "");
}

#[tokio::test]
async fn fetch_attaches_strict_token() {
    let base = spawn_upstream().await;
    let mut config = ClientConfig::new(base.clone());
    config.strict = Some(StrictAuth {
        uid: "exporter".to_string(),
        login_url: format!("{base}/login"),
        private_key: PRIVATE_KEY.to_string(),
    });
    let mut client = HttpClient::new(&config, ErrorCounter::new()).unwrap();

    let echo: Echo = client.fetch("/echo").await.unwrap();
    assert_eq!(echo.authorization, "token=opaque");
    assert_eq!(client.auth().unwrap().state().token, "token=opaque");
}

#[tokio::test]
async fn failed_login_degrades_to_unauthenticated() {
    let base = spawn_upstream().await;
    let errors = ErrorCounter::new();
    let mut config = ClientConfig::new(base.clone());
    config.strict = Some(StrictAuth {
        uid: "exporter".to_string(),
        login_url: format!("{base}/login-broken"),
        private_key: PRIVATE_KEY.to_string(),
    });
    let mut client = HttpClient::new(&config, errors.clone()).unwrap();

    // The request still goes out, without credentials.
    let echo: Echo = client.fetch("/echo").await.unwrap();
    assert_eq!(echo.authorization, "");
    assert_eq!(errors.get(), 1);
}

#[tokio::test]
async fn non_success_status_is_an_error() {
    let base = spawn_upstream().await;
    let mut client = HttpClient::new(&ClientConfig::new(base), ErrorCounter::new()).unwrap();

    let err = client.fetch::<serde_json::Value>("/missing").await.unwrap_err();
    assert!(matches!(err, ClientError::Status { status, .. } if status == StatusCode::NOT_FOUND));
}

#[tokio::test]
async fn malformed_body_is_a_decode_error() {
    let base = spawn_upstream().await;
    let mut client = HttpClient::new(&ClientConfig::new(base), ErrorCounter::new()).unwrap();

    let err = client.fetch::<serde_json::Value>("/garbage").await.unwrap_err();
    assert!(matches!(err, ClientError::Decode { .. }));
}

#[tokio::test]
async fn fetch_and_decode_counts_failures() {
    let base = spawn_upstream().await;
    let errors = ErrorCounter::new();
    let mut client = HttpClient::new(&ClientConfig::new(base), errors.clone()).unwrap();

    assert!(client.fetch_and_decode::<serde_json::Value>("/missing").await.is_none());
    assert!(client.fetch_and_decode::<serde_json::Value>("/garbage").await.is_none());
    assert!(client.fetch_and_decode::<Echo>("/echo").await.is_some());
    assert_eq!(errors.get(), 2);
}

#[tokio::test]
async fn unreachable_upstream_is_a_transport_error() {
    let mut client =
        HttpClient::new(&ClientConfig::new("http://127.0.0.1:9"), ErrorCounter::new()).unwrap();
    let err = client.fetch::<serde_json::Value>("/state").await.unwrap_err();
    assert!(matches!(err, ClientError::Transport { .. }));
}
