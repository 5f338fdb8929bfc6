//! HTTP surface: `GET /metrics` renders one scrape of the registry.

use std::sync::Arc;

use axum::Router;
use axum::extract::State;
use axum::http::header;
use axum::response::IntoResponse;
use axum::routing::get;
use tokio::sync::Mutex;

use mesos_collectors::Registry;

/// Prometheus text exposition format.
pub const CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

/// Registry shared by request handlers. Scrapes are serialised by the lock.
pub type SharedRegistry = Arc<Mutex<Registry>>;

pub fn build_router(registry: SharedRegistry) -> Router {
    Router::new()
        .route("/metrics", get(metrics))
        .route("/health", get(|| async { "ok" }))
        .with_state(registry)
}

async fn metrics(State(registry): State<SharedRegistry>) -> impl IntoResponse {
    let body = registry.lock().await.render().await;
    ([(header::CONTENT_TYPE, CONTENT_TYPE)], body)
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    use mesos_client::{ClientConfig, HttpClient};
    use mesos_collectors::master_registry;
    use mesos_metrics::ErrorCounter;

    use super::*;

    fn unreachable_registry() -> SharedRegistry {
        let client = HttpClient::new(&ClientConfig::new("http://127.0.0.1:9"), ErrorCounter::new()).unwrap();
        Arc::new(Mutex::new(master_registry(client, &["rack"]).unwrap()))
    }

    async fn get_body(router: Router, uri: &str) -> (StatusCode, Option<String>, String) {
        let response = router
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, content_type, String::from_utf8(bytes.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn metrics_reports_errors_when_master_is_down() {
        let router = build_router(unreachable_registry());

        let (status, content_type, body) = get_body(router, "/metrics").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(content_type.as_deref(), Some(CONTENT_TYPE));
        assert!(body.contains("# TYPE mesos_collector_errors_total counter\n"));
        assert!(body.contains("mesos_collector_errors_total 3\n"));
        assert!(!body.contains("mesos_slave_"));
    }

    #[tokio::test]
    async fn error_counter_accumulates_across_requests() {
        let registry = unreachable_registry();

        get_body(build_router(Arc::clone(&registry)), "/metrics").await;
        let (_, _, body) = get_body(build_router(registry), "/metrics").await;

        assert!(body.contains("mesos_collector_errors_total 6\n"));
    }

    #[tokio::test]
    async fn health_is_ok() {
        let (status, _, body) = get_body(build_router(unreachable_registry()), "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "ok");
    }
}
