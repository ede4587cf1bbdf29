//! HTTP API for the registration service
//!
//! Routes the registration endpoints alongside health checks and Prometheus
//! metrics on a single Axum router.

pub mod error;
pub mod health;
pub mod registration;
pub mod server;

pub use error::ApiError;
pub use server::HttpServer;

use crate::service::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

/// Build the Axum router with every endpoint
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/register", post(registration::register))
        .route("/api/pending", get(registration::pending))
        .route("/", get(health::root_handler))
        .route("/health", get(health::health_handler))
        .route("/ready", get(health::ready_handler))
        .route("/metrics", get(health::metrics_handler))
        .route("/stats", get(health::stats_handler))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::error::RegistrationError;
    use crate::store::{InMemoryStore, KeyValueStore, MockKeyValueStore};
    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
        response::Response,
    };
    use serde_json::{json, Value};
    use tower::ServiceExt; // for oneshot

    fn memory_router() -> (Arc<InMemoryStore>, Router) {
        let store = Arc::new(InMemoryStore::new());
        let state = AppState::with_store(AppConfig::default(), store.clone()).unwrap();
        (store, create_router(Arc::new(state)))
    }

    fn register_request(body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/register")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get_request(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    async fn body_json(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_register_echoes_user() {
        let (_store, app) = memory_router();
        let body = json!({ "name": "Alice", "email": "alice@example.com", "plan": "pro" });

        let response = app
            .oneshot(register_request(&body.to_string()))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await, body);
    }

    #[tokio::test]
    async fn test_register_echoes_null_email() {
        let (store, app) = memory_router();
        let body = json!({ "name": "Alice", "email": null });

        let response = app
            .oneshot(register_request(&body.to_string()))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await, body);

        let stored = store.get("waitlist").await.unwrap().unwrap();
        assert_eq!(stored, r#"[{"name":"Alice","email":null}]"#);
    }

    #[tokio::test]
    async fn test_register_then_pending() {
        let (_store, app) = memory_router();

        for name in ["Alice", "Bob"] {
            let response = app
                .clone()
                .oneshot(register_request(&json!({ "name": name }).to_string()))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK);
        }

        let response = app.oneshot(get_request("/api/pending")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            body_json(response).await,
            json!([{ "name": "Alice" }, { "name": "Bob" }])
        );
    }

    #[tokio::test]
    async fn test_pending_empty_store() {
        let (_store, app) = memory_router();

        let response = app.oneshot(get_request("/api/pending")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await, json!([]));
    }

    #[tokio::test]
    async fn test_pending_corrupt_store_is_empty() {
        let (store, app) = memory_router();
        store.put("waitlist", "definitely not json").await.unwrap();

        let response = app.oneshot(get_request("/api/pending")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await, json!([]));
    }

    #[tokio::test]
    async fn test_register_malformed_body() {
        let (store, app) = memory_router();

        let response = app
            .clone()
            .oneshot(register_request("{\"name\": "))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(body_json(response).await["error"].is_string());

        let response = app
            .oneshot(register_request(r#"{"email":"nobody@example.com"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        assert!(store.get("waitlist").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_register_store_failure_returns_500() {
        let mut store = MockKeyValueStore::new();
        store.expect_get().returning(|_| Ok(None));
        store
            .expect_put()
            .returning(|_, _| Err(RegistrationError::storage("read-only filesystem")));

        let state = AppState::with_store(AppConfig::default(), Arc::new(store)).unwrap();
        let metrics = state.metrics();
        let app = create_router(Arc::new(state));

        let response = app
            .oneshot(register_request(r#"{"name":"Alice"}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body_json(response).await,
            json!({ "error": "Failed to store registration" })
        );
        assert_eq!(
            metrics
                .http()
                .requests_total
                .with_label_values(&["register", "500"])
                .get(),
            1
        );
    }

    #[tokio::test]
    async fn test_wrong_method() {
        let (_store, app) = memory_router();

        let response = app.oneshot(get_request("/api/register")).await.unwrap();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn test_root_and_health_endpoints() {
        let (_store, app) = memory_router();

        let response = app.clone().oneshot(get_request("/")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["service"], "pesto-registration");

        let response = app.clone().oneshot(get_request("/health")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["status"], "healthy");

        let response = app.clone().oneshot(get_request("/ready")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app.oneshot(get_request("/stats")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let stats = body_json(response).await;
        assert_eq!(stats["waitlist"]["key"], "waitlist");
        assert_eq!(stats["waitlist"]["backend"], "memory");
    }

    #[tokio::test]
    async fn test_health_unavailable_when_store_fails() {
        let mut store = MockKeyValueStore::new();
        store
            .expect_get()
            .returning(|_| Err(RegistrationError::storage("connection refused")));

        let state = AppState::with_store(AppConfig::default(), Arc::new(store)).unwrap();
        let app = create_router(Arc::new(state));

        let response = app.clone().oneshot(get_request("/health")).await.unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

        let response = app.oneshot(get_request("/ready")).await.unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_metrics_endpoint() {
        let (_store, app) = memory_router();

        app.clone()
            .oneshot(register_request(r#"{"name":"Alice"}"#))
            .await
            .unwrap();

        let response = app.oneshot(get_request("/metrics")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let content_type = response.headers().get("content-type").unwrap();
        assert!(content_type.to_str().unwrap().contains("text/plain"));

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let text = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(text.contains("pesto_registrations_total 1"));
    }

    #[tokio::test]
    async fn test_404_handling() {
        let (_store, app) = memory_router();

        let response = app.oneshot(get_request("/nonexistent")).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
