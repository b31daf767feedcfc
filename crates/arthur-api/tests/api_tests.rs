//! API integration tests.
//!
//! Routes are exercised against an in-memory job store and a stubbed
//! provider served by wiremock.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use arthur_api::{create_router, ApiConfig, AppState};
use arthur_providers::{LumaConfig, LumaProvider, ProviderRegistry};
use arthur_store::MemoryJobStore;

/// Build a router backed by a memory store and a Luma adapter pointed
/// at the given mock server.
fn test_app(provider_url: String) -> Router {
    let mut providers = ProviderRegistry::new();
    providers.register(Arc::new(
        LumaProvider::new(LumaConfig {
            base_url: provider_url,
            api_key: "test-key".to_string(),
            ..Default::default()
        })
        .expect("Failed to build provider"),
    ));

    let state = AppState::from_parts(
        ApiConfig::default(),
        Arc::new(MemoryJobStore::new()),
        providers,
    );

    create_router(state, None)
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read body");
    serde_json::from_slice(&bytes).expect("Body is not JSON")
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

#[tokio::test]
async fn test_health_endpoint() {
    let server = MockServer::start().await;
    let app = test_app(server.uri());

    let response = app.oneshot(get("/health")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_ready_endpoint() {
    let server = MockServer::start().await;
    let app = test_app(server.uri());

    let response = app.oneshot(get("/ready")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_security_headers() {
    let server = MockServer::start().await;
    let app = test_app(server.uri());

    let response = app.oneshot(get("/health")).await.unwrap();

    let headers = response.headers();
    assert_eq!(headers.get("X-Content-Type-Options").unwrap(), "nosniff");
    assert_eq!(headers.get("X-Frame-Options").unwrap(), "DENY");
    assert!(headers.contains_key("X-Request-ID"));
}

#[tokio::test]
async fn test_create_generation_accepted() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/generations"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": "abc",
            "state": "queued"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let app = test_app(server.uri());

    let response = app
        .oneshot(post_json(
            "/api/generations",
            json!({
                "kind": "video",
                "prompt": "Create a cinematic video",
                "image_url": "https://x/img.png"
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::ACCEPTED);
    let body = body_json(response).await;
    assert_eq!(body["id"], "abc");
    assert_eq!(body["status"], "pending");
    assert_eq!(body["kind"], "video");
}

#[tokio::test]
async fn test_create_generation_missing_field_is_bad_request() {
    let server = MockServer::start().await;
    let app = test_app(server.uri());

    // Lip-sync without the audio track never reaches the provider.
    let response = app
        .oneshot(post_json(
            "/api/generations",
            json!({
                "kind": "lip-sync",
                "video_url": "https://x/clip.mp4"
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert!(body["detail"].as_str().unwrap().contains("audio_url"));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_provider_rejection_maps_to_bad_gateway() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/generations"))
        .respond_with(ResponseTemplate::new(422).set_body_string("prompt rejected"))
        .mount(&server)
        .await;

    let app = test_app(server.uri());

    let response = app
        .oneshot(post_json(
            "/api/generations",
            json!({ "kind": "video", "prompt": "x" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let body = body_json(response).await;
    assert!(body["detail"].as_str().unwrap().contains("422"));
}

#[tokio::test]
async fn test_poll_flow_to_completion() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/generations"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": "abc",
            "state": "queued"
        })))
        .mount(&server)
        .await;

    // First status query: still dreaming; afterwards: completed.
    Mock::given(method("GET"))
        .and(path("/generations/abc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "abc",
            "state": "dreaming"
        })))
        .up_to_n_times(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/generations/abc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "abc",
            "state": "completed",
            "assets": { "video": "https://x/out.mp4" }
        })))
        .mount(&server)
        .await;

    let app = test_app(server.uri());

    let response = app
        .clone()
        .oneshot(post_json(
            "/api/generations",
            json!({ "kind": "video", "prompt": "Create a cinematic video" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::ACCEPTED);

    let response = app.clone().oneshot(get("/api/generations/abc")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "in_progress");

    let response = app.clone().oneshot(get("/api/generations/abc")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "completed");
    assert_eq!(body["result"]["video"], "https://x/out.mp4");
    assert!(body.get("error").is_none());

    // Terminal polls are answered from the store.
    let response = app.oneshot(get("/api/generations/abc")).await.unwrap();
    let body = body_json(response).await;
    assert_eq!(body["status"], "completed");
}

#[tokio::test]
async fn test_get_unknown_generation_is_not_found() {
    let server = MockServer::start().await;
    let app = test_app(server.uri());

    let response = app.oneshot(get("/api/generations/does-not-exist")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_get_generation_rejects_malformed_id() {
    let server = MockServer::start().await;
    let app = test_app(server.uri());

    let response = app.oneshot(get("/api/generations/bad.id")).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_list_generations() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/generations"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": "abc",
            "state": "queued"
        })))
        .mount(&server)
        .await;

    let app = test_app(server.uri());

    app.clone()
        .oneshot(post_json(
            "/api/generations",
            json!({ "kind": "video", "prompt": "Create a cinematic video" }),
        ))
        .await
        .unwrap();

    let response = app.clone().oneshot(get("/api/generations")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["generations"].as_array().unwrap().len(), 1);
    assert_eq!(body["generations"][0]["id"], "abc");

    // Filtered out by state.
    let response = app.oneshot(get("/api/generations?state=completed")).await.unwrap();
    let body = body_json(response).await;
    assert!(body["generations"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_webhook_settles_job() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/generations"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": "abc",
            "state": "queued"
        })))
        .mount(&server)
        .await;

    let app = test_app(server.uri());

    app.clone()
        .oneshot(post_json(
            "/api/generations",
            json!({ "kind": "video", "prompt": "Create a cinematic video" }),
        ))
        .await
        .unwrap();

    let response = app
        .clone()
        .oneshot(post_json(
            "/api/webhooks/luma",
            json!({
                "id": "abc",
                "state": "completed",
                "assets": { "video": "https://x/out.mp4" }
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "completed");
    assert_eq!(body["result"]["video"], "https://x/out.mp4");
}

#[tokio::test]
async fn test_webhook_unknown_job_is_not_found() {
    let server = MockServer::start().await;
    let app = test_app(server.uri());

    let response = app
        .oneshot(post_json(
            "/api/webhooks/luma",
            json!({ "id": "nope", "state": "completed" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
