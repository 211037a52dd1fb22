//! HTTP surface tests
//!
//! Drives the router in-process with `tower::ServiceExt::oneshot`; no
//! listener is bound.

mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use common::{build_context, Failure, ScriptedProvider};
use jarvis::server::{create_router, RATE_LIMIT_MESSAGE};
use serde_json::{json, Value};
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

async fn router_with(dir: &TempDir, provider: Arc<ScriptedProvider>, keys: &[&str]) -> Router {
    create_router(build_context(dir.path(), provider, keys).await)
}

async fn send(router: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("error bodies are JSON")
    };
    (status, body)
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
async fn test_root_lists_endpoints() {
    let dir = TempDir::new().unwrap();
    let router = router_with(&dir, ScriptedProvider::replying(), &["key-1"]).await;

    let (status, body) = send(router, get("/")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Jarvis API");
    assert!(body["endpoints"]["/chat/realtime"].is_string());
}

#[tokio::test]
async fn test_health_reports_services() {
    let dir = TempDir::new().unwrap();
    let router = router_with(&dir, ScriptedProvider::replying(), &["key-1", "key-2"]).await;

    let (status, body) = send(router, get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["vector_store"], true);
    assert_eq!(body["llm"], true);
    assert_eq!(body["realtime"], false);
    assert_eq!(body["credentials"], 2);
}

#[tokio::test]
async fn test_chat_then_history() {
    let dir = TempDir::new().unwrap();
    let router = router_with(&dir, ScriptedProvider::replying(), &["key-1"]).await;

    let (status, body) = send(
        router.clone(),
        post_json("/chat", json!({"message": "Hello", "session_id": "web-1"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["response"], "Reply to: Hello");
    assert_eq!(body["session_id"], "web-1");

    let (status, body) = send(router, get("/chat/history/web-1")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["session_id"], "web-1");
    let messages = body["messages"].as_array().unwrap();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0]["role"], "user");
    assert_eq!(messages[0]["content"], "Hello");
    assert_eq!(messages[1]["role"], "assistant");
}

#[tokio::test]
async fn test_chat_without_session_id_assigns_one() {
    let dir = TempDir::new().unwrap();
    let router = router_with(&dir, ScriptedProvider::replying(), &["key-1"]).await;

    let (status, body) = send(router, post_json("/chat/realtime", json!({"message": "Hi"}))).await;
    assert_eq!(status, StatusCode::OK);
    let session_id = body["session_id"].as_str().unwrap();
    assert!(uuid::Uuid::parse_str(session_id).is_ok());
}

#[tokio::test]
async fn test_unknown_history_is_empty() {
    let dir = TempDir::new().unwrap();
    let router = router_with(&dir, ScriptedProvider::replying(), &["key-1"]).await;

    let (status, body) = send(router, get("/chat/history/never-seen")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["session_id"], "never-seen");
    assert_eq!(body["messages"], json!([]));
    assert!(!dir.path().join("chats_data/never-seen.json").exists());
}

#[tokio::test]
async fn test_invalid_session_id_is_bad_request() {
    let dir = TempDir::new().unwrap();
    let router = router_with(&dir, ScriptedProvider::replying(), &["key-1"]).await;

    let (status, body) = send(router.clone(), get("/chat/history/bad..id")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "bad_request");

    let (status, _) = send(
        router,
        post_json("/chat", json!({"message": "Hi", "session_id": "a/b"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_empty_message_is_unprocessable() {
    let dir = TempDir::new().unwrap();
    let router = router_with(&dir, ScriptedProvider::replying(), &["key-1"]).await;

    let (status, body) = send(router, post_json("/chat", json!({"message": ""}))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "unprocessable_entity");
}

#[tokio::test]
async fn test_missing_message_field_is_rejected() {
    let dir = TempDir::new().unwrap();
    let router = router_with(&dir, ScriptedProvider::replying(), &["key-1"]).await;

    let (status, body) = send(router, post_json("/chat", json!({"session_id": "x"}))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "unprocessable_entity");
    assert!(body["message"].as_str().unwrap().contains("message"));
}

#[tokio::test]
async fn test_malformed_body_is_json_bad_request() {
    let dir = TempDir::new().unwrap();
    let router = router_with(&dir, ScriptedProvider::replying(), &["key-1"]).await;

    let request = Request::builder()
        .method("POST")
        .uri("/chat/realtime")
        .header("content-type", "application/json")
        .body(Body::from("{\"message\": "))
        .unwrap();
    let (status, body) = send(router, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "bad_request");
    assert!(body["message"].is_string());
}

#[tokio::test]
async fn test_exhausted_rate_limits_return_429() {
    let dir = TempDir::new().unwrap();
    let provider = ScriptedProvider::failing(&[
        ("key-1", Failure::RateLimited),
        ("key-2", Failure::RateLimited),
    ]);
    let router = router_with(&dir, provider, &["key-1", "key-2"]).await;

    let (status, body) = send(router, post_json("/chat", json!({"message": "Hello"}))).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body["message"], RATE_LIMIT_MESSAGE);
}

#[tokio::test]
async fn test_provider_outage_returns_502() {
    let dir = TempDir::new().unwrap();
    let provider = ScriptedProvider::failing(&[("key-1", Failure::Unavailable)]);
    let router = router_with(&dir, provider, &["key-1"]).await;

    let (status, body) = send(router, post_json("/chat", json!({"message": "Hello"}))).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["error"], "provider_unavailable");
}
