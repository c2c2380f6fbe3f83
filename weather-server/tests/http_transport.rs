use std::sync::Arc;
use std::time::Duration;

use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use weather_server::build_registry;
use weather_server::config::ServerConfig;
use weather_server::message_handler::McpMessageHandler;
use weather_server::transport::{
    router, router_with_session_ttl, MessageHandler, MCP_SESSION_ID_HEADER,
};

fn handler() -> Arc<dyn MessageHandler> {
    let config = ServerConfig::default();
    let registry = build_registry(&config).expect("registry");
    Arc::new(McpMessageHandler::new(registry, "weather"))
}

fn app() -> Router {
    router(handler())
}

fn post(body: Value, session: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method(Method::POST)
        .uri("/mcp")
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(id) = session {
        builder = builder.header(MCP_SESSION_ID_HEADER, id);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn initialize() -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": 1,
        "method": "initialize",
        "params": {"protocolVersion": "2025-03-26", "capabilities": {}}
    })
}

#[tokio::test]
async fn initialize_issues_a_session_that_later_requests_can_use() {
    let app = app();

    let response = app.clone().oneshot(post(initialize(), None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let session = response
        .headers()
        .get(MCP_SESSION_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .expect("session header")
        .to_string();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body["result"]["serverInfo"]["name"], "weather");

    let ping = json!({"jsonrpc": "2.0", "id": 2, "method": "ping"});
    let response = app.clone().oneshot(post(ping, Some(&session))).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().get(MCP_SESSION_ID_HEADER).is_none());

    let delete = Request::builder()
        .method(Method::DELETE)
        .uri("/mcp")
        .header(MCP_SESSION_ID_HEADER, &session)
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(delete).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let ping = json!({"jsonrpc": "2.0", "id": 3, "method": "ping"});
    let response = app.oneshot(post(ping, Some(&session))).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn failed_initialize_issues_no_session() {
    let bad = json!({
        "jsonrpc": "2.0",
        "id": 1,
        "method": "initialize",
        "params": {"protocolVersion": 5}
    });
    let response = app().oneshot(post(bad, None)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().get(MCP_SESSION_ID_HEADER).is_none());
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body["error"]["code"], -32602);
}

#[tokio::test]
async fn idle_sessions_expire() {
    let app = router_with_session_ttl(handler(), Duration::from_millis(50));

    let response = app.clone().oneshot(post(initialize(), None)).await.unwrap();
    let stale = response
        .headers()
        .get(MCP_SESSION_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .expect("session header")
        .to_string();

    tokio::time::sleep(Duration::from_millis(120)).await;

    // A fresh initialize still works after the old session went idle
    let response = app.clone().oneshot(post(initialize(), None)).await.unwrap();
    assert!(response.headers().get(MCP_SESSION_ID_HEADER).is_some());

    let ping = json!({"jsonrpc": "2.0", "id": 2, "method": "ping"});
    let response = app.oneshot(post(ping, Some(&stale))).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn unknown_session_is_rejected() {
    let ping = json!({"jsonrpc": "2.0", "id": 1, "method": "ping"});
    let response = app().oneshot(post(ping, Some("no-such-session"))).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn notifications_are_accepted_without_body() {
    let note = json!({"jsonrpc": "2.0", "method": "notifications/initialized"});
    let response = app().oneshot(post(note, None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::ACCEPTED);
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert!(body.is_empty());
}

#[tokio::test]
async fn get_stream_is_not_offered() {
    let request = Request::builder().method(Method::GET).uri("/mcp").body(Body::empty()).unwrap();
    let response = app().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn delete_requires_session_header() {
    let request =
        Request::builder().method(Method::DELETE).uri("/mcp").body(Body::empty()).unwrap();
    let response = app().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let request = Request::builder()
        .method(Method::DELETE)
        .uri("/mcp")
        .header(MCP_SESSION_ID_HEADER, "missing")
        .body(Body::empty())
        .unwrap();
    let response = app().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
