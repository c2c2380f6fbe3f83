// weather-server/src/transport/streamable_http.rs
use crate::config::SESSION_TTL_SECS;
use crate::transport::traits::{McpTransport, MessageHandler, TransportError};
use axum::{
    extract::State,
    http::{header, HeaderMap, HeaderName, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use futures::future::BoxFuture;
use serde_json::Value;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::net::TcpListener;
use tokio::sync::RwLock;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

pub const MCP_SESSION_ID_HEADER: &str = "mcp-session-id";

/// Idle time after which a session that was never deleted is dropped.
pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(SESSION_TTL_SECS);

// Structure to store session information
struct SessionInfo {
    created_at: Instant,
    last_seen: Instant,
}

impl SessionInfo {
    fn new() -> Self {
        let now = Instant::now();
        SessionInfo { created_at: now, last_seen: now }
    }
}

#[derive(Clone)]
struct HttpState {
    message_handler: Arc<dyn MessageHandler>,
    sessions: Arc<RwLock<HashMap<String, SessionInfo>>>,
    session_ttl: Duration,
}

/// Build the `/mcp` router around a message handler.
pub fn router(message_handler: Arc<dyn MessageHandler>) -> Router {
    router_with_session_ttl(message_handler, DEFAULT_SESSION_TTL)
}

/// Like [`router`], with idle sessions expiring after `session_ttl`.
pub fn router_with_session_ttl(
    message_handler: Arc<dyn MessageHandler>,
    session_ttl: Duration,
) -> Router {
    let state = HttpState {
        message_handler,
        sessions: Arc::new(RwLock::new(HashMap::new())),
        session_ttl,
    };

    Router::new()
        .route("/mcp", get(handle_get).post(handle_post).delete(handle_delete))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub struct StreamableHttpTransport {
    addr: SocketAddr,
    session_ttl: Duration,
}

impl StreamableHttpTransport {
    pub fn new(addr: SocketAddr, session_ttl: Duration) -> Self {
        Self { addr, session_ttl }
    }
}

impl McpTransport for StreamableHttpTransport {
    fn serve<'a>(&'a self, message_handler: Arc<dyn MessageHandler>)
        -> BoxFuture<'a, Result<(), TransportError>> {
        Box::pin(async move {
            let listener = TcpListener::bind(self.addr).await.map_err(|e| {
                TransportError::Startup(format!("failed to bind {}: {}", self.addr, e))
            })?;
            info!("Server listening on {}", self.addr);

            let app = router_with_session_ttl(message_handler, self.session_ttl);
            axum::serve(listener, app.into_make_service())
                .with_graceful_shutdown(shutdown_signal())
                .await?;

            info!("Server shut down successfully");
            Ok(())
        })
    }
}

// --- Graceful Shutdown Signal Handler ---
async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received..."),
        Err(e) => {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    }
}

fn session_id(headers: &HeaderMap) -> Option<String> {
    headers
        .get(MCP_SESSION_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

fn is_initialize(body: &str) -> bool {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.get("method").and_then(Value::as_str).map(|m| m == "initialize"))
        .unwrap_or(false)
}

// Only a `result` answer opens a session; error responses do not
fn is_success(response: &str) -> bool {
    serde_json::from_str::<Value>(response)
        .ok()
        .map(|v| v.get("result").is_some())
        .unwrap_or(false)
}

fn evict_expired(sessions: &mut HashMap<String, SessionInfo>, ttl: Duration) {
    let before = sessions.len();
    sessions.retain(|_, session| session.last_seen.elapsed() < ttl);
    let evicted = before - sessions.len();
    if evicted > 0 {
        info!("Evicted {} idle sessions", evicted);
    }
}

// Handle HTTP POST requests (client to server)
async fn handle_post(State(state): State<HttpState>, headers: HeaderMap, body: String) -> Response {
    let session_id = session_id(&headers);

    if let Some(ref id) = session_id {
        let mut sessions = state.sessions.write().await;
        match sessions.get_mut(id) {
            Some(session) if session.last_seen.elapsed() < state.session_ttl => {
                session.last_seen = Instant::now();
            }
            Some(_) => {
                sessions.remove(id);
                warn!("POST /mcp for expired session: {}", id);
                return (StatusCode::NOT_FOUND, "Session not found").into_response();
            }
            None => {
                warn!("POST /mcp for non-existent session: {}", id);
                return (StatusCode::NOT_FOUND, "Session not found").into_response();
            }
        }
        debug!("POST /mcp for session: {}", id);
    }

    let initialize = is_initialize(&body);
    let client_id = session_id.unwrap_or_else(|| format!("http-{}", Uuid::new_v4()));

    match state.message_handler.handle_message(body, client_id).await {
        Some(response) if initialize && is_success(&response) => {
            let new_session = Uuid::new_v4().to_string();
            {
                let mut sessions = state.sessions.write().await;
                evict_expired(&mut sessions, state.session_ttl);
                sessions.insert(new_session.clone(), SessionInfo::new());
            }
            info!("Created session {}", new_session);

            (
                StatusCode::OK,
                [
                    (header::CONTENT_TYPE, "application/json".to_string()),
                    (HeaderName::from_static(MCP_SESSION_ID_HEADER), new_session),
                ],
                response,
            )
                .into_response()
        }
        Some(response) => {
            (StatusCode::OK, [(header::CONTENT_TYPE, "application/json")], response).into_response()
        }
        // Notifications and responses only: accepted, nothing to return
        None => StatusCode::ACCEPTED.into_response(),
    }
}

// No server-initiated stream is offered
async fn handle_get() -> Response {
    (StatusCode::METHOD_NOT_ALLOWED, [(header::ALLOW, "POST, DELETE")], "SSE stream not supported")
        .into_response()
}

async fn handle_delete(State(state): State<HttpState>, headers: HeaderMap) -> Response {
    let Some(id) = session_id(&headers) else {
        warn!("DELETE /mcp missing mcp-session-id");
        return (StatusCode::BAD_REQUEST, "mcp-session-id header required").into_response();
    };

    match state.sessions.write().await.remove(&id) {
        Some(session) => {
            info!(
                "Session {} terminated via DELETE /mcp after {:?}",
                id,
                session.created_at.elapsed()
            );
            (StatusCode::OK, "Session terminated").into_response()
        }
        None => {
            warn!("DELETE /mcp for non-existent session: {}", id);
            (StatusCode::NOT_FOUND, "Session not found").into_response()
        }
    }
}
