// weather-server/src/transport/traits.rs
use futures::future::BoxFuture;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Transport startup error: {0}")]
    Startup(String),
    #[error("Transport I/O error: {0}")]
    Io(#[from] std::io::Error),
}

// Object-safe: returns a boxed future instead of using async fn
pub trait MessageHandler: Send + Sync {
    /// Handle one JSON-RPC message (or batch). `None` means nothing to send back.
    fn handle_message<'a>(&'a self, message: String, client_id: String)
        -> BoxFuture<'a, Option<String>>;
}

pub trait McpTransport: Send + Sync {
    /// Serve until shutdown or end of input.
    fn serve<'a>(&'a self, message_handler: Arc<dyn MessageHandler>)
        -> BoxFuture<'a, Result<(), TransportError>>;
}
