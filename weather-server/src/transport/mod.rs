// weather-server/src/transport/mod.rs
pub mod traits;
mod stdio;
mod streamable_http;

pub use traits::{McpTransport, MessageHandler, TransportError};
pub use stdio::StdioTransport;
pub use streamable_http::{
    router, router_with_session_ttl, StreamableHttpTransport, DEFAULT_SESSION_TTL,
    MCP_SESSION_ID_HEADER,
};
