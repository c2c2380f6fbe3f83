// weather-server/src/main.rs
use std::error::Error;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;
use weather_server::config::{ServerConfig, TransportKind, CONFIG_FILE_PATH};
use weather_server::message_handler::McpMessageHandler;
use weather_server::transport::{
    McpTransport, MessageHandler, StdioTransport, StreamableHttpTransport,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    // Logs go to stderr so stdout stays free for the stdio transport
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = ServerConfig::load(CONFIG_FILE_PATH)?;

    let registry = weather_server::build_registry(&config)?;
    info!(
        "Registered {} tools and {} resources",
        registry.all_tools().len(),
        registry.all_resources().len()
    );

    let message_handler: Arc<dyn MessageHandler> =
        Arc::new(McpMessageHandler::new(registry, config.server.name.clone()));

    let transport: Box<dyn McpTransport> = match config.server.transport {
        TransportKind::Http => {
            let listen = format!("{}:{}", config.server.host, config.server.port);
            let addr: SocketAddr = listen
                .parse()
                .map_err(|e| format!("invalid listen address {}: {}", listen, e))?;
            info!("Starting MCP server '{}' on {}", config.server.name, addr);
            Box::new(StreamableHttpTransport::new(addr, config.server.session_ttl()))
        }
        TransportKind::Stdio => Box::new(StdioTransport),
    };

    transport.serve(message_handler).await?;
    Ok(())
}
