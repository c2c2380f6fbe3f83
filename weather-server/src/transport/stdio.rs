// weather-server/src/transport/stdio.rs
use crate::transport::traits::{McpTransport, MessageHandler, TransportError};
use futures::future::BoxFuture;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::info;

const CLIENT_ID: &str = "stdio";

/// Newline-delimited JSON-RPC over stdin/stdout.
pub struct StdioTransport;

impl StdioTransport {
    /// Serve messages from `reader` until EOF, writing one response per line.
    pub async fn run<R, W>(
        message_handler: &dyn MessageHandler,
        reader: R,
        mut writer: W,
    ) -> Result<(), TransportError>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut lines = reader.lines();
        while let Some(line) = lines.next_line().await? {
            if line.trim().is_empty() {
                continue;
            }
            let reply = message_handler.handle_message(line, CLIENT_ID.to_string()).await;
            if let Some(response) = reply {
                writer.write_all(response.as_bytes()).await?;
                writer.write_all(b"\n").await?;
                writer.flush().await?;
            }
        }
        Ok(())
    }
}

impl McpTransport for StdioTransport {
    fn serve<'a>(&'a self, message_handler: Arc<dyn MessageHandler>)
        -> BoxFuture<'a, Result<(), TransportError>> {
        Box::pin(async move {
            info!("Serving MCP over stdio");
            let stdin = BufReader::new(tokio::io::stdin());
            Self::run(message_handler.as_ref(), stdin, tokio::io::stdout()).await?;
            info!("stdin closed, stopping stdio transport");
            Ok(())
        })
    }
}
