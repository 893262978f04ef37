//! Stdio transport. Reads JSON-RPC from stdin, writes to stdout.

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};

use promptcaddy::DirectoryWatcher;

use crate::protocol::ProtocolHandler;
use crate::types::{JsonRpcMessage, McpError, McpResult};

use super::framing;

/// Stdio transport for desktop MCP clients.
pub struct StdioTransport {
    handler: ProtocolHandler,
    watcher: Option<DirectoryWatcher>,
}

impl StdioTransport {
    pub fn new(handler: ProtocolHandler) -> Self {
        Self {
            handler,
            watcher: None,
        }
    }

    /// Keep the store fresh while serving. The watcher is started before
    /// the first line is read and stopped at end of input.
    pub fn with_watcher(mut self, watcher: DirectoryWatcher) -> Self {
        self.watcher = Some(watcher);
        self
    }

    /// Run the transport loop on stdin and stdout.
    pub async fn run(&mut self) -> McpResult<()> {
        let stdin = BufReader::new(tokio::io::stdin());
        let stdout = tokio::io::stdout();
        self.serve(stdin, stdout).await
    }

    /// Serve one peer over any line-oriented reader/writer pair.
    ///
    /// Lines that are not a well-formed request envelope are dropped without
    /// a response. Requests are answered strictly in arrival order.
    pub async fn serve<R, W>(&mut self, mut reader: R, mut writer: W) -> McpResult<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        if let Some(watcher) = self.watcher.as_mut() {
            watcher.start()?;
        }

        let result = self.serve_lines(&mut reader, &mut writer).await;

        if let Some(watcher) = self.watcher.as_mut() {
            watcher.stop().await;
        }

        result
    }

    async fn serve_lines<R, W>(&self, reader: &mut R, writer: &mut W) -> McpResult<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        write_line(writer, &self.handler.announcement()).await?;

        tracing::info!("Stdio transport started");

        let mut line = String::new();
        loop {
            line.clear();
            let bytes_read = reader.read_line(&mut line).await.map_err(McpError::Io)?;

            if bytes_read == 0 {
                tracing::info!("EOF on stdin, shutting down");
                break;
            }

            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }

            match framing::parse_message(trimmed) {
                Ok(request) => {
                    let response = self.handler.handle_request(request).await;
                    write_line(writer, &response).await?;
                }
                Err(e) => {
                    tracing::debug!("Dropping malformed message: {e}");
                }
            }
        }

        Ok(())
    }
}

async fn write_line<W>(writer: &mut W, message: &JsonRpcMessage) -> McpResult<()>
where
    W: AsyncWrite + Unpin,
{
    let framed = framing::frame_message(message)?;
    writer
        .write_all(framed.as_bytes())
        .await
        .map_err(McpError::Io)?;
    writer.flush().await.map_err(McpError::Io)
}
