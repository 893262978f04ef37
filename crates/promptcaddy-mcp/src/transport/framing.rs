//! Message framing for newline-delimited JSON.

use serde::Serialize;

use crate::types::{JsonRpcRequest, McpError, McpResult};

/// Parse a single line of text as a JSON-RPC request envelope.
///
/// Only JSON objects are envelopes; arrays and bare values are rejected
/// even though they would otherwise decode positionally.
pub fn parse_message(line: &str) -> McpResult<JsonRpcRequest> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Err(McpError::ParseError("Empty message".to_string()));
    }
    if !trimmed.starts_with('{') {
        return Err(McpError::ParseError("Message is not a JSON object".to_string()));
    }

    serde_json::from_str(trimmed).map_err(|e| McpError::ParseError(e.to_string()))
}

/// Serialize a message to a JSON line (with trailing newline).
pub fn frame_message<T: Serialize>(message: &T) -> McpResult<String> {
    let mut json =
        serde_json::to_string(message).map_err(|e| McpError::InternalError(e.to_string()))?;
    json.push('\n');
    Ok(json)
}
