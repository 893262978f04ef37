//! JSON-RPC 2.0 message types for the MCP protocol.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::value::RawValue;
use serde_json::Value;

/// JSON-RPC 2.0 protocol version.
pub const JSONRPC_VERSION: &str = "2.0";

/// Request identifier.
///
/// Held as the raw JSON text the client sent, whatever its type, so it is
/// echoed back byte for byte (`1e3` stays `1e3`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(Box<RawValue>);

impl RequestId {
    pub fn null() -> Self {
        Self(RawValue::NULL.to_owned())
    }

    /// The id exactly as it appeared on the wire.
    pub fn as_raw(&self) -> &str {
        self.0.get()
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::null()
    }
}

impl PartialEq for RequestId {
    fn eq(&self, other: &Self) -> bool {
        self.as_raw() == other.as_raw()
    }
}

impl From<i64> for RequestId {
    fn from(n: i64) -> Self {
        RawValue::from_string(n.to_string())
            .map(Self)
            .unwrap_or_default()
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_raw())
    }
}

/// A JSON-RPC 2.0 request message.
///
/// Any JSON object whose fields have the right types is a request: absent
/// or null `jsonrpc` and `method` read as empty, and an absent `id` as null.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub jsonrpc: String,
    #[serde(default)]
    pub id: RequestId,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub method: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// A JSON-RPC 2.0 success response.
#[derive(Debug, Clone, Serialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: String,
    pub id: RequestId,
    pub result: Value,
}

/// A JSON-RPC 2.0 error response.
#[derive(Debug, Clone, Serialize)]
pub struct JsonRpcError {
    pub jsonrpc: String,
    pub id: RequestId,
    pub error: JsonRpcErrorObject,
}

/// Error object within a JSON-RPC error response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcErrorObject {
    pub code: i32,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

/// One outgoing line: a result or an error, never both.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum JsonRpcMessage {
    Response(JsonRpcResponse),
    Error(JsonRpcError),
}

impl JsonRpcResponse {
    pub fn new(id: RequestId, result: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            result,
        }
    }
}

impl From<JsonRpcResponse> for JsonRpcMessage {
    fn from(response: JsonRpcResponse) -> Self {
        JsonRpcMessage::Response(response)
    }
}

impl From<JsonRpcError> for JsonRpcMessage {
    fn from(error: JsonRpcError) -> Self {
        JsonRpcMessage::Error(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_id_keeps_literal() {
        for raw in ["1e3", "12345678901234567890123", "7.50", "\"a\"", "true", "{\"k\":1}"] {
            let line = format!("{{\"id\":{raw},\"method\":\"m\"}}");
            let req: JsonRpcRequest = serde_json::from_str(&line).unwrap();
            assert_eq!(req.id.as_raw(), raw);
        }
    }

    #[test]
    fn test_null_and_missing_fields() {
        let req: JsonRpcRequest =
            serde_json::from_str(r#"{"jsonrpc":null,"id":null,"method":null}"#).unwrap();
        assert!(req.jsonrpc.is_empty());
        assert!(req.method.is_empty());
        assert_eq!(req.id, RequestId::null());

        let req: JsonRpcRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(req.id.as_raw(), "null");
        assert!(req.params.is_none());
    }

    #[test]
    fn test_message_serializes_flat() {
        let ok: JsonRpcMessage =
            JsonRpcResponse::new(RequestId::from(5_i64), Value::Bool(true)).into();
        assert_eq!(
            serde_json::to_string(&ok).unwrap(),
            r#"{"jsonrpc":"2.0","id":5,"result":true}"#
        );
    }
}
