//! Main request dispatcher. Routes JSON-RPC requests to their handlers.

use std::sync::Arc;

use serde_json::Value;

use promptcaddy::PromptStore;

use crate::tools::ToolRegistry;
use crate::types::*;

use super::negotiation::negotiate;

/// Correlation id carried by the unsolicited initialize message.
pub const ANNOUNCE_ID: i64 = 0;

/// The main protocol handler that dispatches incoming JSON-RPC requests.
///
/// Requests are handled one at a time; the store is the only state shared
/// with the background watcher.
pub struct ProtocolHandler {
    store: Arc<PromptStore>,
}

impl ProtocolHandler {
    pub fn new(store: Arc<PromptStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<PromptStore> {
        &self.store
    }

    /// The message a server sends before reading any input: the initialize
    /// payload under a fixed id.
    pub fn announcement(&self) -> JsonRpcMessage {
        let result = serde_json::to_value(InitializeResult::default_result()).unwrap_or_default();
        JsonRpcResponse::new(ANNOUNCE_ID.into(), result).into()
    }

    /// Handle one request and produce exactly one response.
    pub async fn handle_request(&self, request: JsonRpcRequest) -> JsonRpcMessage {
        let id = request.id.clone();

        match self.dispatch_request(&request).await {
            Ok(value) => JsonRpcResponse::new(id, value).into(),
            Err(e) => {
                tracing::debug!("Request {id} ({:?}) failed: {e:?}", request.method);
                e.to_json_rpc_error(id).into()
            }
        }
    }

    async fn dispatch_request(&self, request: &JsonRpcRequest) -> McpResult<Value> {
        match request.method.as_str() {
            "initialize" => self.handle_initialize(request.params.as_ref()).await,
            "tools/list" => self.handle_tools_list().await,
            "tools/call" => self.handle_tools_call(request.params.clone()).await,
            _ => Err(McpError::MethodNotFound(request.method.clone())),
        }
    }

    async fn handle_initialize(&self, params: Option<&Value>) -> McpResult<Value> {
        let result = negotiate(params);
        serde_json::to_value(result).map_err(|e| McpError::InternalError(e.to_string()))
    }

    async fn handle_tools_list(&self) -> McpResult<Value> {
        let result = ToolListResult {
            tools: ToolRegistry::list_tools(&self.store),
        };
        serde_json::to_value(result).map_err(|e| McpError::InternalError(e.to_string()))
    }

    async fn handle_tools_call(&self, params: Option<Value>) -> McpResult<Value> {
        let call_params: ToolCallParams = params
            .map(serde_json::from_value)
            .transpose()
            .map_err(|e| McpError::InvalidParams(e.to_string()))?
            .ok_or_else(|| McpError::InvalidParams("Tool call params required".to_string()))?;

        let result = ToolRegistry::call(&call_params.name, call_params.arguments, &self.store)?;

        serde_json::to_value(result).map_err(|e| McpError::InternalError(e.to_string()))
    }
}
