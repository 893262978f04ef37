//! MCP capability negotiation during initialization.

use serde_json::Value;

use crate::types::{InitializeParams, InitializeResult, MCP_VERSION};

/// Answer an `initialize` request. Client params are informational only:
/// anything undecodable is ignored and the fixed server payload is returned.
pub fn negotiate(params: Option<&Value>) -> InitializeResult {
    let params: InitializeParams = params
        .and_then(|p| serde_json::from_value(p.clone()).ok())
        .unwrap_or_default();

    if let Some(version) = params.protocol_version.as_deref() {
        if version != MCP_VERSION {
            tracing::warn!(
                "Client requested protocol version {version}, server supports {MCP_VERSION}. Proceeding with server version."
            );
        }
    }

    if let Some(client) = &params.client_info {
        tracing::info!("Initialized with client: {} v{}", client.name, client.version);
    }

    InitializeResult::default_result()
}
