//! Error types and JSON-RPC error codes for the MCP server.

use promptcaddy::CaddyError;

use super::message::{JsonRpcError, JsonRpcErrorObject, RequestId, JSONRPC_VERSION};

/// Standard JSON-RPC 2.0 error codes.
pub mod error_codes {
    pub const PARSE_ERROR: i32 = -32700;
    pub const METHOD_NOT_FOUND: i32 = -32601;
    pub const INVALID_PARAMS: i32 = -32602;
    pub const INTERNAL_ERROR: i32 = -32603;
}

/// All errors that can occur in the MCP server.
#[derive(thiserror::Error, Debug)]
pub enum McpError {
    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Method not found: {0}")]
    MethodNotFound(String),

    #[error("Invalid params: {0}")]
    InvalidParams(String),

    #[error("Internal error: {0}")]
    InternalError(String),

    /// Unknown tool name. Shares the invalid-params code for client compatibility.
    #[error("Tool not found")]
    ToolNotFound(String),

    /// Interpolation failure, surfaced with the library's message unchanged.
    #[error("{0}")]
    Render(String),

    #[error("Prompt error: {0}")]
    Prompt(#[from] CaddyError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl McpError {
    pub fn code(&self) -> i32 {
        use error_codes::*;
        match self {
            McpError::ParseError(_) => PARSE_ERROR,
            McpError::MethodNotFound(_) => METHOD_NOT_FOUND,
            McpError::InvalidParams(_) | McpError::ToolNotFound(_) | McpError::Render(_) => {
                INVALID_PARAMS
            }
            McpError::InternalError(_) | McpError::Prompt(_) | McpError::Io(_) => INTERNAL_ERROR,
        }
    }

    pub fn to_json_rpc_error(&self, id: RequestId) -> JsonRpcError {
        JsonRpcError {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            error: JsonRpcErrorObject {
                code: self.code(),
                message: self.to_string(),
                data: None,
            },
        }
    }
}

pub type McpResult<T> = Result<T, McpError>;
