//! MCP request parameter types.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCallParams {
    /// Absent reads as empty, which names no tool.
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub arguments: Option<Map<String, Value>>,
}
