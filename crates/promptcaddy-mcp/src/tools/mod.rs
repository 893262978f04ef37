//! MCP tools backed by the prompt store.

pub mod registry;
pub mod schema;

pub use registry::ToolRegistry;
