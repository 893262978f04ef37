//! PromptCaddy MCP server: serve Markdown prompts as tools over stdio.

pub mod cli;
pub mod config;
pub mod protocol;
pub mod tools;
pub mod transport;
pub mod types;

pub use config::resolve_prompts_dir;
pub use protocol::ProtocolHandler;
pub use transport::StdioTransport;
