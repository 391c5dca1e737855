//! JSON-RPC 2.0 wire model and MCP result shapes.
//!
//! Self-contained: no JSON-RPC framework, just serde types mirroring what
//! actually travels over the stdio pipe, one JSON object per line. Inbound
//! lines are decoded leniently ([`decode_line`]) so the dispatcher can answer
//! malformed input with the proper error envelope instead of failing.

pub mod envelope;
pub mod error;
pub mod mcp;

pub use envelope::{decode_line, Call, Decoded, ErrorObject, Notification, Response};
pub use error::RpcError;
pub use mcp::{
    CallToolResult, ContentBlock, InitializeResult, ReadResourceResult, ResourceContents,
    ResourceDescriptor, ResourcesListResult, ServerCapabilities, ServerInfo, ToolDescriptor,
    ToolsListResult, DEFAULT_PROTOCOL_VERSION,
};

/// Version string stamped on every outbound envelope.
pub const JSONRPC_VERSION: &str = "2.0";
