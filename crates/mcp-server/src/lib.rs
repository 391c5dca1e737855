//! AppScope MCP server.
//!
//! Exposes application introspection to AI agents over the Model Context
//! Protocol: newline-delimited JSON-RPC 2.0 on stdio. Tools cover application
//! facts, configuration, components, routes, database schema and queries,
//! logs, and guideline documents; two resources serve the project guidelines
//! file and the active server configuration.
//!
//! The binary wires a config-backed host ([`static_host`]) into the tool set;
//! everything else is host-agnostic and reads application state through the
//! traits in [`host`].

pub mod config;
pub mod error;
pub mod host;
pub mod logging;
pub mod registry;
pub mod resources;
pub mod sanitize;
pub mod server;
pub mod static_host;
pub mod tools;
pub mod transport;

pub use config::LoadedConfig;
pub use error::{Result, ServerError};
pub use host::Host;
pub use registry::{ResourceRegistry, ToolRegistry};
pub use server::McpServer;
pub use transport::LineTransport;
