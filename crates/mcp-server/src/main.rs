//! AppScope MCP server binary.
//!
//! Reads the host application description from `appscope.toml` (or the path
//! in `APPSCOPE_CONFIG`) and serves introspection tools to an AI client over
//! newline-delimited JSON-RPC on stdio.
//!
//! Add to an MCP client configuration:
//! ```json
//! {
//!   "mcpServers": {
//!     "appscope": {
//!       "command": "appscope-mcp",
//!       "env": { "APPSCOPE_BASE_PATH": "/path/to/app" }
//!     }
//!   }
//! }
//! ```

use std::sync::Arc;

use anyhow::Result;

use appscope_logs::RecordBuffer;
use appscope_mcp::config::LoadedConfig;
use appscope_mcp::resources::register_builtin_resources;
use appscope_mcp::static_host::build_host;
use appscope_mcp::tools::register_builtin_tools;
use appscope_mcp::{logging, LineTransport, McpServer, ResourceRegistry, ToolRegistry};

#[tokio::main]
async fn main() -> Result<()> {
    // Log to stderr only (stdout is for the protocol); every record is also
    // teed into the buffer the log_inspector memory target reads.
    let buffer = Arc::new(RecordBuffer::new());
    logging::init(buffer.clone());

    log::info!("Starting AppScope MCP server");

    let loaded = LoadedConfig::from_env()?;
    match &loaded.config_path {
        Some(path) => log::debug!("Configuration loaded from {}", path.display()),
        None => log::debug!("No configuration file found, serving defaults"),
    }

    let mut resources = ResourceRegistry::new();
    register_builtin_resources(&mut resources, &loaded);

    let host = build_host(loaded, buffer);
    let mut tools = ToolRegistry::new();
    register_builtin_tools(&mut tools, &host);
    log::debug!(
        "Registered {} tools and {} resources",
        tools.len(),
        resources.len()
    );

    let server = McpServer::new(tools, resources);
    LineTransport::stdio()
        .listen(|line| server.handle_line(line))
        .await?;

    log::info!("AppScope MCP server stopped");
    Ok(())
}
