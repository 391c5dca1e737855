//! JSON-RPC dispatch.
//!
//! One instance owns the tool and resource registries and turns each decoded
//! call into exactly one response envelope. Every dispatch failure, including
//! unknown methods, tools and resources, is reported as `-32603` with the
//! cause under `error.data.message`; established clients match on that shape.

use serde_json::{json, Value};

use appscope_protocol::{
    decode_line, Call, CallToolResult, ContentBlock, Decoded, InitializeResult, Notification,
    ReadResourceResult, ResourceContents, ResourcesListResult, Response, RpcError,
    ServerCapabilities, ServerInfo, ToolsListResult, DEFAULT_PROTOCOL_VERSION,
};

use crate::registry::{ResourceRegistry, ToolRegistry};

/// Name reported in `serverInfo`.
pub const SERVER_NAME: &str = "AppScope";

/// Wire lines are logged truncated to this many characters.
const PREVIEW_CHARS: usize = 300;

pub struct McpServer {
    tools: ToolRegistry,
    resources: ResourceRegistry,
}

impl McpServer {
    pub fn new(tools: ToolRegistry, resources: ResourceRegistry) -> Self {
        Self { tools, resources }
    }

    /// Handles one wire line. Returns the response line, or an empty string
    /// when the input was a notification and must produce no output.
    pub fn handle_line(&self, line: &str) -> String {
        log::debug!("Received: {}", preview(line));

        match decode_line(line) {
            Decoded::Call(call) => {
                let line = self.handle_call(call).to_line();
                log::debug!("Response: {}", preview(&line));
                line
            }
            Decoded::Notification(notification) => {
                self.handle_notification(&notification);
                String::new()
            }
            Decoded::Invalid { id, error } => {
                log::debug!("Rejecting undecodable line: {error}");
                Response::failure(id, &error).to_line()
            }
        }
    }

    fn handle_call(&self, call: Call) -> Response {
        match self.dispatch(&call.method, &call.params) {
            Ok(result) => Response::success(call.id, result),
            Err(e) => {
                log::debug!("{} failed: {e}", call.method);
                Response::failure(Some(call.id), &RpcError::Internal(e.to_string()))
            }
        }
    }

    fn handle_notification(&self, notification: &Notification) {
        match notification.method.as_str() {
            "notifications/initialized" => log::debug!("Client initialized and ready"),
            "notifications/progress" => log::debug!("Client progress notification"),
            other => log::debug!("Unknown notification: {other}"),
        }
    }

    fn dispatch(&self, method: &str, params: &Value) -> anyhow::Result<Value> {
        match method {
            "initialize" => self.initialize(params),
            "tools/list" => self.list_tools(),
            "tools/call" => {
                let name = params
                    .get("name")
                    .and_then(Value::as_str)
                    .unwrap_or_default();
                let arguments = params
                    .get("arguments")
                    .cloned()
                    .unwrap_or_else(|| json!({}));
                self.call_tool(name, &arguments)
            }
            "resources/list" => self.list_resources(),
            "resources/read" => {
                let uri = params.get("uri").and_then(Value::as_str).unwrap_or_default();
                self.read_resource(uri)
            }
            _ => anyhow::bail!("Unknown method: {method}"),
        }
    }

    /// The client's protocol revision is echoed back when it sends one; an
    /// absent or empty revision falls back to the server default.
    fn initialize(&self, params: &Value) -> anyhow::Result<Value> {
        let protocol_version = match params.get("protocolVersion").and_then(Value::as_str) {
            Some(version) if !version.is_empty() => version.to_string(),
            _ => DEFAULT_PROTOCOL_VERSION.to_string(),
        };
        let result = InitializeResult {
            protocol_version,
            capabilities: ServerCapabilities::default(),
            server_info: ServerInfo {
                name: SERVER_NAME.to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
        };
        Ok(serde_json::to_value(result)?)
    }

    fn list_tools(&self) -> anyhow::Result<Value> {
        let result = ToolsListResult {
            tools: self.tools.descriptors(),
        };
        Ok(serde_json::to_value(result)?)
    }

    fn call_tool(&self, name: &str, arguments: &Value) -> anyhow::Result<Value> {
        let Some(tool) = self.tools.get(name) else {
            anyhow::bail!("Unknown tool: {name}");
        };
        log::debug!("Executing tool: {name}");
        let result = tool.execute(arguments)?;

        // String results go out verbatim; everything else as pretty JSON.
        let text = match result {
            Value::String(text) => text,
            other => serde_json::to_string_pretty(&other)?,
        };
        let wrapped = CallToolResult {
            content: vec![ContentBlock::Text { text }],
        };
        Ok(serde_json::to_value(wrapped)?)
    }

    fn list_resources(&self) -> anyhow::Result<Value> {
        let result = ResourcesListResult {
            resources: self.resources.descriptors(),
        };
        Ok(serde_json::to_value(result)?)
    }

    fn read_resource(&self, uri: &str) -> anyhow::Result<Value> {
        if uri.is_empty() {
            anyhow::bail!("Resource URI is required");
        }
        let Some(resource) = self.resources.get(uri) else {
            anyhow::bail!("Unknown resource: {uri}");
        };
        let content = resource.read()?;
        let wrapped = ReadResourceResult {
            contents: vec![ResourceContents {
                uri: uri.to_string(),
                mime_type: content.kind.mime_type().to_string(),
                text: content.text,
            }],
        };
        Ok(serde_json::to_value(wrapped)?)
    }
}

fn preview(line: &str) -> String {
    match line.char_indices().nth(PREVIEW_CHARS) {
        Some((idx, _)) => format!("{}...", &line[..idx]),
        None => line.to_string(),
    }
}
