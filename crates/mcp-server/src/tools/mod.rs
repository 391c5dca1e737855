//! Built-in introspection tools.
//!
//! Each tool is a thin façade over the host traits in [`crate::host`]: it
//! parses its arguments, queries the collaborators, shapes the result and
//! redacts anything sensitive. No tool touches the process environment or
//! global state.

mod app_info;
mod components;
mod config_access;
mod db_query;
mod db_schema;
mod guidelines;
mod log_inspector;
mod routes;

pub use app_info::ApplicationInfoTool;
pub use components::ComponentInspectorTool;
pub use config_access::ConfigAccessTool;
pub use db_query::DatabaseQueryTool;
pub use db_schema::DatabaseSchemaTool;
pub use guidelines::SearchGuidelinesTool;
pub use log_inspector::LogInspectorTool;
pub use routes::RouteInspectorTool;

use serde_json::Value;

use crate::host::Host;
use crate::registry::ToolRegistry;

/// Registers every built-in tool, in the order `tools/list` advertises them.
pub fn register_builtin_tools(registry: &mut ToolRegistry, host: &Host) {
    registry.register(Box::new(ApplicationInfoTool::new(host.app.clone())));
    registry.register(Box::new(DatabaseSchemaTool::new(host.database.clone())));
    registry.register(Box::new(ConfigAccessTool::new(
        host.app.clone(),
        host.components.clone(),
    )));
    registry.register(Box::new(RouteInspectorTool::new(host.routes.clone())));
    registry.register(Box::new(ComponentInspectorTool::new(host.components.clone())));
    registry.register(Box::new(LogInspectorTool::new(
        host.memory_log.clone(),
        host.file_log_path.clone(),
        host.log_table.clone(),
    )));
    registry.register(Box::new(SearchGuidelinesTool::new(host.guidelines.clone())));
    registry.register(Box::new(DatabaseQueryTool::new(host.database.clone())));
}

/// The `include` argument: explicit list, or the tool's default facets.
fn include_list(args: &Value, default: &[&str]) -> Vec<String> {
    match args.get("include").and_then(Value::as_array) {
        Some(items) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect(),
        None => default.iter().map(|s| s.to_string()).collect(),
    }
}

fn wants(include: &[String], section: &str) -> bool {
    include.iter().any(|item| item == section || item == "all")
}

/// String argument treated as absent when missing or empty.
fn non_empty_str<'a>(args: &'a Value, key: &str) -> Option<&'a str> {
    args.get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
}
