//! URL rule and controller route enumeration.

use std::sync::Arc;

use anyhow::{bail, Result};
use serde_json::{json, Map, Value};

use crate::host::RouteTable;
use crate::registry::Tool;

use super::non_empty_str;

pub struct RouteInspectorTool {
    routes: Arc<dyn RouteTable>,
}

impl RouteInspectorTool {
    pub fn new(routes: Arc<dyn RouteTable>) -> Self {
        Self { routes }
    }

    fn url_rules(&self, include_patterns: bool) -> Result<Value> {
        let mut rules = Vec::new();
        for mut rule in self.routes.url_rules() {
            if include_patterns {
                rule.regex_pattern = rule.regex_pattern.filter(|p| !p.is_empty());
            } else {
                rule.regex_pattern = None;
            }
            rules.push(serde_json::to_value(rule)?);
        }
        Ok(Value::Array(rules))
    }

    fn module_routes(&self, module_id: &str) -> Result<Value> {
        let mut routes = Map::new();
        for controller in self.routes.controllers(module_id)? {
            let name = camel_to_kebab(
                controller
                    .strip_suffix("Controller")
                    .unwrap_or(&controller),
            );
            routes.insert(
                name.clone(),
                json!({
                    "controller": name,
                    "module": module_id,
                    "full_path": format!("{module_id}/{name}"),
                }),
            );
        }
        Ok(Value::Object(routes))
    }

    fn all_module_routes(&self) -> Result<Value> {
        let mut modules = Map::new();
        for id in self.routes.module_ids() {
            let routes = self.module_routes(&id)?;
            modules.insert(id, routes);
        }
        Ok(Value::Object(modules))
    }
}

/// CamelCase to kebab-case: a dash lands between a lowercase letter or
/// digit and the uppercase letter that follows it, so acronym runs stay
/// joined (`UserAPI` becomes `user-api`, `XMLFeed` becomes `xmlfeed`).
fn camel_to_kebab(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    let mut prev_lower_or_digit = false;
    for c in name.chars() {
        if c.is_ascii_uppercase() && prev_lower_or_digit {
            out.push('-');
        }
        prev_lower_or_digit = c.is_ascii_lowercase() || c.is_ascii_digit();
        out.push(c.to_ascii_lowercase());
    }
    out
}

impl Tool for RouteInspectorTool {
    fn name(&self) -> &str {
        "route_inspector"
    }

    fn description(&self) -> &str {
        "Inspect application routes and URL rules including module routes and REST endpoints"
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "module": {
                    "type": "string",
                    "description": "Specific module to inspect (optional)",
                },
                "include_patterns": {
                    "type": "boolean",
                    "description": "Include regex patterns in routes",
                },
            },
        })
    }

    fn execute(&self, args: &Value) -> Result<Value> {
        let include_patterns = args
            .get("include_patterns")
            .and_then(Value::as_bool)
            .unwrap_or(false);

        if let Some(module) = non_empty_str(args, "module") {
            if !self.routes.has_module(module) {
                bail!("Module '{module}' not found");
            }
            return Ok(json!({
                "module": module,
                "routes": self.module_routes(module)?,
            }));
        }

        Ok(json!({
            "url_rules": self.url_rules(include_patterns)?,
            "modules": self.all_module_routes()?,
        }))
    }
}
