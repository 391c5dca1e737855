//! Component registry introspection with property snapshots.

use std::sync::Arc;

use anyhow::{bail, Result};
use serde_json::{json, Map, Value};

use crate::host::{ComponentRegistry, PropertyValue};
use crate::registry::Tool;
use crate::sanitize::sanitize;

use super::non_empty_str;

pub struct ComponentInspectorTool {
    components: Arc<dyn ComponentRegistry>,
}

impl ComponentInspectorTool {
    pub fn new(components: Arc<dyn ComponentRegistry>) -> Self {
        Self { components }
    }

    fn details(&self, id: &str, include_config: bool) -> Result<Value> {
        if !self.components.has(id) {
            bail!("Component '{id}' not found");
        }
        let handle = self.components.describe(id)?;

        let mut details = Map::new();
        details.insert("id".into(), json!(id));
        details.insert("class".into(), json!(handle.class));
        details.insert("is_loaded".into(), json!(handle.is_loaded));
        if include_config && handle.definition.is_object() {
            details.insert("config".into(), sanitize(&handle.definition));
        }
        if let Some(properties) = handle.properties {
            let rendered: Map<String, Value> = properties
                .into_iter()
                .map(|(name, value)| (name, render_property(value)))
                .collect();
            details.insert("properties".into(), Value::Object(rendered));
        }
        Ok(Value::Object(details))
    }

    fn list(&self, include_config: bool) -> Value {
        let mut components = Map::new();
        for id in self.components.component_ids() {
            let entry = match self.details(&id, include_config) {
                Ok(details) => details,
                Err(e) => {
                    log::warn!("Error getting details for component '{id}': {e}");
                    json!({ "id": id, "error": e.to_string() })
                }
            };
            components.insert(id, entry);
        }
        json!({ "components": components })
    }
}

fn render_property(value: PropertyValue) -> Value {
    match value {
        PropertyValue::Scalar(v) => v,
        PropertyValue::Object(class) => Value::String(class),
        PropertyValue::Array(len) => Value::String(format!("[array with {len} items]")),
        PropertyValue::Unreadable => Value::String("[unable to read]".into()),
    }
}

impl Tool for ComponentInspectorTool {
    fn name(&self) -> &str {
        "component_inspector"
    }

    fn description(&self) -> &str {
        "Inspect application components including their classes, configurations, and properties"
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "component": {
                    "type": "string",
                    "description": "Specific component to inspect (optional)",
                },
                "include_config": {
                    "type": "boolean",
                    "description": "Include full configuration (default: true)",
                },
            },
        })
    }

    fn execute(&self, args: &Value) -> Result<Value> {
        let include_config = args
            .get("include_config")
            .and_then(Value::as_bool)
            .unwrap_or(true);

        if let Some(component) = non_empty_str(args, "component") {
            return self.details(component, include_config);
        }
        Ok(self.list(include_config))
    }
}
