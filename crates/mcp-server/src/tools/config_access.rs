//! Sanitized views over component, module, and parameter configuration.

use std::sync::Arc;

use anyhow::{bail, Result};
use serde_json::{json, Map, Value};

use crate::host::{AppFacts, ComponentRegistry};
use crate::registry::Tool;
use crate::sanitize::sanitize;

use super::{include_list, non_empty_str, wants};

pub struct ConfigAccessTool {
    app: Arc<dyn AppFacts>,
    components: Arc<dyn ComponentRegistry>,
}

impl ConfigAccessTool {
    pub fn new(app: Arc<dyn AppFacts>, components: Arc<dyn ComponentRegistry>) -> Self {
        Self { app, components }
    }

    fn component_config(&self, id: &str) -> Result<Value> {
        if !self.components.has(id) {
            bail!("Component '{id}' not found");
        }
        let handle = self.components.describe(id)?;
        Ok(json!({
            "id": id,
            "class": handle.class,
            "config": sanitize(&handle.definition),
            "is_singleton": handle.is_singleton,
        }))
    }

    fn components_config(&self) -> Result<Value> {
        let mut components = Map::new();
        for id in self.components.component_ids() {
            let config = self.component_config(&id)?;
            components.insert(id, config);
        }
        Ok(Value::Object(components))
    }

    fn modules_config(&self) -> Value {
        let modules: Map<String, Value> = self
            .app
            .modules()
            .into_iter()
            .map(|m| {
                (
                    m.id.clone(),
                    json!({
                        "id": m.id,
                        "class": m.class,
                        "basePath": m.base_path,
                        "layout": m.layout,
                    }),
                )
            })
            .collect();
        Value::Object(modules)
    }
}

impl Tool for ConfigAccessTool {
    fn name(&self) -> &str {
        "config_access"
    }

    fn description(&self) -> &str {
        "Access application configuration including components, modules, and parameters (with sensitive data redaction)"
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "component": {
                    "type": "string",
                    "description": "Specific component to retrieve (optional)",
                },
                "key": {
                    "type": "string",
                    "description": "Specific config key to retrieve (optional)",
                },
                "include": {
                    "type": "array",
                    "items": { "type": "string" },
                    "description": "What to include: components, modules, params, all",
                },
            },
        })
    }

    fn execute(&self, args: &Value) -> Result<Value> {
        let include = include_list(args, &["components", "modules", "params"]);

        let result = if let Some(component) = non_empty_str(args, "component") {
            self.component_config(component)?
        } else {
            let mut sections = Map::new();
            if wants(&include, "components") {
                sections.insert("components".into(), self.components_config()?);
            }
            if wants(&include, "modules") {
                sections.insert("modules".into(), self.modules_config());
            }
            if wants(&include, "params") {
                sections.insert("params".into(), sanitize(&self.app.params()));
            }
            Value::Object(sections)
        };

        // The key filter narrows whatever was selected above, including the
        // single-component shape.
        if let Some(key) = non_empty_str(args, "key") {
            if let Some(selected) = result.get(key) {
                return Ok(selected.clone());
            }
        }
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    use crate::host::{ComponentHandle, ModuleInfo, PackageInfo};

    struct FakeApp;

    impl AppFacts for FakeApp {
        fn framework_version(&self) -> String {
            "3.1.0".into()
        }

        fn language_version(&self) -> String {
            "1.82.0".into()
        }

        fn interface(&self) -> String {
            "console".into()
        }

        fn environment(&self) -> String {
            "test".into()
        }

        fn debug(&self) -> bool {
            false
        }

        fn base_path(&self) -> String {
            "/srv/app".into()
        }

        fn runtime_path(&self) -> String {
            "/srv/app/runtime".into()
        }

        fn web_path(&self) -> Option<String> {
            None
        }

        fn modules(&self) -> Vec<ModuleInfo> {
            vec![ModuleInfo {
                id: "api".into(),
                class: "app\\modules\\api\\Module".into(),
                base_path: "/srv/app/modules/api".into(),
                layout: None,
            }]
        }

        fn params(&self) -> Value {
            json!({ "adminEmail": "admin@example.com", "apiToken": "t0ps3cret" })
        }

        fn installed_packages(&self) -> Result<Vec<PackageInfo>> {
            Ok(Vec::new())
        }

        fn framework_prefix(&self) -> String {
            "appscope/".into()
        }
    }

    struct FakeComponents;

    impl ComponentRegistry for FakeComponents {
        fn component_ids(&self) -> Vec<String> {
            vec!["db".into()]
        }

        fn has(&self, id: &str) -> bool {
            id == "db"
        }

        fn describe(&self, id: &str) -> Result<ComponentHandle> {
            assert_eq!(id, "db");
            Ok(ComponentHandle {
                class: "app\\db\\Connection".into(),
                definition: json!({ "dsn": "sqlite::memory:", "password": "hunter2" }),
                is_singleton: true,
                is_loaded: true,
                properties: None,
            })
        }
    }

    fn tool() -> ConfigAccessTool {
        ConfigAccessTool::new(Arc::new(FakeApp), Arc::new(FakeComponents))
    }

    #[test]
    fn full_listing_sanitizes_params() {
        let result = tool().execute(&json!({})).unwrap();
        assert_eq!(result["params"]["adminEmail"], "admin@example.com");
        assert_eq!(result["params"]["apiToken"], "***REDACTED***");
        assert_eq!(result["modules"]["api"]["basePath"], "/srv/app/modules/api");
        assert_eq!(result["modules"]["api"]["layout"], Value::Null);
    }

    #[test]
    fn single_component_shape() {
        let result = tool().execute(&json!({ "component": "db" })).unwrap();
        assert_eq!(result["id"], "db");
        assert_eq!(result["class"], "app\\db\\Connection");
        assert_eq!(result["is_singleton"], true);
        assert_eq!(result["config"]["password"], "***REDACTED***");
        assert_eq!(result["config"]["dsn"], "sqlite::memory:");
    }

    #[test]
    fn unknown_component_is_an_error() {
        let err = tool()
            .execute(&json!({ "component": "mailer" }))
            .unwrap_err();
        assert_eq!(err.to_string(), "Component 'mailer' not found");
    }

    #[test]
    fn key_filter_narrows_result() {
        let result = tool().execute(&json!({ "key": "modules" })).unwrap();
        assert!(result.get("api").is_some());
        assert!(result.get("params").is_none());
    }

    #[test]
    fn key_filter_applies_to_component_shape() {
        let result = tool()
            .execute(&json!({ "component": "db", "key": "class" }))
            .unwrap();
        assert_eq!(result, json!("app\\db\\Connection"));
    }

    #[test]
    fn unmatched_key_returns_full_result() {
        let result = tool()
            .execute(&json!({ "include": ["params"], "key": "nope" }))
            .unwrap();
        assert!(result.get("params").is_some());
    }
}
