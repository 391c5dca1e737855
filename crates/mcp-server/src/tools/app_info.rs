//! Application identity: versions, environment, modules, extensions.

use std::sync::Arc;

use anyhow::Result;
use serde_json::{json, Map, Value};

use crate::host::AppFacts;
use crate::registry::Tool;

use super::{include_list, wants};

pub struct ApplicationInfoTool {
    app: Arc<dyn AppFacts>,
}

impl ApplicationInfoTool {
    pub fn new(app: Arc<dyn AppFacts>) -> Self {
        Self { app }
    }

    fn version_info(&self) -> Value {
        json!({
            "framework_version": self.app.framework_version(),
            "language_version": self.app.language_version(),
            "interface": self.app.interface(),
        })
    }

    fn environment_info(&self) -> Value {
        let mut info = Map::new();
        info.insert("environment".into(), json!(self.app.environment()));
        info.insert("debug".into(), json!(self.app.debug()));
        info.insert("base_path".into(), json!(self.app.base_path()));
        info.insert("runtime_path".into(), json!(self.app.runtime_path()));
        // Console applications have no web root; the key is absent, not null.
        if let Some(web_path) = self.app.web_path() {
            info.insert("web_path".into(), json!(web_path));
        }
        Value::Object(info)
    }

    fn modules_info(&self) -> Value {
        let modules: Map<String, Value> = self
            .app
            .modules()
            .into_iter()
            .map(|m| {
                (
                    m.id,
                    json!({ "class": m.class, "base_path": m.base_path }),
                )
            })
            .collect();
        Value::Object(modules)
    }

    /// Installed packages filtered to the framework's own namespace. A
    /// package listing failure degrades to an empty map.
    fn extensions_info(&self) -> Value {
        let prefix = self.app.framework_prefix();
        let packages = match self.app.installed_packages() {
            Ok(packages) => packages,
            Err(e) => {
                log::debug!("Package listing unavailable: {e}");
                return Value::Object(Map::new());
            }
        };
        let extensions: Map<String, Value> = packages
            .into_iter()
            .filter(|p| p.name.starts_with(&prefix))
            .map(|p| {
                (
                    p.name,
                    json!({ "version": p.version, "description": p.description }),
                )
            })
            .collect();
        Value::Object(extensions)
    }
}

impl Tool for ApplicationInfoTool {
    fn name(&self) -> &str {
        "application_info"
    }

    fn description(&self) -> &str {
        "Get comprehensive information about the application including version, environment, modules, and extensions"
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "include": {
                    "type": "array",
                    "items": { "type": "string" },
                    "description": "Specific info to include: version, environment, modules, extensions, all",
                },
            },
        })
    }

    fn execute(&self, args: &Value) -> Result<Value> {
        let include = include_list(args, &["version", "environment", "modules", "extensions"]);

        let mut result = Map::new();
        if wants(&include, "version") {
            result.insert("version".into(), self.version_info());
        }
        if wants(&include, "environment") {
            result.insert("environment".into(), self.environment_info());
        }
        if wants(&include, "modules") {
            result.insert("modules".into(), self.modules_info());
        }
        if wants(&include, "extensions") {
            result.insert("extensions".into(), self.extensions_info());
        }
        Ok(Value::Object(result))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use pretty_assertions::assert_eq;

    use crate::host::{ModuleInfo, PackageInfo};

    struct FakeApp {
        web: bool,
        packages_fail: bool,
    }

    impl AppFacts for FakeApp {
        fn framework_version(&self) -> String {
            "3.1.0".into()
        }

        fn language_version(&self) -> String {
            "1.82.0".into()
        }

        fn interface(&self) -> String {
            if self.web { "web".into() } else { "console".into() }
        }

        fn environment(&self) -> String {
            "dev".into()
        }

        fn debug(&self) -> bool {
            true
        }

        fn base_path(&self) -> String {
            "/srv/app".into()
        }

        fn runtime_path(&self) -> String {
            "/srv/app/runtime".into()
        }

        fn web_path(&self) -> Option<String> {
            self.web.then(|| "/srv/app/web".to_string())
        }

        fn modules(&self) -> Vec<ModuleInfo> {
            vec![ModuleInfo {
                id: "admin".into(),
                class: "app\\modules\\admin\\Module".into(),
                base_path: "/srv/app/modules/admin".into(),
                layout: Some("main".into()),
            }]
        }

        fn params(&self) -> Value {
            json!({})
        }

        fn installed_packages(&self) -> Result<Vec<PackageInfo>> {
            if self.packages_fail {
                return Err(anyhow!("installed.json missing"));
            }
            Ok(vec![
                PackageInfo {
                    name: "appscope/core".into(),
                    version: "3.1.0".into(),
                    description: "Core framework".into(),
                },
                PackageInfo {
                    name: "vendor/unrelated".into(),
                    version: "0.9".into(),
                    description: "Something else".into(),
                },
            ])
        }

        fn framework_prefix(&self) -> String {
            "appscope/".into()
        }
    }

    fn tool(web: bool, packages_fail: bool) -> ApplicationInfoTool {
        ApplicationInfoTool::new(Arc::new(FakeApp { web, packages_fail }))
    }

    #[test]
    fn default_includes_all_four_sections() {
        let result = tool(true, false).execute(&json!({})).unwrap();
        let keys: Vec<&String> = result.as_object().unwrap().keys().collect();
        assert_eq!(keys, vec!["environment", "extensions", "modules", "version"]);
        assert_eq!(result["version"]["framework_version"], "3.1.0");
        assert_eq!(result["environment"]["web_path"], "/srv/app/web");
        assert_eq!(
            result["modules"]["admin"]["class"],
            "app\\modules\\admin\\Module"
        );
    }

    #[test]
    fn include_selects_single_section() {
        let result = tool(true, false)
            .execute(&json!({ "include": ["version"] }))
            .unwrap();
        let object = result.as_object().unwrap();
        assert_eq!(object.len(), 1);
        assert!(object.contains_key("version"));
    }

    #[test]
    fn console_app_omits_web_path_key() {
        let result = tool(false, false)
            .execute(&json!({ "include": ["environment"] }))
            .unwrap();
        assert!(result["environment"].get("web_path").is_none());
        assert_eq!(result["environment"]["environment"], "dev");
    }

    #[test]
    fn extensions_filter_by_framework_prefix() {
        let result = tool(true, false)
            .execute(&json!({ "include": ["extensions"] }))
            .unwrap();
        let extensions = result["extensions"].as_object().unwrap();
        assert_eq!(extensions.len(), 1);
        assert_eq!(extensions["appscope/core"]["version"], "3.1.0");
    }

    #[test]
    fn package_listing_failure_yields_empty_extensions() {
        let result = tool(true, true)
            .execute(&json!({ "include": ["extensions"] }))
            .unwrap();
        assert_eq!(result["extensions"], json!({}));
    }
}
