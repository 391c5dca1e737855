//! Host application surface.
//!
//! Every tool reads application state through the traits in this module
//! rather than touching the process environment directly. The server binary
//! wires in config-backed implementations ([`crate::static_host`]); tests
//! substitute small fakes.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use appscope_logs::{LogTable, MemoryLogStore};

/// A module mounted into the application.
#[derive(Debug, Clone, PartialEq)]
pub struct ModuleInfo {
    pub id: String,
    pub class: String,
    pub base_path: String,
    pub layout: Option<String>,
}

/// An installed package reported by the host.
#[derive(Debug, Clone, PartialEq)]
pub struct PackageInfo {
    pub name: String,
    pub version: String,
    pub description: String,
}

/// Static facts about the running application.
pub trait AppFacts: Send + Sync {
    fn framework_version(&self) -> String;
    fn language_version(&self) -> String;
    /// Interface the app is serving through, e.g. `web` or `console`.
    fn interface(&self) -> String;
    fn environment(&self) -> String;
    fn debug(&self) -> bool;
    fn base_path(&self) -> String;
    fn runtime_path(&self) -> String;
    /// Absent for console-only applications.
    fn web_path(&self) -> Option<String>;
    fn modules(&self) -> Vec<ModuleInfo>;
    /// Application parameters, unsanitized; callers redact before exposure.
    fn params(&self) -> Value;
    fn installed_packages(&self) -> Result<Vec<PackageInfo>>;
    /// Package-name prefix identifying framework extensions.
    fn framework_prefix(&self) -> String;
}

/// A property exposed by a live component.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    /// Plain scalar, reported verbatim.
    Scalar(Value),
    /// Object-typed property, reported by class name.
    Object(String),
    /// Array-typed property, reported by element count.
    Array(usize),
    /// Property that exists but cannot be read.
    Unreadable,
}

/// Everything the registry knows about one component.
#[derive(Debug, Clone)]
pub struct ComponentHandle {
    pub class: String,
    pub definition: Value,
    pub is_singleton: bool,
    pub is_loaded: bool,
    /// Present only when the component has been instantiated.
    pub properties: Option<BTreeMap<String, PropertyValue>>,
}

/// The application's component container.
pub trait ComponentRegistry: Send + Sync {
    fn component_ids(&self) -> Vec<String>;
    fn has(&self, id: &str) -> bool;
    fn describe(&self, id: &str) -> Result<ComponentHandle>;
}

/// One column of a database table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnDescription {
    pub name: String,
    #[serde(rename = "type", default)]
    pub type_name: String,
    #[serde(default)]
    pub db_type: String,
    #[serde(default)]
    pub value_type: String,
    #[serde(default)]
    pub size: Option<u32>,
    #[serde(default)]
    pub precision: Option<u32>,
    #[serde(default)]
    pub scale: Option<u32>,
    #[serde(default)]
    pub not_null: bool,
    #[serde(default)]
    pub default: Value,
    #[serde(default)]
    pub auto_increment: bool,
    #[serde(default)]
    pub comment: String,
}

/// A foreign key constraint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForeignKeyInfo {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub name: Option<String>,
    pub columns: Vec<String>,
    pub references: String,
    pub referenced_columns: Vec<String>,
}

/// Full schema of one table.
#[derive(Debug, Clone)]
pub struct TableDescription {
    pub columns: Vec<ColumnDescription>,
    pub primary_key: Vec<String>,
    pub foreign_keys: Vec<ForeignKeyInfo>,
}

/// One index on a table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexInfo {
    pub name: String,
    pub columns: Vec<String>,
    #[serde(default)]
    pub unique: bool,
    #[serde(default)]
    pub primary: bool,
}

/// Read-only access to the application's databases.
pub trait DatabaseIntrospect: Send + Sync {
    fn has_connection(&self, name: &str) -> bool;
    fn table_names(&self, conn: &str) -> Result<Vec<String>>;
    fn row_count(&self, conn: &str, table: &str) -> Result<u64>;
    /// `Ok(None)` when the table does not exist.
    fn table_schema(&self, conn: &str, table: &str) -> Result<Option<TableDescription>>;
    fn table_indexes(&self, conn: &str, table: &str) -> Result<Vec<IndexInfo>>;
    fn model_classes(&self) -> Result<Vec<String>>;
    fn query(&self, conn: &str, sql: &str, params: &Value) -> Result<Vec<Value>>;
}

/// One URL routing rule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UrlRule {
    pub pattern: String,
    pub route: String,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub verb: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub regex_pattern: Option<String>,
}

/// The application's routing table.
pub trait RouteTable: Send + Sync {
    fn url_rules(&self) -> Vec<UrlRule>;
    fn module_ids(&self) -> Vec<String>;
    fn has_module(&self, id: &str) -> bool;
    /// Controller class names mounted under a module, e.g. `UserController`.
    fn controllers(&self, module: &str) -> Result<Vec<String>>;
}

/// A guideline document on disk.
#[derive(Debug, Clone, PartialEq)]
pub struct GuidelineDoc {
    /// Path relative to the guideline root, always with `/` separators.
    pub path: String,
    pub content: String,
}

/// Project guideline documents.
pub trait GuidelineStore: Send + Sync {
    fn available(&self) -> bool;
    /// Where guidelines are expected to live, for error messages.
    fn location(&self) -> String;
    fn documents(&self) -> Result<Vec<GuidelineDoc>>;
}

/// Guidelines stored as markdown files under a directory tree.
pub struct FsGuidelines {
    root: PathBuf,
}

impl FsGuidelines {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl GuidelineStore for FsGuidelines {
    fn available(&self) -> bool {
        self.root.is_dir()
    }

    fn location(&self) -> String {
        self.root.display().to_string()
    }

    fn documents(&self) -> Result<Vec<GuidelineDoc>> {
        let mut docs = Vec::new();
        for entry in walkdir::WalkDir::new(&self.root)
            .follow_links(false)
            .sort_by_file_name()
        {
            let entry = entry.with_context(|| {
                format!("Failed to walk guidelines at {}", self.root.display())
            })?;
            if !entry.file_type().is_file() {
                continue;
            }
            if entry.path().extension().map_or(true, |ext| ext != "md") {
                continue;
            }
            let content = std::fs::read_to_string(entry.path())
                .with_context(|| format!("Failed to read {}", entry.path().display()))?;
            docs.push(GuidelineDoc {
                path: relative_slash_path(&self.root, entry.path()),
                content,
            });
        }
        Ok(docs)
    }
}

fn relative_slash_path(root: &Path, path: &Path) -> String {
    let rel = path.strip_prefix(root).unwrap_or(path);
    rel.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// Everything a tool may need from the host application, bundled for
/// registration time.
#[derive(Clone)]
pub struct Host {
    pub app: Arc<dyn AppFacts>,
    pub components: Arc<dyn ComponentRegistry>,
    pub database: Arc<dyn DatabaseIntrospect>,
    pub routes: Arc<dyn RouteTable>,
    pub guidelines: Arc<dyn GuidelineStore>,
    pub memory_log: Arc<dyn MemoryLogStore>,
    pub file_log_path: Option<PathBuf>,
    pub log_table: Option<Arc<dyn LogTable>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn fs_guidelines_lists_markdown_sorted() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("database")).unwrap();
        std::fs::write(dir.path().join("database/migrations.md"), "# Migrations\n").unwrap();
        std::fs::write(dir.path().join("intro.md"), "# Intro\n").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "not markdown").unwrap();

        let store = FsGuidelines::new(dir.path());
        assert!(store.available());
        let docs = store.documents().unwrap();
        let paths: Vec<&str> = docs.iter().map(|d| d.path.as_str()).collect();
        assert_eq!(paths, vec!["database/migrations.md", "intro.md"]);
    }

    #[test]
    fn fs_guidelines_missing_root() {
        let store = FsGuidelines::new("/nonexistent/guidelines");
        assert!(!store.available());
        assert_eq!(store.location(), "/nonexistent/guidelines");
    }

    #[test]
    fn url_rule_serialization_skips_empty() {
        let rule = UrlRule {
            pattern: "posts/<id>".into(),
            route: "post/view".into(),
            verb: vec![],
            regex_pattern: None,
        };
        let value = serde_json::to_value(&rule).unwrap();
        assert_eq!(
            value,
            serde_json::json!({"pattern": "posts/<id>", "route": "post/view"})
        );
    }
}
