//! Server configuration.
//!
//! The binary describes the host application in a TOML file: static facts,
//! components, modules, routing rules, packages, and the log targets. A
//! missing file is not an error (the server answers with an empty host); a
//! malformed one is a startup failure.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_json::Value;

use crate::error::{Result, ServerError};
use crate::host::{ColumnDescription, ForeignKeyInfo, IndexInfo, UrlRule};

/// Overrides the config file location.
pub const CONFIG_ENV: &str = "APPSCOPE_CONFIG";
/// Overrides the application base path.
pub const BASE_PATH_ENV: &str = "APPSCOPE_BASE_PATH";
/// Default config file name, looked up under the base path.
pub const CONFIG_FILE: &str = "appscope.toml";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ServerConfig {
    #[serde(default)]
    pub app: AppSection,
    #[serde(default)]
    pub paths: PathsSection,
    #[serde(default)]
    pub params: BTreeMap<String, Value>,
    #[serde(default)]
    pub components: BTreeMap<String, ComponentSpec>,
    #[serde(default)]
    pub modules: BTreeMap<String, ModuleSpec>,
    #[serde(default)]
    pub url_rules: Vec<UrlRule>,
    #[serde(default)]
    pub packages: Vec<PackageSpec>,
    #[serde(default)]
    pub database: DatabaseSection,
}

/// Static facts about the application being inspected.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppSection {
    pub framework_version: String,
    pub language_version: String,
    pub interface: String,
    pub environment: String,
    pub debug: bool,
    pub base_path: Option<String>,
    pub runtime_path: Option<String>,
    pub web_path: Option<String>,
    /// Package-name prefix that marks framework extensions.
    pub framework_prefix: String,
}

impl Default for AppSection {
    fn default() -> Self {
        Self {
            framework_version: "unknown".into(),
            language_version: "unknown".into(),
            interface: "console".into(),
            environment: "production".into(),
            debug: false,
            base_path: None,
            runtime_path: None,
            web_path: None,
            framework_prefix: "appscope/".into(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PathsSection {
    /// Guideline document directory, relative to the base path by default.
    pub guidelines: Option<String>,
    /// File log target path; unset means the target is not configured.
    pub file_log: Option<String>,
}

/// One entry of the application's component container.
#[derive(Debug, Clone, Deserialize)]
pub struct ComponentSpec {
    pub class: String,
    #[serde(default = "default_true")]
    pub singleton: bool,
    #[serde(default)]
    pub loaded: bool,
    /// Registration-time definition, as handed to the container.
    #[serde(default = "empty_object")]
    pub config: Value,
    /// Current property values, reported only for loaded components.
    #[serde(default)]
    pub properties: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ModuleSpec {
    pub class: String,
    #[serde(default)]
    pub base_path: String,
    #[serde(default)]
    pub layout: Option<String>,
    /// Controller class names mounted under this module.
    #[serde(default)]
    pub controllers: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PackageSpec {
    pub name: String,
    #[serde(default = "unknown_version")]
    pub version: String,
    #[serde(default)]
    pub description: String,
}

fn unknown_version() -> String {
    "unknown".to_string()
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DatabaseSection {
    pub connections: BTreeMap<String, ConnectionSpec>,
    /// Model class names reported by the schema tool.
    pub models: Vec<String>,
    /// Table (on the `db` connection) backing the database log target.
    pub log_table: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ConnectionSpec {
    pub tables: BTreeMap<String, TableSpec>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TableSpec {
    pub columns: Vec<ColumnDescription>,
    pub primary_key: Vec<String>,
    pub foreign_keys: Vec<ForeignKeyInfo>,
    pub indexes: Vec<IndexInfo>,
    /// Row objects, queried verbatim.
    pub rows: Vec<Value>,
    /// Reported row count; defaults to the number of configured rows.
    pub row_count: Option<u64>,
}

fn default_true() -> bool {
    true
}

fn empty_object() -> Value {
    Value::Object(serde_json::Map::new())
}

/// A parsed config together with where it came from.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub base_path: PathBuf,
    /// `None` when no config file was found and defaults apply.
    pub config_path: Option<PathBuf>,
    pub config: ServerConfig,
}

impl LoadedConfig {
    /// Resolves config from `APPSCOPE_CONFIG` / `APPSCOPE_BASE_PATH`.
    pub fn from_env() -> Result<Self> {
        let base_path = std::env::var(BASE_PATH_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("."));
        let explicit = std::env::var(CONFIG_ENV).ok().map(PathBuf::from);
        Self::load(base_path, explicit)
    }

    /// Loads config from `explicit` when given, otherwise from
    /// `<base>/appscope.toml`. An explicit path must exist; the default
    /// location may be absent.
    pub fn load(base_path: PathBuf, explicit: Option<PathBuf>) -> Result<Self> {
        let (path, required) = match explicit {
            Some(path) => (path, true),
            None => (base_path.join(CONFIG_FILE), false),
        };
        if !required && !path.is_file() {
            return Ok(Self {
                base_path,
                config_path: None,
                config: ServerConfig::default(),
            });
        }
        let raw = std::fs::read_to_string(&path).map_err(|source| ServerError::ConfigRead {
            path: path.clone(),
            source,
        })?;
        let config = toml::from_str(&raw).map_err(|source| ServerError::ConfigParse {
            path: path.clone(),
            source,
        })?;
        Ok(Self {
            base_path,
            config_path: Some(path),
            config,
        })
    }

    /// Directory holding guideline documents.
    pub fn guidelines_dir(&self) -> PathBuf {
        match &self.config.paths.guidelines {
            Some(dir) => self.resolve(dir),
            None => self.base_path.join("guidelines"),
        }
    }

    /// The project-level guideline file served as a resource.
    pub fn guidelines_file(&self) -> PathBuf {
        self.base_path.join("GUIDELINES.md")
    }

    /// Configured file log target path, if any.
    pub fn file_log_path(&self) -> Option<PathBuf> {
        self.config.paths.file_log.as_deref().map(|p| self.resolve(p))
    }

    fn resolve(&self, path: &str) -> PathBuf {
        let path = Path::new(path);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_path.join(path)
        }
    }
}
