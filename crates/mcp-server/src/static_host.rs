//! Config-backed host.
//!
//! The bundled binary has no live application to reflect over, so every host
//! trait is answered from the loaded [`ServerConfig`]: components, modules,
//! routes, packages and database tables are whatever the config declares.

use std::collections::BTreeMap;
use std::sync::Arc;

use anyhow::{anyhow, Result};
use serde::Deserialize;
use serde_json::Value;

use appscope_logs::{
    matches_query, LogEntry, LogLevel, LogQuery, LogRow, LogSource, LogTable, RecordBuffer,
};

use crate::config::{LoadedConfig, TableSpec};
use crate::host::{
    AppFacts, ComponentHandle, ComponentRegistry, DatabaseIntrospect, FsGuidelines, GuidelineStore,
    Host, IndexInfo, ModuleInfo, PackageInfo, PropertyValue, RouteTable, TableDescription, UrlRule,
};

pub struct StaticHost {
    loaded: LoadedConfig,
}

impl StaticHost {
    pub fn new(loaded: LoadedConfig) -> Self {
        Self { loaded }
    }

    fn table(&self, conn: &str, table: &str) -> Result<&TableSpec> {
        self.connection_tables(conn)?
            .get(table)
            .ok_or_else(|| anyhow!("Table '{table}' not found"))
    }

    fn connection_tables(&self, conn: &str) -> Result<&BTreeMap<String, TableSpec>> {
        self.loaded
            .config
            .database
            .connections
            .get(conn)
            .map(|c| &c.tables)
            .ok_or_else(|| anyhow!("Database connection '{conn}' not found"))
    }
}

impl AppFacts for StaticHost {
    fn framework_version(&self) -> String {
        self.loaded.config.app.framework_version.clone()
    }

    fn language_version(&self) -> String {
        self.loaded.config.app.language_version.clone()
    }

    fn interface(&self) -> String {
        self.loaded.config.app.interface.clone()
    }

    fn environment(&self) -> String {
        self.loaded.config.app.environment.clone()
    }

    fn debug(&self) -> bool {
        self.loaded.config.app.debug
    }

    fn base_path(&self) -> String {
        match &self.loaded.config.app.base_path {
            Some(path) => path.clone(),
            None => self.loaded.base_path.display().to_string(),
        }
    }

    fn runtime_path(&self) -> String {
        match &self.loaded.config.app.runtime_path {
            Some(path) => path.clone(),
            None => self.loaded.base_path.join("runtime").display().to_string(),
        }
    }

    fn web_path(&self) -> Option<String> {
        self.loaded.config.app.web_path.clone()
    }

    fn modules(&self) -> Vec<ModuleInfo> {
        self.loaded
            .config
            .modules
            .iter()
            .map(|(id, spec)| ModuleInfo {
                id: id.clone(),
                class: spec.class.clone(),
                base_path: spec.base_path.clone(),
                layout: spec.layout.clone(),
            })
            .collect()
    }

    fn params(&self) -> Value {
        let params = self.loaded.config.params.clone();
        serde_json::to_value(params).unwrap_or_else(|_| Value::Object(serde_json::Map::new()))
    }

    fn installed_packages(&self) -> Result<Vec<PackageInfo>> {
        Ok(self
            .loaded
            .config
            .packages
            .iter()
            .map(|p| PackageInfo {
                name: p.name.clone(),
                version: p.version.clone(),
                description: p.description.clone(),
            })
            .collect())
    }

    fn framework_prefix(&self) -> String {
        self.loaded.config.app.framework_prefix.clone()
    }
}

impl ComponentRegistry for StaticHost {
    fn component_ids(&self) -> Vec<String> {
        self.loaded.config.components.keys().cloned().collect()
    }

    fn has(&self, id: &str) -> bool {
        self.loaded.config.components.contains_key(id)
    }

    fn describe(&self, id: &str) -> Result<ComponentHandle> {
        let spec = self
            .loaded
            .config
            .components
            .get(id)
            .ok_or_else(|| anyhow!("Component '{id}' not found"))?;
        let properties = spec.loaded.then(|| {
            spec.properties
                .iter()
                .map(|(name, value)| (name.clone(), property_value(value)))
                .collect()
        });
        Ok(ComponentHandle {
            class: spec.class.clone(),
            definition: spec.config.clone(),
            is_singleton: spec.singleton,
            is_loaded: spec.loaded,
            properties,
        })
    }
}

/// Maps a configured property value onto the inspection shape. A table with a
/// string `class` member stands for an object; any other table counts as an
/// associative array.
fn property_value(value: &Value) -> PropertyValue {
    match value {
        Value::Object(map) => match map.get("class").and_then(Value::as_str) {
            Some(class) => PropertyValue::Object(class.to_string()),
            None => PropertyValue::Array(map.len()),
        },
        Value::Array(items) => PropertyValue::Array(items.len()),
        other => PropertyValue::Scalar(other.clone()),
    }
}

impl DatabaseIntrospect for StaticHost {
    fn has_connection(&self, name: &str) -> bool {
        self.loaded.config.database.connections.contains_key(name)
    }

    fn table_names(&self, conn: &str) -> Result<Vec<String>> {
        Ok(self.connection_tables(conn)?.keys().cloned().collect())
    }

    fn row_count(&self, conn: &str, table: &str) -> Result<u64> {
        let spec = self.table(conn, table)?;
        Ok(spec.row_count.unwrap_or(spec.rows.len() as u64))
    }

    fn table_schema(&self, conn: &str, table: &str) -> Result<Option<TableDescription>> {
        let Some(spec) = self.connection_tables(conn)?.get(table) else {
            return Ok(None);
        };
        Ok(Some(TableDescription {
            columns: spec.columns.clone(),
            primary_key: spec.primary_key.clone(),
            foreign_keys: spec.foreign_keys.clone(),
        }))
    }

    fn table_indexes(&self, conn: &str, table: &str) -> Result<Vec<IndexInfo>> {
        Ok(self.table(conn, table)?.indexes.clone())
    }

    fn model_classes(&self) -> Result<Vec<String>> {
        Ok(self.loaded.config.database.models.clone())
    }

    fn query(&self, conn: &str, sql: &str, _params: &Value) -> Result<Vec<Value>> {
        let tables = self.connection_tables(conn)?;
        let (table, limit) = parse_select(sql).ok_or_else(|| {
            anyhow!("Unsupported query; the config-backed host only executes SELECT * FROM <table> [LIMIT n]")
        })?;
        let spec = tables
            .get(&table)
            .ok_or_else(|| anyhow!("Table '{table}' not found"))?;
        let rows = match limit {
            Some(n) => spec.rows.iter().take(n).cloned().collect(),
            None => spec.rows.clone(),
        };
        Ok(rows)
    }
}

/// Accepts `SELECT * FROM <table> [LIMIT n]`, case-insensitive keywords,
/// optional trailing semicolon.
fn parse_select(sql: &str) -> Option<(String, Option<usize>)> {
    let trimmed = sql.trim().trim_end_matches(';');
    let mut words = trimmed.split_whitespace();
    if !words.next()?.eq_ignore_ascii_case("select") {
        return None;
    }
    if words.next()? != "*" {
        return None;
    }
    if !words.next()?.eq_ignore_ascii_case("from") {
        return None;
    }
    let table = words.next()?.to_string();
    match words.next() {
        None => Some((table, None)),
        Some(word) if word.eq_ignore_ascii_case("limit") => {
            let n: usize = words.next()?.parse().ok()?;
            match words.next() {
                None => Some((table, Some(n))),
                Some(_) => None,
            }
        }
        Some(_) => None,
    }
}

impl RouteTable for StaticHost {
    fn url_rules(&self) -> Vec<UrlRule> {
        self.loaded.config.url_rules.clone()
    }

    fn module_ids(&self) -> Vec<String> {
        self.loaded.config.modules.keys().cloned().collect()
    }

    fn has_module(&self, id: &str) -> bool {
        self.loaded.config.modules.contains_key(id)
    }

    fn controllers(&self, module: &str) -> Result<Vec<String>> {
        self.loaded
            .config
            .modules
            .get(module)
            .map(|spec| spec.controllers.clone())
            .ok_or_else(|| anyhow!("Module '{module}' not found"))
    }
}

/// Log-table rows as they appear in config.
#[derive(Debug, Deserialize)]
struct LogRowSpec {
    level: LogLevel,
    log_time: f64,
    category: String,
    #[serde(default)]
    prefix: Option<String>,
    message: String,
}

/// In-memory stand-in for a database log table, fed from config rows.
/// Implements the gateway contract: filters, orders newest first, paginates.
pub struct StaticLogTable {
    rows: Vec<LogRow>,
}

impl StaticLogTable {
    pub fn from_rows(rows: &[Value]) -> Self {
        let rows = rows
            .iter()
            .filter_map(|row| match serde_json::from_value::<LogRowSpec>(row.clone()) {
                Ok(spec) => Some(LogRow {
                    level: spec.level,
                    timestamp: spec.log_time,
                    category: spec.category,
                    prefix: spec.prefix,
                    message: spec.message,
                }),
                Err(e) => {
                    log::warn!("Skipping malformed log table row: {e}");
                    None
                }
            })
            .collect();
        Self { rows }
    }

    fn matching(&self, query: &LogQuery) -> Vec<LogRow> {
        let mut rows: Vec<LogRow> = self
            .rows
            .iter()
            .filter(|row| {
                let mut entry = LogEntry::new(
                    row.level,
                    row.timestamp,
                    row.category.clone(),
                    row.message.clone(),
                    LogSource::Db,
                );
                entry.prefix = row.prefix.clone();
                matches_query(&entry, query)
            })
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.timestamp.total_cmp(&a.timestamp));
        rows
    }
}

impl LogTable for StaticLogTable {
    fn count(&self, query: &LogQuery) -> appscope_logs::Result<u64> {
        Ok(self.matching(query).len() as u64)
    }

    fn select(&self, query: &LogQuery) -> appscope_logs::Result<Vec<LogRow>> {
        Ok(self
            .matching(query)
            .into_iter()
            .skip(query.offset)
            .take(query.limit)
            .collect())
    }
}

/// Wires the full host bundle from config: trait objects, guideline store,
/// log targets.
pub fn build_host(loaded: LoadedConfig, memory_log: Arc<RecordBuffer>) -> Host {
    let guidelines: Arc<dyn GuidelineStore> = Arc::new(FsGuidelines::new(loaded.guidelines_dir()));
    let file_log_path = loaded.file_log_path();
    let log_table = loaded.config.database.log_table.as_ref().and_then(|name| {
        let rows = loaded
            .config
            .database
            .connections
            .get("db")
            .and_then(|conn| conn.tables.get(name))
            .map(|table| table.rows.as_slice());
        match rows {
            Some(rows) => {
                let table: Arc<dyn LogTable> = Arc::new(StaticLogTable::from_rows(rows));
                Some(table)
            }
            None => {
                log::warn!("Configured log table '{name}' has no backing table on 'db'");
                None
            }
        }
    });

    let host = Arc::new(StaticHost::new(loaded));
    Host {
        app: host.clone(),
        components: host.clone(),
        database: host.clone(),
        routes: host,
        guidelines,
        memory_log,
        file_log_path,
        log_table,
    }
}
