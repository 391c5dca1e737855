//! Raw SQL execution with a row cap and redacted output.

use std::sync::Arc;
use std::time::Instant;

use anyhow::{bail, Result};
use regex::Regex;
use serde_json::{json, Value};

use crate::host::DatabaseIntrospect;
use crate::registry::Tool;
use crate::sanitize::sanitize;

const DEFAULT_LIMIT: i64 = 100;
const MAX_LIMIT: i64 = 1000;

static SELECT_RE: once_cell::sync::Lazy<Regex> =
    once_cell::sync::Lazy::new(|| Regex::new(r"(?i)^\s*SELECT\s").expect("valid regex"));
static HAS_LIMIT_RE: once_cell::sync::Lazy<Regex> =
    once_cell::sync::Lazy::new(|| Regex::new(r"(?i)\sLIMIT\s+\d+").expect("valid regex"));

pub struct DatabaseQueryTool {
    database: Arc<dyn DatabaseIntrospect>,
}

impl DatabaseQueryTool {
    pub fn new(database: Arc<dyn DatabaseIntrospect>) -> Self {
        Self { database }
    }
}

/// Appends `LIMIT <n>` to SELECT statements that do not carry one. Other
/// statements pass through trimmed.
fn ensure_limit(sql: &str, limit: u64) -> String {
    let trimmed = sql.trim();
    if SELECT_RE.is_match(trimmed) && !HAS_LIMIT_RE.is_match(trimmed) {
        let without_semicolon = trimmed.trim_end_matches(';');
        return format!("{without_semicolon} LIMIT {limit}");
    }
    trimmed.to_string()
}

impl Tool for DatabaseQueryTool {
    fn name(&self) -> &str {
        "database_query"
    }

    fn description(&self) -> &str {
        "Execute SQL queries against the database and return results"
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "sql": {
                    "type": "string",
                    "description": "SQL query to execute",
                },
                "params": {
                    "type": "object",
                    "description": "Bound parameters for the query (e.g., {\":id\": 1})",
                    "additionalProperties": true,
                },
                "db": {
                    "type": "string",
                    "description": "Database connection name (default: db)",
                },
                "limit": {
                    "type": "integer",
                    "description": "Maximum rows to return (default: 100, max: 1000)",
                },
            },
            "required": ["sql"],
        })
    }

    fn execute(&self, args: &Value) -> Result<Value> {
        let sql = args.get("sql").and_then(Value::as_str).unwrap_or_default();
        let params = args.get("params").cloned().unwrap_or_else(|| json!({}));
        let conn = args
            .get("db")
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .unwrap_or("db");
        let limit = args
            .get("limit")
            .and_then(Value::as_i64)
            .unwrap_or(DEFAULT_LIMIT)
            .clamp(1, MAX_LIMIT) as u64;

        if sql.trim().is_empty() {
            bail!("SQL query cannot be empty");
        }
        if !self.database.has_connection(conn) {
            bail!("Database connection '{conn}' not found");
        }

        let sql = ensure_limit(sql, limit);

        let start = Instant::now();
        match self.database.query(conn, &sql, &params) {
            Ok(rows) => {
                let duration_ms =
                    (start.elapsed().as_secs_f64() * 1000.0 * 100.0).round() / 100.0;
                let mut result = json!({
                    "success": true,
                    "row_count": rows.len(),
                    "duration_ms": duration_ms,
                    "rows": sanitize(&Value::Array(rows.clone())),
                });
                if rows.len() as u64 == limit {
                    result["warning"] = json!(format!(
                        "Results may be truncated at {limit} rows. Use 'limit' parameter to increase."
                    ));
                }
                Ok(result)
            }
            Err(e) => Ok(json!({
                "success": false,
                "error": e.to_string(),
                "sql": sql,
            })),
        }
    }
}
