//! Database structure introspection: tables, columns, indexes, models.

use std::sync::Arc;

use anyhow::{bail, Result};
use serde_json::{json, Map, Value};

use crate::host::DatabaseIntrospect;
use crate::registry::Tool;

use super::{include_list, non_empty_str};

pub struct DatabaseSchemaTool {
    database: Arc<dyn DatabaseIntrospect>,
}

impl DatabaseSchemaTool {
    pub fn new(database: Arc<dyn DatabaseIntrospect>) -> Self {
        Self { database }
    }

    /// Row counts per table; a table whose count fails is reported with an
    /// error entry instead of aborting the listing.
    fn tables(&self, conn: &str, table: Option<&str>) -> Result<Value> {
        let names = match table {
            Some(name) => vec![name.to_string()],
            None => self.database.table_names(conn)?,
        };

        let mut tables = Map::new();
        for name in names {
            let entry = match self.database.row_count(conn, &name) {
                Ok(count) => json!({ "name": name, "row_count": count }),
                Err(e) => json!({ "name": name, "error": e.to_string() }),
            };
            tables.insert(name, entry);
        }
        Ok(Value::Object(tables))
    }

    fn table_schema(&self, conn: &str, table: &str) -> Result<Value> {
        let Some(description) = self.database.table_schema(conn, table)? else {
            bail!("Table '{table}' not found");
        };

        let mut columns = Map::new();
        for column in &description.columns {
            columns.insert(column.name.clone(), serde_json::to_value(column)?);
        }

        let mut result = Map::new();
        result.insert("table".into(), json!(table));
        result.insert("columns".into(), Value::Object(columns));
        result.insert("primary_key".into(), json!(description.primary_key));
        if !description.foreign_keys.is_empty() {
            result.insert(
                "foreign_keys".into(),
                serde_json::to_value(&description.foreign_keys)?,
            );
        }
        Ok(Value::Object(result))
    }

    fn table_indexes(&self, conn: &str, table: &str) -> Value {
        match self.database.table_indexes(conn, table) {
            Ok(indexes) => json!({ "table": table, "indexes": indexes }),
            Err(e) => json!({ "table": table, "error": e.to_string() }),
        }
    }
}

impl Tool for DatabaseSchemaTool {
    fn name(&self) -> &str {
        "database_schema"
    }

    fn description(&self) -> &str {
        "Inspect database schema including tables, columns, indexes, and model classes"
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "db": {
                    "type": "string",
                    "description": "Database connection name (default: db)",
                },
                "table": {
                    "type": "string",
                    "description": "Specific table to inspect (optional)",
                },
                "include": {
                    "type": "array",
                    "items": { "type": "string" },
                    "description": "What to include: tables, schema, indexes, models",
                },
            },
        })
    }

    fn execute(&self, args: &Value) -> Result<Value> {
        let conn = non_empty_str(args, "db").unwrap_or("db");
        let table = non_empty_str(args, "table");

        let mut include = include_list(args, &["tables", "schema"]);
        if include.iter().any(|item| item == "all") {
            include = ["tables", "schema", "indexes", "models"]
                .iter()
                .map(|s| s.to_string())
                .collect();
        }
        let selected = |section: &str| include.iter().any(|item| item == section);

        if !self.database.has_connection(conn) {
            bail!("Database connection '{conn}' not found");
        }

        let mut result = Map::new();
        if selected("tables") {
            result.insert("tables".into(), self.tables(conn, table)?);
        }
        if selected("schema") {
            if let Some(table) = table {
                result.insert("schema".into(), self.table_schema(conn, table)?);
            }
        }
        if selected("indexes") {
            let indexes = match table {
                Some(table) => self.table_indexes(conn, table),
                None => json!("Please specify a table name"),
            };
            result.insert("indexes".into(), indexes);
        }
        if selected("models") {
            result.insert("models".into(), json!(self.database.model_classes()?));
        }
        Ok(Value::Object(result))
    }
}
