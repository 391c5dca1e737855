//! Unified log access across the memory buffer, log file, and log table.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use serde_json::{json, Value};

use appscope_logs::{
    aggregate, DbLogReader, FileLogReader, LogLevel, LogQuery, LogReader, LogTable,
    MemoryLogReader, MemoryLogStore, TimeRange, MAX_LIMIT,
};

use crate::registry::Tool;
use crate::sanitize::sanitize;

pub struct LogInspectorTool {
    memory: MemoryLogReader,
    file: FileLogReader,
    db: DbLogReader,
}

impl LogInspectorTool {
    pub fn new(
        store: Arc<dyn MemoryLogStore>,
        file_log_path: Option<PathBuf>,
        log_table: Option<Arc<dyn LogTable>>,
    ) -> Self {
        Self {
            memory: MemoryLogReader::new(store),
            file: FileLogReader::new(file_log_path),
            db: DbLogReader::new(log_table),
        }
    }

    /// Readers in query order. An unrecognized target selects nothing,
    /// which yields an empty report rather than an error.
    fn readers(&self, target: &str) -> Vec<&dyn LogReader> {
        let mut readers: Vec<&dyn LogReader> = Vec::new();
        if target == "all" || target == "memory" {
            readers.push(&self.memory);
        }
        if target == "all" || target == "file" {
            readers.push(&self.file);
        }
        if target == "all" || target == "db" {
            readers.push(&self.db);
        }
        readers
    }
}

fn parse_query(args: &Value) -> LogQuery {
    let mut query = LogQuery::default();
    if let Some(levels) = args.get("levels").and_then(Value::as_array) {
        query.levels = levels
            .iter()
            .filter_map(Value::as_str)
            .filter_map(LogLevel::parse)
            .collect();
    }
    if let Some(categories) = args.get("categories").and_then(Value::as_array) {
        query.categories = categories
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect();
    }
    query.limit = args
        .get("limit")
        .and_then(Value::as_u64)
        .unwrap_or(100)
        .clamp(1, MAX_LIMIT as u64) as usize;
    query.offset = args.get("offset").and_then(Value::as_u64).unwrap_or(0) as usize;
    query.search = args
        .get("search")
        .and_then(Value::as_str)
        .map(str::to_string);
    if let Some(range) = args.get("time_range").and_then(Value::as_object) {
        query.time_range = Some(TimeRange {
            start: range.get("start").and_then(Value::as_f64),
            end: range.get("end").and_then(Value::as_f64),
        });
    }
    query.include_trace = args
        .get("include_trace")
        .and_then(Value::as_bool)
        .unwrap_or(false);
    query
}

impl Tool for LogInspectorTool {
    fn name(&self) -> &str {
        "log_inspector"
    }

    fn description(&self) -> &str {
        "Inspect application logs from all configured targets (file, database, memory) with filtering by level, category, time range, and keywords"
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "target": {
                    "type": "string",
                    "description": "Log source: all, file, db, memory (default: all)",
                    "enum": ["all", "file", "db", "memory"],
                },
                "levels": {
                    "type": "array",
                    "items": {
                        "type": "string",
                        "enum": ["error", "warning", "info", "trace", "profile"],
                    },
                    "description": "Log levels to include (default: error, warning)",
                },
                "categories": {
                    "type": "array",
                    "items": { "type": "string" },
                    "description": "Category patterns to match (supports wildcards like app\\db\\*). Default: all categories",
                },
                "limit": {
                    "type": "integer",
                    "description": "Maximum number of log entries to return (default: 100, max: 1000)",
                    "minimum": 1,
                    "maximum": 1000,
                },
                "offset": {
                    "type": "integer",
                    "description": "Number of entries to skip for pagination (default: 0)",
                    "minimum": 0,
                },
                "search": {
                    "type": "string",
                    "description": "Search for keyword in log messages (case-insensitive)",
                },
                "time_range": {
                    "type": "object",
                    "properties": {
                        "start": {
                            "type": "integer",
                            "description": "Start timestamp (Unix epoch)",
                        },
                        "end": {
                            "type": "integer",
                            "description": "End timestamp (Unix epoch)",
                        },
                    },
                    "description": "Filter logs within a time range",
                },
                "include_trace": {
                    "type": "boolean",
                    "description": "Include stack traces for in-memory logs (default: false)",
                },
            },
        })
    }

    fn execute(&self, args: &Value) -> Result<Value> {
        let target = args.get("target").and_then(Value::as_str).unwrap_or("all");
        let query = parse_query(args);
        let report = aggregate(&self.readers(target), &query);
        Ok(sanitize(&serde_json::to_value(report)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    use appscope_logs::{BufferedRecord, LogRow, RecordBuffer};

    struct FakeLogTable {
        rows: Vec<LogRow>,
    }

    impl LogTable for FakeLogTable {
        fn count(&self, _query: &LogQuery) -> appscope_logs::Result<u64> {
            Ok(self.rows.len() as u64)
        }

        fn select(&self, query: &LogQuery) -> appscope_logs::Result<Vec<LogRow>> {
            Ok(self.rows.iter().take(query.limit).cloned().collect())
        }
    }

    fn record(level: LogLevel, timestamp: f64, message: &str) -> BufferedRecord {
        BufferedRecord {
            message: json!(message),
            level,
            category: "application".into(),
            timestamp,
            trace: Vec::new(),
            memory_usage: Some(1024),
        }
    }

    fn seeded_buffer() -> Arc<RecordBuffer> {
        let buffer = Arc::new(RecordBuffer::new());
        buffer.push(record(LogLevel::Error, 100.0, "db connection refused"));
        buffer.push(record(LogLevel::Info, 150.0, "request served"));
        buffer.push(record(LogLevel::Warning, 200.0, "slow query"));
        buffer
    }

    fn memory_only_tool() -> LogInspectorTool {
        LogInspectorTool::new(seeded_buffer(), None, None)
    }

    #[test]
    fn default_query_filters_to_errors_and_warnings() {
        let result = memory_only_tool().execute(&json!({})).unwrap();
        let logs = result["logs"].as_array().unwrap();
        assert_eq!(logs.len(), 2);
        assert_eq!(logs[0]["message"], "slow query");
        assert_eq!(logs[1]["message"], "db connection refused");
        assert_eq!(result["summary"]["total_available"], 2);
        assert_eq!(result["targets_queried"], json!(["memory"]));
    }

    #[test]
    fn unconfigured_targets_become_warnings() {
        let result = memory_only_tool().execute(&json!({})).unwrap();
        let warnings = result["warnings"].as_array().unwrap();
        assert_eq!(warnings.len(), 2);
        assert!(warnings[0]
            .as_str()
            .unwrap()
            .starts_with("File logs not available"));
        assert!(warnings[1]
            .as_str()
            .unwrap()
            .starts_with("Db logs not available"));
    }

    #[test]
    fn merges_memory_and_db_sources_newest_first() {
        let table = FakeLogTable {
            rows: vec![LogRow {
                level: LogLevel::Error,
                timestamp: 175.0,
                category: "application".into(),
                prefix: None,
                message: "persisted failure".into(),
            }],
        };
        let tool = LogInspectorTool::new(seeded_buffer(), None, Some(Arc::new(table)));
        let result = tool.execute(&json!({ "target": "all" })).unwrap();
        let messages: Vec<&str> = result["logs"]
            .as_array()
            .unwrap()
            .iter()
            .map(|log| log["message"].as_str().unwrap())
            .collect();
        assert_eq!(
            messages,
            vec!["slow query", "persisted failure", "db connection refused"]
        );
        assert_eq!(result["summary"]["sources"]["memory"], 2);
        assert_eq!(result["summary"]["sources"]["db"], 1);
        assert_eq!(result["targets_queried"], json!(["memory", "db"]));
    }

    #[test]
    fn target_selects_a_single_reader() {
        let result = memory_only_tool()
            .execute(&json!({ "target": "memory" }))
            .unwrap();
        assert_eq!(result["targets_queried"], json!(["memory"]));
        assert_eq!(result["warnings"], json!([]));
    }

    #[test]
    fn unknown_target_yields_an_empty_report() {
        let result = memory_only_tool()
            .execute(&json!({ "target": "syslog" }))
            .unwrap();
        assert_eq!(result["logs"], json!([]));
        assert_eq!(result["targets_queried"], json!([]));
        assert_eq!(result["summary"]["total_available"], 0);
    }

    #[test]
    fn search_and_level_arguments_reach_the_query() {
        let result = memory_only_tool()
            .execute(&json!({ "levels": ["info"], "search": "REQUEST" }))
            .unwrap();
        let logs = result["logs"].as_array().unwrap();
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0]["message"], "request served");
    }

    #[test]
    fn offset_and_limit_paginate_the_merged_list() {
        let result = memory_only_tool()
            .execute(&json!({ "levels": ["error", "warning", "info"], "limit": 1, "offset": 1 }))
            .unwrap();
        let logs = result["logs"].as_array().unwrap();
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0]["message"], "request served");
        assert_eq!(result["summary"]["total_available"], 3);
        assert_eq!(result["summary"]["returned"], 1);
    }

    #[test]
    fn parse_query_reads_every_field() {
        let query = parse_query(&json!({
            "levels": ["error", "bogus"],
            "categories": ["app\\db\\*"],
            "limit": 5000,
            "offset": 7,
            "search": "timeout",
            "time_range": { "start": 100, "end": 200 },
            "include_trace": true,
        }));
        assert_eq!(query.levels, vec![LogLevel::Error]);
        assert_eq!(query.categories, vec!["app\\db\\*".to_string()]);
        assert_eq!(query.limit, MAX_LIMIT);
        assert_eq!(query.offset, 7);
        assert_eq!(query.search.as_deref(), Some("timeout"));
        let range = query.time_range.unwrap();
        assert_eq!(range.start, Some(100.0));
        assert_eq!(range.end, Some(200.0));
        assert!(query.include_trace);
    }
}
