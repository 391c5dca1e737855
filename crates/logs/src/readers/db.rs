use std::sync::Arc;

use crate::store::{LogRow, LogTable};
use crate::types::{LogEntry, LogQuery, LogSource};

use super::{LogReader, ReaderReport};

/// Reads a persistent log table through the host's gateway. The gateway does
/// the filtering and pagination; this adapter only normalizes rows.
pub struct DbLogReader {
    table: Option<Arc<dyn LogTable>>,
}

impl DbLogReader {
    pub fn new(table: Option<Arc<dyn LogTable>>) -> Self {
        DbLogReader { table }
    }

    fn to_entry(row: LogRow) -> LogEntry {
        let mut entry = LogEntry::new(
            row.level,
            row.timestamp,
            row.category,
            row.message,
            LogSource::Db,
        );
        entry.prefix = row.prefix;
        entry
    }
}

impl LogReader for DbLogReader {
    fn is_available(&self) -> bool {
        self.table.is_some()
    }

    fn source(&self) -> LogSource {
        LogSource::Db
    }

    fn read(&self, query: &LogQuery) -> ReaderReport {
        let Some(table) = &self.table else {
            return ReaderReport::failure(LogSource::Db, "Database log target not configured");
        };

        let total = match table.count(query) {
            Ok(total) => total,
            Err(e) => {
                return ReaderReport::failure(LogSource::Db, format!("Failed to query logs: {e}"))
            }
        };
        let rows = match table.select(query) {
            Ok(rows) => rows,
            Err(e) => {
                return ReaderReport::failure(LogSource::Db, format!("Failed to query logs: {e}"))
            }
        };

        let logs = rows.into_iter().map(Self::to_entry).collect();
        ReaderReport::success(LogSource::Db, logs, total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{LogError, Result};
    use crate::types::LogLevel;

    struct FixedTable {
        rows: Vec<LogRow>,
        fail: bool,
    }

    impl LogTable for FixedTable {
        fn count(&self, _query: &LogQuery) -> Result<u64> {
            if self.fail {
                return Err(LogError::backend("SQLSTATE[HY000] gone away"));
            }
            Ok(self.rows.len() as u64 + 100)
        }

        fn select(&self, query: &LogQuery) -> Result<Vec<LogRow>> {
            if self.fail {
                return Err(LogError::backend("SQLSTATE[HY000] gone away"));
            }
            Ok(self
                .rows
                .iter()
                .cloned()
                .skip(query.offset)
                .take(query.limit)
                .collect())
        }
    }

    fn row(timestamp: f64, message: &str) -> LogRow {
        LogRow {
            level: LogLevel::Error,
            timestamp,
            category: "app".to_string(),
            prefix: Some("web".to_string()),
            message: message.to_string(),
        }
    }

    #[test]
    fn unconfigured_reader_is_unavailable() {
        let reader = DbLogReader::new(None);
        assert!(!reader.is_available());
        let report = reader.read(&LogQuery::default());
        assert_eq!(
            report.error.as_deref(),
            Some("Database log target not configured")
        );
    }

    #[test]
    fn rows_normalize_with_gateway_total() {
        let table = FixedTable {
            rows: vec![row(20.0, "newest"), row(10.0, "older")],
            fail: false,
        };
        let reader = DbLogReader::new(Some(Arc::new(table)));
        assert!(reader.is_available());

        let report = reader.read(&LogQuery::default());
        assert_eq!(report.logs.len(), 2);
        assert_eq!(report.logs[0].message, "newest");
        assert_eq!(report.logs[0].source, LogSource::Db);
        assert_eq!(report.logs[0].prefix.as_deref(), Some("web"));
        // The gateway's count wins over the returned slice length.
        assert_eq!(report.total_available, 102);
    }

    #[test]
    fn backend_failure_becomes_a_report_error() {
        let table = FixedTable {
            rows: Vec::new(),
            fail: true,
        };
        let reader = DbLogReader::new(Some(Arc::new(table)));
        let report = reader.read(&LogQuery::default());
        assert_eq!(
            report.error.as_deref(),
            Some("Failed to query logs: SQLSTATE[HY000] gone away")
        );
        assert!(report.logs.is_empty());
    }
}
