//! The three source adapters behind [`LogReader`].

mod db;
mod file;
mod memory;

pub use db::DbLogReader;
pub use file::FileLogReader;
pub use memory::MemoryLogReader;

use crate::types::{LogEntry, LogQuery, LogSource};

/// One source's slice of a query.
#[derive(Debug, Clone)]
pub struct ReaderReport {
    /// Matching entries, newest first, limit/offset applied.
    pub logs: Vec<LogEntry>,
    /// Total matching entries in this source ignoring pagination.
    pub total_available: u64,
    pub source: LogSource,
    /// Set when the source could not be read; `logs` is empty then.
    pub error: Option<String>,
}

impl ReaderReport {
    pub fn success(source: LogSource, logs: Vec<LogEntry>, total_available: u64) -> Self {
        ReaderReport {
            logs,
            total_available,
            source,
            error: None,
        }
    }

    pub fn failure(source: LogSource, error: impl Into<String>) -> Self {
        ReaderReport {
            logs: Vec::new(),
            total_available: 0,
            source,
            error: Some(error.into()),
        }
    }
}

/// A source of normalized log entries.
///
/// `read` never panics and never returns a hard error; failures are carried
/// in [`ReaderReport::error`] so one broken source cannot sink a merged
/// query.
pub trait LogReader: Send + Sync {
    /// Whether the backing store is configured and reachable.
    fn is_available(&self) -> bool;
    fn source(&self) -> LogSource;
    fn read(&self, query: &LogQuery) -> ReaderReport;
}
