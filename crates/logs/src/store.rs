//! Collaborator contracts for the backing stores, plus the bounded in-process
//! buffer the bundled server feeds from its own log pipeline.

use std::collections::VecDeque;
use std::sync::Mutex;

use serde_json::Value;

use crate::error::Result;
use crate::types::{LogLevel, LogQuery, TraceFrame};

/// Capacity of the in-process buffer. Oldest records are evicted first.
const BUFFER_CAP: usize = if cfg!(test) { 8 } else { 1000 };

/// One captured record before normalization. `message` stays a JSON value so
/// structured payloads survive until rendering.
#[derive(Debug, Clone)]
pub struct BufferedRecord {
    pub message: Value,
    pub level: LogLevel,
    pub category: String,
    pub timestamp: f64,
    pub trace: Vec<TraceFrame>,
    pub memory_usage: Option<u64>,
}

/// Snapshot access to the current process's buffered log records.
pub trait MemoryLogStore: Send + Sync {
    fn records(&self) -> Vec<BufferedRecord>;
}

/// One row from the host's log table, already filtered and ordered by the
/// gateway.
#[derive(Debug, Clone)]
pub struct LogRow {
    pub level: LogLevel,
    pub timestamp: f64,
    pub category: String,
    pub prefix: Option<String>,
    pub message: String,
}

/// Pushed-down query access to a persistent log table.
///
/// Implementations apply the query's filters, order rows newest first and
/// honor limit/offset in `select`; `count` reports the total matching rows
/// ignoring pagination.
pub trait LogTable: Send + Sync {
    fn count(&self, query: &LogQuery) -> Result<u64>;
    fn select(&self, query: &LogQuery) -> Result<Vec<LogRow>>;
}

/// Bounded, thread-safe record buffer. This is the [`MemoryLogStore`] the
/// bundled server installs behind its log tee.
#[derive(Debug, Default)]
pub struct RecordBuffer {
    records: Mutex<VecDeque<BufferedRecord>>,
}

impl RecordBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, record: BufferedRecord) {
        if let Ok(mut records) = self.records.lock() {
            records.push_back(record);
            while records.len() > BUFFER_CAP {
                records.pop_front();
            }
        }
    }
}

impl MemoryLogStore for RecordBuffer {
    fn records(&self) -> Vec<BufferedRecord> {
        match self.records.lock() {
            Ok(records) => records.iter().cloned().collect(),
            Err(_) => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(timestamp: f64) -> BufferedRecord {
        BufferedRecord {
            message: json!("msg"),
            level: LogLevel::Info,
            category: "app".to_string(),
            timestamp,
            trace: Vec::new(),
            memory_usage: None,
        }
    }

    #[test]
    fn buffer_evicts_oldest_beyond_capacity() {
        let buffer = RecordBuffer::new();
        for i in 0..20 {
            buffer.push(record(i as f64));
        }
        let records = buffer.records();
        assert_eq!(records.len(), BUFFER_CAP);
        assert_eq!(records[0].timestamp, (20 - BUFFER_CAP) as f64);
        assert_eq!(records[BUFFER_CAP - 1].timestamp, 19.0);
    }

    #[test]
    fn snapshot_is_a_copy() {
        let buffer = RecordBuffer::new();
        buffer.push(record(1.0));
        let first = buffer.records();
        buffer.push(record(2.0));
        assert_eq!(first.len(), 1);
        assert_eq!(buffer.records().len(), 2);
    }
}
