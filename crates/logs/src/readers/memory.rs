use std::sync::Arc;

use serde_json::Value;

use crate::filter::matches_query;
use crate::store::{BufferedRecord, MemoryLogStore};
use crate::types::{LogEntry, LogQuery, LogSource, MessageKind};

use super::{LogReader, ReaderReport};

/// Reads the current process's buffered records. Always available; the
/// buffer may simply be empty.
pub struct MemoryLogReader {
    store: Arc<dyn MemoryLogStore>,
}

impl MemoryLogReader {
    pub fn new(store: Arc<dyn MemoryLogStore>) -> Self {
        MemoryLogReader { store }
    }

    fn to_entry(record: &BufferedRecord, include_trace: bool) -> LogEntry {
        let (message, message_type) = render_message(&record.message);
        let mut entry = LogEntry::new(
            record.level,
            record.timestamp,
            record.category.clone(),
            message,
            LogSource::Memory,
        );
        entry.message_type = message_type;
        entry.memory_usage = record.memory_usage;
        if include_trace && !record.trace.is_empty() {
            entry.trace = Some(record.trace.clone());
        }
        entry
    }
}

/// Structured payloads are rendered as pretty JSON so they stay readable in
/// the client; scalars pass through as text.
fn render_message(message: &Value) -> (String, MessageKind) {
    match message {
        Value::String(text) => (text.clone(), MessageKind::String),
        Value::Array(_) | Value::Object(_) => (
            serde_json::to_string_pretty(message).unwrap_or_else(|_| message.to_string()),
            MessageKind::Array,
        ),
        other => (other.to_string(), MessageKind::Other),
    }
}

impl LogReader for MemoryLogReader {
    fn is_available(&self) -> bool {
        true
    }

    fn source(&self) -> LogSource {
        LogSource::Memory
    }

    fn read(&self, query: &LogQuery) -> ReaderReport {
        let mut entries: Vec<LogEntry> = self
            .store
            .records()
            .iter()
            .map(|record| Self::to_entry(record, query.include_trace))
            .filter(|entry| matches_query(entry, query))
            .collect();
        entries.sort_by(|a, b| b.timestamp.total_cmp(&a.timestamp));

        let total = entries.len() as u64;
        let logs: Vec<LogEntry> = entries
            .into_iter()
            .skip(query.offset)
            .take(query.limit)
            .collect();
        ReaderReport::success(LogSource::Memory, logs, total)
    }
}
