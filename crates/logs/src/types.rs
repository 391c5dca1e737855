//! The normalized entry shape and the shared query.

use serde::{Deserialize, Serialize};

/// Hard cap on entries returned per query.
pub const MAX_LIMIT: usize = 1000;

/// Severity levels, matching what hosts actually write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warning,
    Info,
    Trace,
    Profile,
}

impl LogLevel {
    pub fn name(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warning => "warning",
            LogLevel::Info => "info",
            LogLevel::Trace => "trace",
            LogLevel::Profile => "profile",
        }
    }

    /// Case-insensitive parse. Unknown names yield `None` so callers can
    /// skip records they cannot classify.
    pub fn parse(raw: &str) -> Option<LogLevel> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "error" => Some(LogLevel::Error),
            "warning" => Some(LogLevel::Warning),
            "info" => Some(LogLevel::Info),
            "trace" => Some(LogLevel::Trace),
            "profile" => Some(LogLevel::Profile),
            _ => None,
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Which backing store an entry came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogSource {
    Memory,
    File,
    Db,
}

impl LogSource {
    pub fn name(&self) -> &'static str {
        match self {
            LogSource::Memory => "memory",
            LogSource::File => "file",
            LogSource::Db => "db",
        }
    }

    /// Capitalized form used in user-facing warnings.
    pub fn title(&self) -> &'static str {
        match self {
            LogSource::Memory => "Memory",
            LogSource::File => "File",
            LogSource::Db => "Db",
        }
    }
}

impl std::fmt::Display for LogSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// How the original message was shaped before normalization to text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    String,
    Array,
    Other,
}

/// One captured call frame. Fields the host could not resolve stay null.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TraceFrame {
    pub file: Option<String>,
    pub line: Option<u32>,
    pub function: Option<String>,
    pub class: Option<String>,
}

/// One normalized log entry, identical in shape across all sources so the
/// aggregator can merge and sort them uniformly. Immutable snapshot; no
/// back-reference to the store it came from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub level: LogLevel,
    /// Seconds since epoch, sub-second precision preserved.
    pub timestamp: f64,
    pub timestamp_formatted: String,
    pub category: String,
    pub message: String,
    pub message_type: MessageKind,
    pub source: LogSource,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trace: Option<Vec<TraceFrame>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub memory_usage: Option<u64>,
}

impl LogEntry {
    pub fn new(
        level: LogLevel,
        timestamp: f64,
        category: impl Into<String>,
        message: impl Into<String>,
        source: LogSource,
    ) -> Self {
        LogEntry {
            level,
            timestamp,
            timestamp_formatted: format_timestamp(timestamp),
            category: category.into(),
            message: message.into(),
            message_type: MessageKind::String,
            source,
            prefix: None,
            trace: None,
            memory_usage: None,
        }
    }
}

/// Render seconds-since-epoch as `YYYY-MM-DD HH:MM:SS` in UTC.
pub fn format_timestamp(timestamp: f64) -> String {
    chrono::DateTime::from_timestamp(timestamp as i64, 0)
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| timestamp.to_string())
}

/// Inclusive time bounds, either side optional.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TimeRange {
    pub start: Option<f64>,
    pub end: Option<f64>,
}

/// Filter and pagination parameters shared by every reader.
///
/// Empty `levels`/`categories` match everything. `limit` is clamped to
/// [`MAX_LIMIT`] at the argument-parsing boundary, not here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogQuery {
    pub levels: Vec<LogLevel>,
    pub categories: Vec<String>,
    pub limit: usize,
    pub offset: usize,
    pub search: Option<String>,
    pub time_range: Option<TimeRange>,
    pub include_trace: bool,
}

impl Default for LogQuery {
    fn default() -> Self {
        LogQuery {
            levels: vec![LogLevel::Error, LogLevel::Warning],
            categories: vec!["*".to_string()],
            limit: 100,
            offset: 0,
            search: None,
            time_range: None,
            include_trace: false,
        }
    }
}
