//! Logging setup.
//!
//! Stdout belongs to the protocol, so the stderr sink is built from
//! `RUST_LOG` (default `warn`). Every record is additionally captured into
//! the bounded buffer behind the `memory` log source, regardless of the
//! stderr filter, so `log_inspector` sees the server's own activity the same
//! way it sees the host's log targets.

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use serde_json::Value;

use appscope_logs::{BufferedRecord, LogLevel, RecordBuffer, TraceFrame};

pub struct TeeLogger {
    sink: env_logger::Logger,
    buffer: Arc<RecordBuffer>,
}

impl TeeLogger {
    pub fn new(sink: env_logger::Logger, buffer: Arc<RecordBuffer>) -> Self {
        Self { sink, buffer }
    }

    fn capture(&self, record: &log::Record) {
        let level = match record.level() {
            log::Level::Error => LogLevel::Error,
            log::Level::Warn => LogLevel::Warning,
            log::Level::Info => LogLevel::Info,
            log::Level::Debug | log::Level::Trace => LogLevel::Trace,
        };
        let mut trace = Vec::new();
        if record.file().is_some() || record.module_path().is_some() {
            trace.push(TraceFrame {
                file: record.file().map(str::to_string),
                line: record.line(),
                function: None,
                class: record.module_path().map(str::to_string),
            });
        }
        self.buffer.push(BufferedRecord {
            message: Value::String(record.args().to_string()),
            level,
            category: record.target().to_string(),
            timestamp: now_unix(),
            trace,
            memory_usage: None,
        });
    }
}

impl log::Log for TeeLogger {
    fn enabled(&self, _metadata: &log::Metadata) -> bool {
        true
    }

    fn log(&self, record: &log::Record) {
        self.capture(record);
        self.sink.log(record);
    }

    fn flush(&self) {
        self.sink.flush();
    }
}

/// Installs the tee as the global logger. A second call is a no-op, which
/// keeps multi-server test binaries happy.
pub fn init(buffer: Arc<RecordBuffer>) {
    let sink = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .target(env_logger::Target::Stderr)
        .build();
    if log::set_boxed_logger(Box::new(TeeLogger::new(sink, buffer))).is_ok() {
        log::set_max_level(log::LevelFilter::Trace);
    }
}

fn now_unix() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or(0.0)
}
