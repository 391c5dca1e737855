use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::filter::matches_query;
use crate::types::{LogEntry, LogLevel, LogQuery, LogSource};

use super::{LogReader, ReaderReport};

/// Files above this size are tailed instead of read whole.
const TAIL_THRESHOLD_BYTES: u64 = if cfg!(test) { 2048 } else { 5 * 1024 * 1024 };
/// Lines recovered when tailing.
const TAIL_LINES: usize = if cfg!(test) { 50 } else { 5000 };
/// Granularity of the backwards scan.
const TAIL_CHUNK_BYTES: u64 = if cfg!(test) { 64 } else { 8192 };

/// `[timestamp] [level] [category] [prefix?] message`. Continuation lines
/// (stack traces, dumps) do not match and are skipped.
static LINE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\[([^\]]+)\]\s+\[([^\]]+)\]\s+\[([^\]]+)\]\s*(?:\[([^\]]+)\])?\s+(.*)$")
        .expect("log line pattern is valid")
});

/// Reads a rotating text log. Unavailable until the path is configured and
/// the file exists.
pub struct FileLogReader {
    path: Option<PathBuf>,
}

impl FileLogReader {
    pub fn new(path: Option<PathBuf>) -> Self {
        FileLogReader { path }
    }

    fn configured_path(&self) -> Option<&Path> {
        self.path.as_deref().filter(|path| path.is_file())
    }

    fn read_lines(path: &Path) -> std::io::Result<Vec<String>> {
        let size = std::fs::metadata(path)?.len();
        if size > TAIL_THRESHOLD_BYTES {
            tail_lines(path, TAIL_LINES)
        } else {
            let bytes = std::fs::read(path)?;
            Ok(String::from_utf8_lossy(&bytes)
                .lines()
                .map(str::to_string)
                .collect())
        }
    }
}

fn parse_line(line: &str) -> Option<LogEntry> {
    let caps = LINE_RE.captures(line)?;
    let timestamp = parse_timestamp(caps.get(1)?.as_str())?;
    let level = LogLevel::parse(caps.get(2)?.as_str())?;
    let category = caps.get(3)?.as_str().to_string();
    let prefix = caps.get(4).map(|m| m.as_str().to_string());
    let message = caps.get(5)?.as_str().trim().to_string();

    let mut entry = LogEntry::new(level, timestamp, category, message, LogSource::File);
    entry.prefix = prefix;
    Some(entry)
}

/// Timestamps carry no zone marker; they are taken as UTC. Fractional
/// seconds are optional.
fn parse_timestamp(raw: &str) -> Option<f64> {
    let parsed = NaiveDateTime::parse_from_str(raw.trim(), "%Y-%m-%d %H:%M:%S%.f").ok()?;
    let utc = parsed.and_utc();
    Some(utc.timestamp() as f64 + f64::from(utc.timestamp_subsec_micros()) / 1_000_000.0)
}

/// Last `max_lines` lines of `path` without reading the whole file: scan
/// backwards in fixed-size chunks from the end until enough line breaks have
/// been seen, then trim any partial leading line.
fn tail_lines(path: &Path, max_lines: usize) -> std::io::Result<Vec<String>> {
    let mut file = File::open(path)?;
    let mut pos = file.seek(SeekFrom::End(0))?;
    let mut buffer: Vec<u8> = Vec::new();
    let mut breaks_seen = 0usize;

    while pos > 0 && breaks_seen <= max_lines {
        let step = TAIL_CHUNK_BYTES.min(pos);
        pos -= step;
        file.seek(SeekFrom::Start(pos))?;
        let mut chunk = vec![0u8; step as usize];
        file.read_exact(&mut chunk)?;
        breaks_seen += chunk.iter().filter(|byte| **byte == b'\n').count();
        chunk.extend_from_slice(&buffer);
        buffer = chunk;
    }

    let text = String::from_utf8_lossy(&buffer);
    let mut lines: Vec<String> = text.lines().map(str::to_string).collect();
    if lines.len() > max_lines {
        lines.drain(..lines.len() - max_lines);
    }
    Ok(lines)
}

impl LogReader for FileLogReader {
    fn is_available(&self) -> bool {
        self.configured_path().is_some()
    }

    fn source(&self) -> LogSource {
        LogSource::File
    }

    fn read(&self, query: &LogQuery) -> ReaderReport {
        let Some(path) = self.configured_path() else {
            return ReaderReport::failure(
                LogSource::File,
                "File log target not configured or log file not found",
            );
        };

        let lines = match Self::read_lines(path) {
            Ok(lines) => lines,
            Err(e) => {
                return ReaderReport::failure(
                    LogSource::File,
                    format!("Failed to read log file: {e}"),
                )
            }
        };

        let mut entries: Vec<LogEntry> = lines
            .iter()
            .filter_map(|line| parse_line(line))
            .filter(|entry| matches_query(entry, query))
            .collect();
        // The file is written oldest first.
        entries.reverse();

        let total = entries.len() as u64;
        let logs: Vec<LogEntry> = entries
            .into_iter()
            .skip(query.offset)
            .take(query.limit)
            .collect();
        ReaderReport::success(LogSource::File, logs, total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn log_file(lines: &[&str]) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        for line in lines {
            writeln!(file, "{line}").unwrap();
        }
        file.flush().unwrap();
        file
    }

    #[test]
    fn parses_the_standard_line_shape() {
        let entry = parse_line("[2024-03-01 10:15:30] [error] [app\\db] connection refused")
            .expect("line should parse");
        assert_eq!(entry.level, LogLevel::Error);
        assert_eq!(entry.category, "app\\db");
        assert_eq!(entry.message, "connection refused");
        assert_eq!(entry.prefix, None);
        assert_eq!(entry.timestamp_formatted, "2024-03-01 10:15:30");
    }

    #[test]
    fn parses_optional_prefix_and_fraction() {
        let entry = parse_line("[2024-03-01 10:15:30.2500] [warning] [app] [req-9] slow query")
            .expect("line should parse");
        assert_eq!(entry.prefix.as_deref(), Some("req-9"));
        assert_eq!(entry.message, "slow query");
        assert!((entry.timestamp - (entry.timestamp.trunc() + 0.25)).abs() < 1e-6);
    }

    #[test]
    fn continuation_lines_are_skipped() {
        assert!(parse_line("    #0 app\\models\\User->save()").is_none());
        assert!(parse_line("").is_none());
    }

    #[test]
    fn unknown_level_is_skipped() {
        assert!(parse_line("[2024-03-01 10:15:30] [bogus] [app] hm").is_none());
    }

    #[test]
    fn unconfigured_reader_reports_not_available() {
        let reader = FileLogReader::new(None);
        assert!(!reader.is_available());
        let report = reader.read(&LogQuery::default());
        assert_eq!(
            report.error.as_deref(),
            Some("File log target not configured or log file not found")
        );
    }

    #[test]
    fn missing_file_counts_as_unconfigured() {
        let reader = FileLogReader::new(Some(PathBuf::from("/nonexistent/app.log")));
        assert!(!reader.is_available());
    }

    #[test]
    fn reads_newest_first_with_totals() {
        let file = log_file(&[
            "[2024-03-01 10:00:00] [error] [app] first",
            "stack continuation line",
            "[2024-03-01 11:00:00] [warning] [app] second",
            "[2024-03-01 12:00:00] [info] [app] filtered out",
            "[2024-03-01 13:00:00] [error] [app] third",
        ]);
        let reader = FileLogReader::new(Some(file.path().to_path_buf()));
        assert!(reader.is_available());

        let report = reader.read(&LogQuery::default());
        let messages: Vec<&str> = report.logs.iter().map(|e| e.message.as_str()).collect();
        assert_eq!(messages, vec!["third", "second", "first"]);
        assert_eq!(report.total_available, 3);
    }

    #[test]
    fn pagination_applies_after_the_reverse() {
        let lines: Vec<String> = (0..6)
            .map(|i| format!("[2024-03-01 10:00:0{i}] [error] [app] m{i}"))
            .collect();
        let refs: Vec<&str> = lines.iter().map(String::as_str).collect();
        let file = log_file(&refs);
        let reader = FileLogReader::new(Some(file.path().to_path_buf()));

        let mut query = LogQuery::default();
        query.limit = 2;
        query.offset = 1;
        let report = reader.read(&query);
        let messages: Vec<&str> = report.logs.iter().map(|e| e.message.as_str()).collect();
        assert_eq!(messages, vec!["m4", "m3"]);
        assert_eq!(report.total_available, 6);
    }

    #[test]
    fn large_files_are_tailed_to_the_line_cap() {
        // Well past the test-profile threshold so the tail path runs.
        let lines: Vec<String> = (0..200)
            .map(|i| format!("[2024-03-01 10:00:00] [error] [app] entry number {i:04}"))
            .collect();
        let refs: Vec<&str> = lines.iter().map(String::as_str).collect();
        let file = log_file(&refs);
        assert!(file.as_file().metadata().unwrap().len() > TAIL_THRESHOLD_BYTES);

        let reader = FileLogReader::new(Some(file.path().to_path_buf()));
        let mut query = LogQuery::default();
        query.limit = crate::types::MAX_LIMIT;
        let report = reader.read(&query);

        // Only the last TAIL_LINES lines are considered.
        assert_eq!(report.total_available, TAIL_LINES as u64);
        assert_eq!(report.logs[0].message, "entry number 0199");
        assert_eq!(
            report.logs.last().unwrap().message,
            format!("entry number {:04}", 200 - TAIL_LINES)
        );
    }

    #[test]
    fn tail_recovers_exact_trailing_lines() {
        let lines: Vec<String> = (0..120).map(|i| format!("line-{i:03}")).collect();
        let refs: Vec<&str> = lines.iter().map(String::as_str).collect();
        let file = log_file(&refs);

        let tail = tail_lines(file.path(), 50).unwrap();
        assert_eq!(tail.len(), 50);
        assert_eq!(tail[0], "line-070");
        assert_eq!(tail[49], "line-119");
    }

    #[test]
    fn tail_of_short_file_returns_everything() {
        let file = log_file(&["a", "b", "c"]);
        let tail = tail_lines(file.path(), 50).unwrap();
        assert_eq!(tail, vec!["a", "b", "c"]);
    }
}
