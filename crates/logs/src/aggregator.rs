//! Merges per-source slices into one globally ordered result.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::readers::LogReader;
use crate::types::{format_timestamp, LogEntry, LogQuery};

/// Merged result across every queried reader.
#[derive(Debug, Clone, Serialize)]
pub struct AggregateReport {
    pub logs: Vec<LogEntry>,
    pub summary: AggregateSummary,
    /// Sources that were actually read, in query order. Unavailable sources
    /// are skipped before the read and do not appear here; erroring ones do.
    pub targets_queried: Vec<String>,
    pub warnings: Vec<String>,
}

/// Computed over the merged set before pagination, so counts reflect what is
/// really there rather than the returned page.
#[derive(Debug, Clone, Serialize)]
pub struct AggregateSummary {
    /// Sum of each reader's own reported total.
    pub total_available: u64,
    pub returned: usize,
    pub sources: BTreeMap<String, usize>,
    /// Levels in first-seen (newest-entry) order.
    pub levels_found: Vec<String>,
    pub time_range: SummaryTimeRange,
}

#[derive(Debug, Clone, Serialize)]
pub struct SummaryTimeRange {
    pub earliest: Option<String>,
    pub latest: Option<String>,
}

/// Merge `readers` under one query.
///
/// The true global ordering is unknown until every source is seen, so each
/// reader is asked for the whole `limit + offset` window from position zero;
/// the caller's real offset/limit is applied once, after the merged sort.
/// Ties in the descending timestamp sort keep their merge order (readers in
/// query order, each newest first).
pub fn aggregate(readers: &[&dyn LogReader], query: &LogQuery) -> AggregateReport {
    let mut warnings = Vec::new();
    let mut targets_queried = Vec::new();
    let mut merged: Vec<LogEntry> = Vec::new();
    let mut total_available: u64 = 0;

    let mut window = query.clone();
    window.limit = query.limit.saturating_add(query.offset);
    window.offset = 0;

    for reader in readers {
        let source = reader.source();
        if !reader.is_available() {
            warnings.push(format!("{} logs not available", source.title()));
            continue;
        }
        let report = reader.read(&window);
        targets_queried.push(source.name().to_string());
        if let Some(error) = report.error {
            warnings.push(format!("{}: {}", source.title(), error));
            continue;
        }
        total_available += report.total_available;
        merged.extend(report.logs);
    }

    merged.sort_by(|a, b| b.timestamp.total_cmp(&a.timestamp));

    let mut sources: BTreeMap<String, usize> = BTreeMap::new();
    let mut levels_found: Vec<String> = Vec::new();
    let mut earliest: Option<f64> = None;
    let mut latest: Option<f64> = None;
    for entry in &merged {
        *sources.entry(entry.source.name().to_string()).or_insert(0) += 1;
        let level = entry.level.name().to_string();
        if !levels_found.contains(&level) {
            levels_found.push(level);
        }
        earliest = Some(earliest.map_or(entry.timestamp, |t| t.min(entry.timestamp)));
        latest = Some(latest.map_or(entry.timestamp, |t| t.max(entry.timestamp)));
    }

    let logs: Vec<LogEntry> = merged
        .into_iter()
        .skip(query.offset)
        .take(query.limit)
        .collect();

    AggregateReport {
        summary: AggregateSummary {
            total_available,
            returned: logs.len(),
            sources,
            levels_found,
            time_range: SummaryTimeRange {
                earliest: earliest.map(format_timestamp),
                latest: latest.map(format_timestamp),
            },
        },
        logs,
        targets_queried,
        warnings,
    }
}
