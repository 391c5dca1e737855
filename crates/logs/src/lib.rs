//! # AppScope Logs
//!
//! Log aggregation across heterogeneous sources with one normalized entry
//! shape.
//!
//! ## Philosophy
//!
//! Every backing store looks different (an in-process ring buffer, a rotated
//! text file, a database table) but the client wants one merged, newest-first
//! stream. So each source is wrapped in a reader that:
//! - Normalizes its records into [`LogEntry`]
//! - Applies the shared filter set ([`LogQuery`])
//! - Reports its own total so pagination stays honest
//!
//! The aggregator then merges the per-source slices, sorts globally by
//! timestamp and applies the caller's real offset/limit once. Readers never
//! see each other.
//!
//! ## Architecture
//!
//! ```text
//! LogQuery
//!     │
//!     ├──> MemoryLogReader ──> MemoryLogStore (ring buffer snapshot)
//!     ├──> FileLogReader   ──> text log, tailed when large
//!     └──> DbLogReader     ──> LogTable gateway (pushed-down query)
//!              │
//!              └──> aggregate(): merge, sort desc, slice, summarize
//! ```

mod aggregator;
mod error;
mod filter;
mod readers;
mod store;
mod types;

pub use aggregator::{aggregate, AggregateReport, AggregateSummary, SummaryTimeRange};
pub use error::{LogError, Result};
pub use filter::{matches_category, matches_query};
pub use readers::{DbLogReader, FileLogReader, LogReader, MemoryLogReader, ReaderReport};
pub use store::{BufferedRecord, LogRow, LogTable, MemoryLogStore, RecordBuffer};
pub use types::{
    format_timestamp, LogEntry, LogLevel, LogQuery, LogSource, MessageKind, TimeRange, TraceFrame,
    MAX_LIMIT,
};
