//! Filter predicates shared by every reader.

use crate::types::{LogEntry, LogQuery};

/// True when `category` matches `pattern`. A trailing `*` is a prefix match,
/// a bare `*` matches everything, anything else is exact.
pub fn matches_category(category: &str, pattern: &str) -> bool {
    if pattern == "*" {
        return true;
    }
    match pattern.strip_suffix('*') {
        Some(prefix) => category.starts_with(prefix),
        None => category == pattern,
    }
}

/// Applies every filter of `query` except pagination.
pub fn matches_query(entry: &LogEntry, query: &LogQuery) -> bool {
    if !query.levels.is_empty() && !query.levels.contains(&entry.level) {
        return false;
    }
    if !query.categories.is_empty()
        && !query
            .categories
            .iter()
            .any(|pattern| matches_category(&entry.category, pattern))
    {
        return false;
    }
    if let Some(search) = &query.search {
        if !entry
            .message
            .to_lowercase()
            .contains(&search.to_lowercase())
        {
            return false;
        }
    }
    if let Some(range) = &query.time_range {
        if let Some(start) = range.start {
            if entry.timestamp < start {
                return false;
            }
        }
        if let Some(end) = range.end {
            if entry.timestamp > end {
                return false;
            }
        }
    }
    true
}
