//! "Is there another page?" decision
//!
//! The backend reports continuation in several ways, or not at all. Rules are
//! tried in order and the first one that applies decides. Every rule also
//! accepts a full page as evidence of more data, which tolerates servers that
//! report the last page one step too early.

use crate::decode::unwrap::{as_count, extract_pagination_meta};
use serde_json::{Map, Value};

const HAS_NEXT_KEYS: &[&str] = &[
    "has_next_page",
    "hasNextPage",
    "has_next",
    "hasNext",
    "has_more",
    "hasMore",
];

const CURRENT_PAGE_KEYS: &[&str] = &["current_page", "currentPage", "page"];

const TOTAL_PAGES_KEYS: &[&str] = &["total_pages", "totalPages", "last_page", "lastPage", "pages"];

const NEXT_PAGE_KEYS: &[&str] = &["next_page", "nextPage", "next"];

/// Which rule produced a decision
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Evidence {
    /// Explicit boolean flag in the metadata
    Flag,
    /// Current page compared against total pages
    PageCount,
    /// Presence of a next-page pointer
    NextPointer,
    /// Page-size heuristic only
    Heuristic,
}

/// Decide whether another page likely exists
pub fn has_more(payload: &Value, received: usize, expected_page_size: usize) -> bool {
    decide(payload, received, expected_page_size).0
}

/// Same as [`has_more`], also reporting which rule applied
pub fn decide(payload: &Value, received: usize, expected_page_size: usize) -> (bool, Evidence) {
    let full_page = received >= expected_page_size;

    let Some(meta) = extract_pagination_meta(payload) else {
        return (full_page, Evidence::Heuristic);
    };

    if let Some(flag) = first_bool(meta, HAS_NEXT_KEYS) {
        return (flag || full_page, Evidence::Flag);
    }

    if let (Some(current), Some(total)) = (
        first_count(meta, CURRENT_PAGE_KEYS),
        first_count(meta, TOTAL_PAGES_KEYS),
    ) {
        return (current < total || full_page, Evidence::PageCount);
    }

    if let Some(next) = NEXT_PAGE_KEYS.iter().find_map(|key| meta.get(*key)) {
        return (is_truthy(next) || full_page, Evidence::NextPointer);
    }

    (full_page, Evidence::Heuristic)
}

fn first_bool(meta: &Map<String, Value>, keys: &[&str]) -> Option<bool> {
    keys.iter().find_map(|key| meta.get(*key)?.as_bool())
}

fn first_count(meta: &Map<String, Value>, keys: &[&str]) -> Option<u64> {
    keys.iter().find_map(|key| meta.get(*key).and_then(as_count))
}

/// Loose truthiness: null, false, zero and the empty string are false;
/// arrays and objects are always true
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
