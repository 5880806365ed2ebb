//! Response envelope probing
//!
//! The bars endpoint does not commit to one envelope shape. Items and
//! pagination metadata are located by trying a fixed list of paths in order;
//! the first match wins. Earlier paths are more specific, so the order matters.

use serde_json::{Map, Value};

/// Candidate locations of the item array, most specific first
pub const ITEM_PATHS: &[&[&str]] = &[
    &["data", "bars"],
    &["data", "items"],
    &["data", "data"],
    &["data", "results"],
    &["data"],
    &["bars"],
    &["items"],
    &["results"],
    &["payload"],
];

/// Candidate locations of the pagination metadata object
pub const META_PATHS: &[&[&str]] = &[
    &["meta", "pagination"],
    &["meta"],
    &["pagination"],
    &["data", "pagination"],
];

const META_TOTAL_KEYS: &[&str] = &[
    "total",
    "total_count",
    "totalCount",
    "total_items",
    "totalItems",
    "count",
];

const ROOT_TOTAL_KEYS: &[&str] = &["total", "total_count", "totalCount"];

/// Follow a path of object keys
pub fn probe<'a>(payload: &'a Value, path: &[&str]) -> Option<&'a Value> {
    path.iter()
        .try_fold(payload, |current, key| current.as_object()?.get(*key))
}

/// Locate the raw item array in a payload.
///
/// A bare array is returned as is. Anything else that is not an object, or an
/// object with no array at any known path, yields an empty list.
pub fn extract_items(payload: &Value) -> Vec<Value> {
    match payload {
        Value::Array(items) => items.clone(),
        Value::Object(_) => ITEM_PATHS
            .iter()
            .find_map(|path| probe(payload, path).and_then(Value::as_array))
            .cloned()
            .unwrap_or_default(),
        _ => Vec::new(),
    }
}

/// Locate the pagination metadata object, if any
pub fn extract_pagination_meta(payload: &Value) -> Option<&Map<String, Value>> {
    META_PATHS
        .iter()
        .find_map(|path| probe(payload, path).and_then(Value::as_object))
}

/// Server-reported total number of items, if present.
///
/// Looks in the pagination metadata first, then at the top level.
pub fn extract_total_count(payload: &Value) -> Option<u64> {
    let from_meta = extract_pagination_meta(payload).and_then(|meta| {
        META_TOTAL_KEYS
            .iter()
            .find_map(|key| meta.get(*key).and_then(as_count))
    });

    from_meta.or_else(|| {
        payload.as_object().and_then(|root| {
            ROOT_TOTAL_KEYS
                .iter()
                .find_map(|key| root.get(*key).and_then(as_count))
        })
    })
}

/// Read a non-negative integer from a number or numeric string
pub(crate) fn as_count(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
