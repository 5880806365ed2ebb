//! Tests for the decode module

use super::unwrap::{probe, ITEM_PATHS};
use super::*;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

// ============================================================================
// Item Extraction Tests
// ============================================================================

#[test]
fn test_extract_items_bare_array() {
    let payload = json!([{"id": 1}, {"id": 2}]);
    assert_eq!(extract_items(&payload).len(), 2);
}

#[test]
fn test_extract_items_non_object_is_empty() {
    assert!(extract_items(&json!(null)).is_empty());
    assert!(extract_items(&json!("bars")).is_empty());
    assert!(extract_items(&json!(12)).is_empty());
}

#[test]
fn test_extract_items_data_items_path() {
    let payload = json!({"data": {"items": [{"id": "a"}, {"id": "b"}]}});
    let items = extract_items(&payload);
    assert_eq!(items, vec![json!({"id": "a"}), json!({"id": "b"})]);
}

#[test]
fn test_extract_items_probe_order() {
    // data.bars beats top-level bars
    let payload = json!({
        "bars": [{"id": "top"}],
        "data": {"bars": [{"id": "nested"}]}
    });
    assert_eq!(extract_items(&payload), vec![json!({"id": "nested"})]);

    // data as array beats top-level items
    let payload = json!({
        "data": [{"id": "data"}],
        "items": [{"id": "items"}]
    });
    assert_eq!(extract_items(&payload), vec![json!({"id": "data"})]);
}

#[test]
fn test_extract_items_skips_non_array_candidates() {
    let payload = json!({
        "data": {"bars": "not an array", "pagination": {}},
        "results": [{"id": "r"}]
    });
    assert_eq!(extract_items(&payload), vec![json!({"id": "r"})]);
}

#[test]
fn test_extract_items_payload_path_and_no_match() {
    let payload = json!({"payload": [{"id": 1}]});
    assert_eq!(extract_items(&payload).len(), 1);

    let payload = json!({"something": [{"id": 1}]});
    assert!(extract_items(&payload).is_empty());
}

#[test]
fn test_item_paths_order_is_stable() {
    let rendered: Vec<String> = ITEM_PATHS.iter().map(|p| p.join(".")).collect();
    assert_eq!(
        rendered,
        vec![
            "data.bars",
            "data.items",
            "data.data",
            "data.results",
            "data",
            "bars",
            "items",
            "results",
            "payload"
        ]
    );
}

#[test]
fn test_probe() {
    let payload = json!({"a": {"b": {"c": 1}}, "x": [1]});
    assert_eq!(probe(&payload, &["a", "b", "c"]), Some(&json!(1)));
    assert_eq!(probe(&payload, &["x", "0"]), None);
    assert_eq!(probe(&payload, &["missing"]), None);
    assert_eq!(probe(&payload, &[]), Some(&payload));
}

// ============================================================================
// Pagination Meta Tests
// ============================================================================

#[test]
fn test_extract_meta_prefers_meta_pagination() {
    let payload = json!({
        "meta": {"pagination": {"has_next_page": true}, "request_id": "r1"},
        "pagination": {"has_next_page": false}
    });
    let meta = extract_pagination_meta(&payload).unwrap();
    assert_eq!(meta.get("has_next_page"), Some(&json!(true)));
}

#[test]
fn test_extract_meta_fallbacks() {
    let payload = json!({"meta": {"total": 3}});
    assert_eq!(
        extract_pagination_meta(&payload).unwrap().get("total"),
        Some(&json!(3))
    );

    let payload = json!({"pagination": {"page": 1}});
    assert!(extract_pagination_meta(&payload).is_some());

    let payload = json!({"data": {"pagination": {"page": 2}, "items": []}});
    assert_eq!(
        extract_pagination_meta(&payload).unwrap().get("page"),
        Some(&json!(2))
    );
}

#[test]
fn test_extract_meta_absent() {
    assert!(extract_pagination_meta(&json!([1, 2])).is_none());
    assert!(extract_pagination_meta(&json!({"meta": "nope"})).is_none());
    assert!(extract_pagination_meta(&json!({"bars": []})).is_none());
}

// ============================================================================
// Total Count Tests
// ============================================================================

#[test]
fn test_extract_total_count() {
    let payload = json!({"meta": {"pagination": {"total": 120}}});
    assert_eq!(extract_total_count(&payload), Some(120));

    let payload = json!({"pagination": {"totalCount": "57"}});
    assert_eq!(extract_total_count(&payload), Some(57));

    let payload = json!({"bars": [], "total_count": 9});
    assert_eq!(extract_total_count(&payload), Some(9));

    let payload = json!({"meta": {"total": null, "count": 4}});
    assert_eq!(extract_total_count(&payload), Some(4));

    assert_eq!(extract_total_count(&json!([{"total": 1}])), None);
    assert_eq!(extract_total_count(&json!({"total": -3})), None);
}

// ============================================================================
// Batched Normalization Tests
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
struct Item {
    id: String,
    index: usize,
    saw_flag: bool,
}

impl Entity for Item {
    fn id(&self) -> &str {
        &self.id
    }
}

fn raw_items(n: usize) -> Vec<Value> {
    (0..n).map(|i| json!({"id": format!("raw-{i}")})).collect()
}

#[test]
fn test_map_in_batches_preserves_order_and_indices() {
    let normalizer = |raw: &Value, index: usize| Item {
        id: raw["id"].as_str().unwrap_or_default().to_string(),
        index,
        saw_flag: false,
    };

    let items = tokio_test::block_on(map_in_batches(&normalizer, &raw_items(7), 20, 3));

    assert_eq!(items.len(), 7);
    let ids: Vec<&str> = items.iter().map(|i| i.id.as_str()).collect();
    assert_eq!(
        ids,
        vec!["raw-0", "raw-1", "raw-2", "raw-3", "raw-4", "raw-5", "raw-6"]
    );
    let indices: Vec<usize> = items.iter().map(|i| i.index).collect();
    assert_eq!(indices, (20..27).collect::<Vec<_>>());
}

#[test]
fn test_map_in_batches_empty_and_zero_batch() {
    let normalizer = |_: &Value, index: usize| Item {
        id: format!("i{index}"),
        index,
        saw_flag: false,
    };

    let items = tokio_test::block_on(map_in_batches(&normalizer, &[], 0, 40));
    assert!(items.is_empty());

    let items = tokio_test::block_on(map_in_batches(&normalizer, &raw_items(3), 0, 0));
    assert_eq!(items.len(), 3);
}

#[tokio::test]
async fn test_map_in_batches_yields_between_slices() {
    let flag = Arc::new(AtomicBool::new(false));
    let seen = Arc::clone(&flag);
    let normalizer = move |_: &Value, index: usize| Item {
        id: format!("i{index}"),
        index,
        saw_flag: seen.load(Ordering::SeqCst),
    };

    let setter = Arc::clone(&flag);
    let handle = tokio::spawn(async move { setter.store(true, Ordering::SeqCst) });

    // Current-thread runtime: the spawned task can only run at a yield point
    let items = map_in_batches(&normalizer, &raw_items(5), 0, 2).await;
    handle.await.unwrap();

    let observed: Vec<bool> = items.iter().map(|i| i.saw_flag).collect();
    assert_eq!(observed, vec![false, false, true, true, true]);
}

#[tokio::test]
async fn test_map_in_batches_single_slice_does_not_yield() {
    let flag = Arc::new(AtomicBool::new(false));
    let seen = Arc::clone(&flag);
    let normalizer = move |_: &Value, index: usize| Item {
        id: format!("i{index}"),
        index,
        saw_flag: seen.load(Ordering::SeqCst),
    };

    let setter = Arc::clone(&flag);
    let handle = tokio::spawn(async move { setter.store(true, Ordering::SeqCst) });

    let items = map_in_batches(&normalizer, &raw_items(4), 0, DEFAULT_BATCH_SIZE).await;
    handle.await.unwrap();

    assert!(items.iter().all(|i| !i.saw_flag));
}
