//! Integration tests using mock HTTP server
//!
//! Tests the full flow: config → HTTP requests → unwrap/normalize → list state

use barscout::{
    AppConfig, BarNormalizer, Coordinates, Filters, HttpPageFetcher, LoadMode, LoadOptions,
    LoadOutcome, PageLoader, PagingConfig,
};
use barscout::types::DistanceUnit;
use serde_json::{json, Value};
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const HERE: Coordinates = Coordinates::new(40.7128, -74.006);

fn bars(prefix: &str, count: usize) -> Vec<Value> {
    (0..count)
        .map(|i| {
            json!({
                "id": format!("{prefix}-{i}"),
                "name": format!("Bar {i}"),
                "location": {"lat": 40.71, "lng": -74.0},
                "tags": [{"name": "jazz"}, "dive"],
                "distance": 0.3,
            })
        })
        .collect()
}

fn config_for(server: &MockServer, paging: PagingConfig) -> AppConfig {
    AppConfig {
        endpoint: format!("{}/api/bars", server.uri()),
        paging,
        ..AppConfig::default()
    }
}

fn paging(page_size: usize, prefetch_pages: u32) -> PagingConfig {
    PagingConfig {
        initial_page_size: page_size,
        page_size,
        prefetch_pages,
        ..PagingConfig::default()
    }
}

fn loader_for(config: &AppConfig) -> PageLoader<BarNormalizer> {
    let fetcher = HttpPageFetcher::from_config(config).unwrap();
    PageLoader::builder(Arc::new(fetcher), BarNormalizer)
        .paging(config.paging.clone())
        .filters(config.filters.clone())
        .coordinates(HERE)
        .build()
}

// ============================================================================
// Paging
// ============================================================================

#[tokio::test]
async fn test_two_pages_end_to_end() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/bars"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {"items": bars("p1", 10)},
            "meta": {"pagination": {"has_next_page": true, "total": 14}}
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/bars"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"bars": bars("p2", 4)})))
        .expect(1)
        .mount(&server)
        .await;

    let loader = loader_for(&config_for(&server, paging(10, 0)));

    let first = loader
        .load_page(1, LoadMode::Initial, LoadOptions::default())
        .await;
    assert_eq!(
        first,
        LoadOutcome::Loaded {
            received: 10,
            has_more: true
        }
    );
    assert_eq!(loader.state().total_count, Some(14));

    let second = loader.load_more().await;
    assert_eq!(
        second,
        LoadOutcome::Loaded {
            received: 4,
            has_more: false
        }
    );

    let state = loader.state();
    assert_eq!(state.len(), 14);
    assert_eq!(state.current_page, 2);
    assert!(!state.has_more);
    assert!(state.error.is_none());

    let bar = &state.data[0];
    assert_eq!(bar.id, "p1-0");
    assert_eq!(bar.coordinates, Some(Coordinates::new(40.71, -74.0)));
    assert_eq!(bar.tags, vec!["jazz", "dive"]);

    assert_eq!(loader.load_more().await, LoadOutcome::Skipped);
}

#[tokio::test]
async fn test_query_parameters_sent() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/bars"))
        .and(query_param("lat", "40.7128"))
        .and(query_param("lon", "-74.006"))
        .and(query_param("page", "1"))
        .and(query_param("limit", "10"))
        .and(query_param("unit", "km"))
        .and(query_param("open_now", "true"))
        .and(query_param("tags", "dive,jazz"))
        .and(query_param("include", "tags"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let mut config = config_for(&server, paging(10, 0));
    config.filters = Filters {
        selected_tags: vec!["jazz".to_string(), "dive".to_string()],
        open_now: true,
        unit: DistanceUnit::Km,
        include_tags: true,
    };
    let loader = loader_for(&config);

    let outcome = loader
        .load_page(1, LoadMode::Initial, LoadOptions::default())
        .await;
    assert_eq!(
        outcome,
        LoadOutcome::Loaded {
            received: 0,
            has_more: false
        }
    );
}

#[tokio::test]
async fn test_prefetch_requests_next_page() {
    let server = MockServer::start().await;

    for page in 1..=2 {
        Mock::given(method("GET"))
            .and(path("/api/bars"))
            .and(query_param("page", page.to_string()))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"results": bars(&format!("p{page}"), 5)})),
            )
            .expect(1)
            .mount(&server)
            .await;
    }

    let loader = loader_for(&config_for(&server, paging(5, 1)));
    let mut updates = loader.subscribe();

    loader
        .load_page(1, LoadMode::Initial, LoadOptions::default())
        .await;

    tokio::time::timeout(Duration::from_secs(5), async {
        while updates.borrow_and_update().current_page < 2 {
            updates.changed().await.unwrap();
        }
    })
    .await
    .expect("prefetch did not land");

    assert_eq!(loader.state().len(), 10);
}

// ============================================================================
// Cache
// ============================================================================

#[tokio::test]
async fn test_second_load_served_from_cache() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/bars"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"items": bars("p1", 3)})))
        .expect(1)
        .mount(&server)
        .await;

    let loader = loader_for(&config_for(&server, paging(10, 0)));

    let first = loader
        .load_page(1, LoadMode::Initial, LoadOptions::default())
        .await;
    assert!(first.is_loaded());

    let second = loader
        .load_page(1, LoadMode::Initial, LoadOptions::default())
        .await;
    assert_eq!(second, LoadOutcome::CacheHit);
    assert_eq!(loader.state().len(), 3);
}

// ============================================================================
// Failures
// ============================================================================

#[tokio::test]
async fn test_server_error_surfaces_status() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/bars"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let loader = loader_for(&config_for(&server, paging(10, 0)));

    let outcome = loader
        .load_page(1, LoadMode::Initial, LoadOptions::default())
        .await;
    assert!(matches!(outcome, LoadOutcome::Failed { .. }));

    let state = loader.state();
    let error = state.error.unwrap();
    assert!(error.contains("500"));
    assert!(error.contains("boom"));
    assert!(!state.is_loading);
}

#[tokio::test]
async fn test_unrecognised_payload_is_empty_page() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/bars"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"weird": {"shape": 1}})))
        .mount(&server)
        .await;

    let loader = loader_for(&config_for(&server, paging(10, 0)));

    let outcome = loader
        .load_page(1, LoadMode::Initial, LoadOptions::default())
        .await;
    assert_eq!(
        outcome,
        LoadOutcome::Loaded {
            received: 0,
            has_more: false
        }
    );
    assert!(loader.state().error.is_none());
}

#[tokio::test]
async fn test_non_json_body_is_an_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/bars"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&server)
        .await;

    let loader = loader_for(&config_for(&server, paging(10, 0)));

    let outcome = loader
        .load_page(1, LoadMode::Initial, LoadOptions::default())
        .await;
    let LoadOutcome::Failed { message } = outcome else {
        panic!("expected failure, got {outcome:?}");
    };
    assert!(message.contains("decode"));
}

// ============================================================================
// Config
// ============================================================================

#[tokio::test]
async fn test_config_file_drives_client() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v2/bars"))
        .and(header("X-Api-Key", "secret"))
        .and(query_param("limit", "7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": bars("p1", 7)})))
        .expect(1)
        .mount(&server)
        .await;

    let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
    write!(
        file,
        "endpoint: {}/v2/bars\nhttp:\n  headers:\n    X-Api-Key: secret\npaging:\n  initial_page_size: 7\n  prefetch_pages: 0\n",
        server.uri()
    )
    .unwrap();

    let config = AppConfig::from_file(file.path()).unwrap();
    let loader = loader_for(&config);

    let outcome = loader
        .load_page(1, LoadMode::Initial, LoadOptions::default())
        .await;
    assert_eq!(
        outcome,
        LoadOutcome::Loaded {
            received: 7,
            has_more: true
        }
    );
}
