//! Page fetching seam
//!
//! [`PageLoader`](super::PageLoader) never talks to reqwest directly. It hands a
//! query to a [`PageFetcher`], which lets tests script responses and gate
//! their completion.

use crate::config::AppConfig;
use crate::error::Result;
use crate::http::{HttpClient, QueryParams};
use crate::types::{Coordinates, Filters};
use async_trait::async_trait;
use serde_json::Value;

/// Source of raw page payloads
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetch one page. Any non-2xx response must be an error.
    async fn fetch_page(&self, query: &QueryParams) -> Result<Value>;
}

/// Fetches pages from the bars endpoint over HTTP
pub struct HttpPageFetcher {
    client: HttpClient,
    endpoint: String,
}

impl HttpPageFetcher {
    /// Create a fetcher for `endpoint`
    pub fn new(client: HttpClient, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }

    /// Build the client and endpoint from application config
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let client = HttpClient::with_config(config.http.client_config())?;
        Ok(Self::new(client, config.endpoint.clone()))
    }

    /// Endpoint URL
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl PageFetcher for HttpPageFetcher {
    async fn fetch_page(&self, query: &QueryParams) -> Result<Value> {
        self.client.get_json(&self.endpoint, query).await
    }
}

/// Query for one page of bars around `coordinates`
pub fn page_query(coordinates: &Coordinates, filters: &Filters, page: u32, limit: usize) -> QueryParams {
    let tags = filters.sorted_tags();

    QueryParams::new()
        .set("lat", coordinates.lat)
        .set("lon", coordinates.lon)
        .set("page", page)
        .set("limit", limit)
        .set("unit", filters.unit)
        .set_opt("open_now", filters.open_now.then_some("true"))
        .set_opt("tags", (!tags.is_empty()).then(|| tags.join(",")))
        .set_opt("include", filters.include_tags.then_some("tags"))
}
