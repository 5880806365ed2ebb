//! Configuration types for a bars feed session
//!
//! Everything is optional in YAML/JSON; missing fields take the defaults
//! below. Call [`AppConfig::validate`] before building clients from it.

use crate::error::{Error, Result};
use crate::http::{HttpClientConfig, ThrottleConfig};
use crate::location::LOCATION_CACHE_TTL;
use crate::types::{Coordinates, Filters, DEFAULT_COORDINATES};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::time::Duration;

// ============================================================================
// Top-Level Config
// ============================================================================

/// Complete application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Bars endpoint, absolute URL
    pub endpoint: String,

    /// HTTP client settings
    pub http: HttpSettings,

    /// Paging, cache and concurrency settings
    pub paging: PagingConfig,

    /// Initial filter selection
    pub filters: Filters,

    /// Location settings
    pub location: LocationSettings,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:8080/api/bars".to_string(),
            http: HttpSettings::default(),
            paging: PagingConfig::default(),
            filters: Filters::default(),
            location: LocationSettings::default(),
        }
    }
}

impl AppConfig {
    /// Parse from a YAML string
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse from a JSON string
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a file. `.json` files are parsed as JSON, anything else as YAML.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::FileNotFound {
                    path: path.display().to_string(),
                }
            } else {
                Error::Io(e)
            }
        })?;

        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        if is_json {
            Self::from_json_str(&content)
        } else {
            Self::from_yaml_str(&content)
        }
    }

    /// Render as YAML
    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Check values that serde cannot
    pub fn validate(&self) -> Result<()> {
        if self.endpoint.trim().is_empty() {
            return Err(Error::missing_field("endpoint"));
        }
        let url = url::Url::parse(&self.endpoint)
            .map_err(|e| Error::invalid_value("endpoint", e.to_string()))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(Error::invalid_value(
                "endpoint",
                format!("unsupported scheme '{}'", url.scheme()),
            ));
        }

        if self.http.timeout_ms == 0 {
            return Err(Error::invalid_value("http.timeout_ms", "must be positive"));
        }

        self.paging.validate()?;

        if let Some(coordinates) = self.location.default_coordinates {
            if !coordinates.is_valid() {
                return Err(Error::invalid_value(
                    "location.default_coordinates",
                    format!("{coordinates} is out of range"),
                ));
            }
        }

        Ok(())
    }
}

// ============================================================================
// HTTP
// ============================================================================

/// HTTP client settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpSettings {
    /// Request timeout in milliseconds
    pub timeout_ms: u64,

    /// User agent override
    pub user_agent: Option<String>,

    /// Headers sent with every request
    pub headers: HashMap<String, String>,

    /// Client-side throttle, off when absent
    pub throttle: Option<ThrottleConfig>,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            timeout_ms: 30_000,
            user_agent: None,
            headers: HashMap::new(),
            throttle: None,
        }
    }
}

impl HttpSettings {
    /// Build the client config these settings describe
    pub fn client_config(&self) -> HttpClientConfig {
        let mut builder = HttpClientConfig::builder().timeout(Duration::from_millis(self.timeout_ms));
        if let Some(agent) = &self.user_agent {
            builder = builder.user_agent(agent.clone());
        }
        if let Some(throttle) = &self.throttle {
            builder = builder.throttle(throttle.clone());
        }
        for (key, value) in &self.headers {
            builder = builder.header(key.clone(), value.clone());
        }
        builder.build()
    }
}

// ============================================================================
// Paging
// ============================================================================

/// Paging, cache and concurrency settings for a list session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PagingConfig {
    /// Page size for page 1
    pub initial_page_size: usize,

    /// Page size for every later page
    pub page_size: usize,

    /// Most fetches allowed in flight at once
    pub max_concurrent_requests: usize,

    /// How far ahead a successful load prefetches (0 disables)
    pub prefetch_pages: u32,

    /// Cache lifetime in milliseconds
    pub cache_timeout_ms: u64,

    /// Items normalized between cooperative yields
    pub normalize_batch_size: usize,
}

impl Default for PagingConfig {
    fn default() -> Self {
        Self {
            initial_page_size: 20,
            page_size: 20,
            max_concurrent_requests: 2,
            prefetch_pages: 1,
            cache_timeout_ms: 300_000,
            normalize_batch_size: crate::decode::DEFAULT_BATCH_SIZE,
        }
    }
}

impl PagingConfig {
    /// Page size to request for `page`
    pub fn page_size_for(&self, page: u32) -> usize {
        if page <= 1 {
            self.initial_page_size
        } else {
            self.page_size
        }
    }

    /// Absolute index of the first item on `page`
    pub fn start_index_for(&self, page: u32) -> usize {
        if page <= 1 {
            0
        } else {
            (page as usize - 2)
                .saturating_mul(self.page_size)
                .saturating_add(self.initial_page_size)
        }
    }

    /// Cache lifetime
    pub fn cache_timeout(&self) -> Duration {
        Duration::from_millis(self.cache_timeout_ms)
    }

    fn validate(&self) -> Result<()> {
        let positive = [
            ("paging.initial_page_size", self.initial_page_size),
            ("paging.page_size", self.page_size),
            ("paging.max_concurrent_requests", self.max_concurrent_requests),
            ("paging.normalize_batch_size", self.normalize_batch_size),
        ];
        if let Some((field, _)) = positive.iter().find(|(_, value)| *value == 0) {
            return Err(Error::invalid_value(*field, "must be positive"));
        }
        Ok(())
    }
}

// ============================================================================
// Location
// ============================================================================

/// Location settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocationSettings {
    /// How long a device fix is reused, in milliseconds
    pub cache_ttl_ms: u64,

    /// Used when no fix was ever obtained
    pub default_coordinates: Option<Coordinates>,
}

impl Default for LocationSettings {
    fn default() -> Self {
        Self {
            cache_ttl_ms: LOCATION_CACHE_TTL.as_millis() as u64,
            default_coordinates: None,
        }
    }
}

impl LocationSettings {
    /// Fix lifetime
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_millis(self.cache_ttl_ms)
    }

    /// Configured fallback, or the built-in one
    pub fn fallback(&self) -> Coordinates {
        self.default_coordinates.unwrap_or(DEFAULT_COORDINATES)
    }
}
