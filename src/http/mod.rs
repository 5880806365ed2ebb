//! HTTP client module
//!
//! Provides the HTTP client used to reach the bars endpoint.
//!
//! # Features
//!
//! - **Query Building**: Ordered, percent-encoded query strings that skip undefined values
//! - **Throttling**: Governor token bucket shared by all page requests
//! - **Status Handling**: Non-2xx responses surface as errors with the status code

mod client;
mod query;
mod throttle;

pub use client::{HttpClient, HttpClientConfig, HttpClientConfigBuilder};
pub use query::{build_query, QueryParams};
pub use throttle::{RequestThrottle, ThrottleConfig};
