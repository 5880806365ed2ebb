// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::ref_option)]
#![allow(clippy::unused_self)]
#![allow(clippy::struct_excessive_bools)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::unnecessary_wraps)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::unused_async)]

//! # barscout
//!
//! Paginated, cached, location-aware loading of a "bars near me" feed.
//!
//! ## Features
//!
//! - **Tolerant decoding**: items and pagination metadata are probed from
//!   several known envelope shapes; anything unrecognised becomes an empty page
//! - **Continuation oracle**: decides whether another page exists from flags,
//!   page counts, next pointers or the page size
//! - **Bounded concurrency**: at most N fetches in flight, one queued request
//!   (newest wins), duplicate pages ignored
//! - **Cancellation**: refresh and retry cancel every in-flight page without
//!   touching the list
//! - **Caching**: one TTL slot keyed by rounded coordinates and selected tags
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use barscout::{AppConfig, BarNormalizer, HttpPageFetcher, LoadMode, LoadOptions, PageLoader};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> barscout::Result<()> {
//!     let config = AppConfig::from_file("bars.yaml")?;
//!     let fetcher = Arc::new(HttpPageFetcher::from_config(&config)?);
//!     let loader = PageLoader::builder(fetcher, BarNormalizer)
//!         .paging(config.paging.clone())
//!         .filters(config.filters.clone())
//!         .build();
//!
//!     loader.load_page(1, LoadMode::Initial, LoadOptions::default()).await;
//!     loader.load_more().await;
//!
//!     for bar in loader.state().data {
//!         println!("{}", bar.name);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//!   UI triggers: scroll end, pull to refresh, filter change, retry
//!                                │
//! ┌──────────────────────────────┴──────────────────────────────────┐
//! │                          PageLoader                             │
//! │  cache slot · in-flight pages · budget · queue slot · tokens    │
//! └──┬───────────┬─────────────┬─────────────┬────────────┬─────────┘
//!    │           │             │             │            │
//! ┌──┴──────┐ ┌──┴───────┐ ┌───┴───────┐ ┌───┴──────┐ ┌───┴───────┐
//! │  HTTP   │ │  Decode  │ │ Paginate  │ │  State   │ │ Location  │
//! ├─────────┤ ├──────────┤ ├───────────┤ ├──────────┤ ├───────────┤
//! │ Query   │ │ Unwrap   │ │ Oracle    │ │ Merge    │ │ Permission│
//! │ GET     │ │ Normalize│ │ LoadMode  │ │ Cache    │ │ TTL cache │
//! │ Throttle│ │ Batching │ │ State     │ │ Key      │ │ Fallback  │
//! └─────────┘ └──────────┘ └───────────┘ └──────────┘ └───────────┘
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types
pub mod error;

/// Common types and type aliases
pub mod types;

/// HTTP client, query building and rate limiting
pub mod http;

/// Payload unwrapping and entity normalization
pub mod decode;

/// Continuation decisions and list state
pub mod pagination;

/// Merge and cache of list state
pub mod state;

/// Device location
pub mod location;

/// Page orchestration
pub mod loader;

/// Bar entity
pub mod bar;

/// Application configuration
pub mod config;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, Result};
pub use types::*;

// Re-export commonly used types
pub use bar::{Bar, BarNormalizer};
pub use config::{AppConfig, PagingConfig};
pub use loader::{HttpPageFetcher, LoadOptions, LoadOutcome, PageFetcher, PageLoader};
pub use location::{LocationCache, LocationProvider, PermissionStatus};
pub use pagination::{LoadMode, PaginationState};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
