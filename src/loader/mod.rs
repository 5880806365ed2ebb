//! Page loader module
//!
//! Orchestrates paginated loading of the bars feed.
//!
//! # Overview
//!
//! The loader module provides:
//! - `PageLoader` - Cache, concurrency budget, queue slot and cancellation for one list session
//! - `PageFetcher` - Seam between the loader and the network
//! - `HttpPageFetcher` - `PageFetcher` over the HTTP client
//! - `page_query` - Query parameters for one page
//!
//! # Lifecycle of a load
//!
//! ```text
//! load_page ─► cache hit ──────────────────────────────► state adopted
//!           ├► page already in flight ─────────────────► no-op
//!           ├► budget exhausted ─► queue slot (newest wins)
//!           └► fetch ─┬► success ─► merge, cache, maybe prefetch
//!                     ├► cancelled ─► nothing
//!                     └► error ─► state.error
//!                     then: release slot, reissue queued request
//! ```

mod fetcher;
mod page_loader;
mod types;

pub use fetcher::{page_query, HttpPageFetcher, PageFetcher};
pub use page_loader::{PageLoader, PageLoaderBuilder};
pub use types::{LoadOptions, LoadOutcome, PendingRequest};
