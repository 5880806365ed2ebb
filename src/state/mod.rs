//! List state module
//!
//! Handles the pieces of list state that outlive a single request.
//!
//! # Overview
//!
//! The state module provides:
//! - `PageCache` - Single-slot TTL cache of the merged list
//! - `cache_key` - Key derivation from coordinates and tag selection
//! - `merge_entities` - Id-based merge of a page into the displayed list

mod cache;
mod merge;

pub use cache::{cache_key, CacheRecord, PageCache, DEFAULT_CACHE_TIMEOUT};
pub use merge::merge_entities;
