//! Response decoding module
//!
//! Turns a loosely-typed API response into entities.
//!
//! # Overview
//!
//! - [`unwrap`] locates the item array, pagination metadata and total count
//!   inside whatever envelope the backend returned
//! - [`normalize`] maps raw items to entities in cooperative batches

pub mod normalize;
pub mod unwrap;

pub use normalize::{map_in_batches, Entity, Normalizer, DEFAULT_BATCH_SIZE};
pub use unwrap::{extract_items, extract_pagination_meta, extract_total_count};

#[cfg(test)]
mod tests;
