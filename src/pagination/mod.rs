//! Pagination module
//!
//! # Overview
//!
//! - [`PaginationState`] is the list-session state the UI renders from
//! - [`LoadMode`] tells the loader which flags a page load drives
//! - [`oracle`] decides whether another page exists from whatever metadata
//!   the server sent, falling back to a page-size heuristic

pub mod oracle;
mod types;

pub use oracle::{decide, has_more, Evidence};
pub use types::{LoadMode, PaginationState};
