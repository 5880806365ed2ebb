//! Pagination types
//!
//! The list-session state exposed to the UI and the modes a page load can run in.

use std::fmt;

/// Why a page is being loaded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LoadMode {
    /// First page of a fresh session
    Initial,
    /// Replace the list in place (pull-to-refresh, retry with data)
    Refresh,
    /// Append the next page (scroll to end)
    LoadMore,
    /// Background fetch ahead of the user
    Prefetch,
}

impl LoadMode {
    /// Whether a successful load in this mode may schedule a prefetch
    pub fn triggers_prefetch(self) -> bool {
        !matches!(self, LoadMode::Prefetch)
    }

    /// Whether this mode drives the `is_loading_more` flag
    pub fn is_append(self) -> bool {
        matches!(self, LoadMode::LoadMore | LoadMode::Prefetch)
    }
}

impl fmt::Display for LoadMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadMode::Initial => write!(f, "initial"),
            LoadMode::Refresh => write!(f, "refresh"),
            LoadMode::LoadMore => write!(f, "load-more"),
            LoadMode::Prefetch => write!(f, "prefetch"),
        }
    }
}

/// State of one list session, as seen by the UI
#[derive(Debug, Clone, PartialEq)]
pub struct PaginationState<E> {
    /// Entities in display order, unique by id
    pub data: Vec<E>,
    /// Last successfully loaded page (0 before the first load)
    pub current_page: u32,
    /// First page of a fresh session is loading
    pub is_loading: bool,
    /// A subsequent page is loading
    pub is_loading_more: bool,
    /// The list is being replaced in place
    pub is_refreshing: bool,
    /// Another page is believed to exist
    pub has_more: bool,
    /// Last fatal fetch error
    pub error: Option<String>,
    /// Server-reported total, for display only
    pub total_count: Option<u64>,
}

impl<E> PaginationState<E> {
    /// State at the start of a session
    pub fn new() -> Self {
        Self {
            data: Vec::new(),
            current_page: 0,
            is_loading: true,
            is_loading_more: false,
            is_refreshing: false,
            has_more: true,
            error: None,
            total_count: None,
        }
    }

    /// Whether any load is showing a spinner
    pub fn is_busy(&self) -> bool {
        self.is_loading || self.is_loading_more || self.is_refreshing
    }

    /// Number of entities loaded
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Check if no entities are loaded
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl<E> Default for PaginationState<E> {
    fn default() -> Self {
        Self::new()
    }
}
