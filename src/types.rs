//! Common types used throughout barscout
//!
//! This module contains shared type definitions and utility types used
//! across multiple modules.

use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Coordinates
// ============================================================================

/// A latitude/longitude pair in decimal degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    /// Latitude
    pub lat: f64,
    /// Longitude
    pub lon: f64,
}

impl Coordinates {
    /// Create a new coordinate pair
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Check that both components are finite and within range
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lon.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lon)
    }
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.5},{:.5}", self.lat, self.lon)
    }
}

/// Fallback location used when the device never reported a position
pub const DEFAULT_COORDINATES: Coordinates = Coordinates::new(40.7128, -74.0060);

// ============================================================================
// Distance Unit
// ============================================================================

/// Unit the backend should report distances in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DistanceUnit {
    #[default]
    Miles,
    #[serde(alias = "kilometers")]
    Km,
}

impl DistanceUnit {
    /// Query parameter value for this unit
    pub fn as_str(&self) -> &'static str {
        match self {
            DistanceUnit::Miles => "miles",
            DistanceUnit::Km => "km",
        }
    }
}

impl fmt::Display for DistanceUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Filters
// ============================================================================

/// User-selected filters applied to the bars feed
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Filters {
    /// Tags the user selected (order does not matter)
    pub selected_tags: Vec<String>,
    /// Only return bars that are open right now
    pub open_now: bool,
    /// Distance unit
    pub unit: DistanceUnit,
    /// Ask the backend to embed tag objects in each bar
    pub include_tags: bool,
}

impl Filters {
    /// Create empty filters
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the selected tags
    #[must_use]
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.selected_tags = tags.into_iter().map(Into::into).collect();
        self
    }

    /// Set the open-now flag
    #[must_use]
    pub fn with_open_now(mut self, open_now: bool) -> Self {
        self.open_now = open_now;
        self
    }

    /// Set the distance unit
    #[must_use]
    pub fn with_unit(mut self, unit: DistanceUnit) -> Self {
        self.unit = unit;
        self
    }

    /// Selected tags, trimmed, deduplicated and sorted
    pub fn sorted_tags(&self) -> Vec<String> {
        let mut tags: Vec<String> = self
            .selected_tags
            .iter()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .collect();
        tags.sort();
        tags.dedup();
        tags
    }
}
