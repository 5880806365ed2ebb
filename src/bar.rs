//! Bar entity and its defensive normalizer
//!
//! The backend has shipped several spellings for the same field over time.
//! Every accessor below tries a list of candidate keys and falls back to a
//! default instead of failing.

use crate::decode::unwrap::probe;
use crate::decode::{Entity, Normalizer};
use crate::types::Coordinates;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A bar as shown in the list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    /// Stable identifier (synthetic `bar-<n>` when the payload has none)
    pub id: String,
    /// Display name
    pub name: String,
    /// Street address
    pub address: Option<String>,
    /// Position of the venue
    pub coordinates: Option<Coordinates>,
    /// Distance from the user in the requested unit
    pub distance: Option<f64>,
    /// Average rating
    pub rating: Option<f64>,
    /// Whether the bar is open right now
    pub is_open: Option<bool>,
    /// Tag names
    pub tags: Vec<String>,
    /// Cover image
    pub image_url: Option<String>,
}

impl Entity for Bar {
    fn id(&self) -> &str {
        &self.id
    }
}

/// Normalizer for raw bar payloads
#[derive(Debug, Clone, Copy, Default)]
pub struct BarNormalizer;

const ID_KEYS: &[&[&str]] = &[&["id"], &["_id"], &["uuid"], &["bar_id"], &["barId"]];
const NAME_KEYS: &[&[&str]] = &[&["name"], &["title"], &["bar_name"], &["barName"]];
const ADDRESS_KEYS: &[&[&str]] = &[
    &["address"],
    &["formatted_address"],
    &["location", "address"],
    &["street"],
];
const LAT_KEYS: &[&[&str]] = &[
    &["lat"],
    &["latitude"],
    &["location", "lat"],
    &["location", "latitude"],
];
const LON_KEYS: &[&[&str]] = &[
    &["lon"],
    &["lng"],
    &["longitude"],
    &["location", "lon"],
    &["location", "lng"],
    &["location", "longitude"],
];
const DISTANCE_KEYS: &[&[&str]] = &[&["distance"], &["distance_miles"], &["distance_km"]];
const RATING_KEYS: &[&[&str]] = &[&["rating"], &["avg_rating"], &["average_rating"]];
const OPEN_KEYS: &[&[&str]] = &[&["is_open"], &["isOpen"], &["open_now"], &["openNow"]];
const IMAGE_KEYS: &[&[&str]] = &[
    &["image_url"],
    &["imageUrl"],
    &["image"],
    &["photo"],
    &["cover_image"],
];

impl Normalizer for BarNormalizer {
    type Output = Bar;

    fn normalize(&self, raw: &Value, index: usize) -> Bar {
        let id = first_string(raw, ID_KEYS).unwrap_or_else(|| format!("bar-{index}"));
        let name = first_string(raw, NAME_KEYS).unwrap_or_else(|| "Unnamed bar".to_string());

        Bar {
            id,
            name,
            address: first_string(raw, ADDRESS_KEYS),
            coordinates: coordinates(raw),
            distance: first_f64(raw, DISTANCE_KEYS),
            rating: first_f64(raw, RATING_KEYS),
            is_open: first_bool(raw, OPEN_KEYS),
            tags: tags(raw),
            image_url: first_string(raw, IMAGE_KEYS),
        }
    }
}

fn first_string(raw: &Value, paths: &[&[&str]]) -> Option<String> {
    paths.iter().find_map(|path| match probe(raw, path)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

fn first_f64(raw: &Value, paths: &[&[&str]]) -> Option<f64> {
    paths.iter().find_map(|path| match probe(raw, path)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    })
}

fn first_bool(raw: &Value, paths: &[&[&str]]) -> Option<bool> {
    paths.iter().find_map(|path| match probe(raw, path)? {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => n.as_i64().map(|n| n != 0),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" => Some(true),
            "false" | "0" | "no" => Some(false),
            _ => None,
        },
        _ => None,
    })
}

fn coordinates(raw: &Value) -> Option<Coordinates> {
    if let (Some(lat), Some(lon)) = (first_f64(raw, LAT_KEYS), first_f64(raw, LON_KEYS)) {
        return Some(Coordinates::new(lat, lon)).filter(Coordinates::is_valid);
    }

    // GeoJSON point order: [lon, lat]
    let point = probe(raw, &["location", "coordinates"])
        .or_else(|| probe(raw, &["coordinates"]))?
        .as_array()?;
    match point.as_slice() {
        [lon, lat, ..] => Some(Coordinates::new(lat.as_f64()?, lon.as_f64()?))
            .filter(Coordinates::is_valid),
        _ => None,
    }
}

fn tags(raw: &Value) -> Vec<String> {
    let Some(items) = probe(raw, &["tags"]).and_then(Value::as_array) else {
        return Vec::new();
    };

    items
        .iter()
        .filter_map(|tag| match tag {
            Value::String(s) => Some(s.trim().to_string()),
            Value::Object(obj) => obj
                .get("name")
                .or_else(|| obj.get("label"))
                .and_then(Value::as_str)
                .map(|s| s.trim().to_string()),
            _ => None,
        })
        .filter(|s| !s.is_empty())
        .collect()
}
