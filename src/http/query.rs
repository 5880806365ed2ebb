//! Query string construction
//!
//! Parameters keep insertion order. Undefined (`None`) and empty values are
//! dropped when the string is rendered.

use url::form_urlencoded::byte_serialize;

/// Ordered set of query parameters
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    params: Vec<(String, Option<String>)>,
}

impl QueryParams {
    /// Create an empty parameter set
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a parameter. Setting an existing key replaces its value in place.
    #[must_use]
    pub fn set(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.insert(key.into(), Some(value.to_string()));
        self
    }

    /// Add a parameter that may be undefined
    #[must_use]
    pub fn set_opt<V: ToString>(mut self, key: impl Into<String>, value: Option<V>) -> Self {
        self.insert(key.into(), value.map(|v| v.to_string()));
        self
    }

    fn insert(&mut self, key: String, value: Option<String>) {
        if let Some(slot) = self.params.iter_mut().find(|(k, _)| *k == key) {
            slot.1 = value;
        } else {
            self.params.push((key, value));
        }
    }

    /// Get the value of a parameter, if defined
    pub fn get(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k == key)
            .and_then(|(_, v)| v.as_deref())
    }

    /// Number of parameters, including undefined ones
    pub fn len(&self) -> usize {
        self.params.len()
    }

    /// Check if there are no parameters
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Render as `key=value&...`
    pub fn build(&self) -> String {
        build_query(
            self.params
                .iter()
                .map(|(k, v)| (k.as_str(), v.as_deref())),
        )
    }
}

/// Render `(key, value)` pairs as a percent-encoded query string.
///
/// Pairs whose value is `None` or empty are skipped.
pub fn build_query<'a, I>(params: I) -> String
where
    I: IntoIterator<Item = (&'a str, Option<&'a str>)>,
{
    params
        .into_iter()
        .filter_map(|(key, value)| match value {
            Some(v) if !v.is_empty() => Some(format!("{}={}", encode(key), encode(v))),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("&")
}

// form encoding writes spaces as '+'; a literal '+' is already %2B
fn encode(s: &str) -> String {
    byte_serialize(s.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}
