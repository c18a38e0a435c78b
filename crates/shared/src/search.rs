//! Case-insensitive substring search used by list filters.

/// A lowercased search needle.
///
/// An empty query matches everything, so list views can pass the raw
/// search box contents straight through.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    needle: String,
}

impl SearchQuery {
    pub fn new(query: &str) -> Self {
        Self {
            needle: query.to_lowercase(),
        }
    }

    /// Builds a query from an optional parameter; `None` behaves like `""`.
    pub fn from_optional(query: Option<&str>) -> Self {
        Self::new(query.unwrap_or_default())
    }

    pub fn is_empty(&self) -> bool {
        self.needle.is_empty()
    }

    /// Returns true if `haystack` contains the needle, ignoring case.
    pub fn matches(&self, haystack: &str) -> bool {
        self.is_empty() || haystack.to_lowercase().contains(&self.needle)
    }

    /// Returns true if any of the given fields contains the needle.
    pub fn matches_any(&self, fields: &[&str]) -> bool {
        self.is_empty() || fields.iter().any(|field| self.matches(field))
    }
}
