//! Country code wrapper for shipping destinations.

use serde::{Deserialize, Serialize};

/// An ISO 3166-1 alpha-2 country code (e.g., "US", "FR").
///
/// Directory addresses store the destination as a composite
/// `"COUNTRY|Region"` field; [`CountryCode::split_composite`] separates the
/// two parts.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CountryCode(String);

impl CountryCode {
    /// Create a country code from a string value.
    #[must_use]
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    /// Get the underlying string value.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Split a composite `"COUNTRY|Region"` value into a country code and an
    /// optional region name.
    #[must_use]
    pub fn split_composite(raw: &str) -> (Self, Option<String>) {
        match raw.split_once('|') {
            Some((country, region)) => (Self::new(country), Some(region.to_string())),
            None => (Self::new(raw), None),
        }
    }
}

impl std::fmt::Display for CountryCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for CountryCode {
    fn from(code: &str) -> Self {
        Self::new(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_composite_with_region() {
        let (country, region) = CountryCode::split_composite("US|California");
        assert_eq!(country.as_str(), "US");
        assert_eq!(region.as_deref(), Some("California"));
    }

    #[test]
    fn test_split_composite_without_region() {
        let (country, region) = CountryCode::split_composite("FR");
        assert_eq!(country.as_str(), "FR");
        assert_eq!(region, None);
    }
}
