//! Shipping zones, rate tables, and method eligibility.
//!
//! A destination country maps to a zone by scanning the configured zones in
//! order; the zone's price-rate and weight-rate tables are then evaluated
//! against the cart's current totals to produce the eligible methods. Both
//! tables are always evaluated: a cart can qualify for a price-based and a
//! weight-based method at the same time, and both are surfaced.

use cartwheel_core::{CountryCode, MethodKey, ZoneId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::cart::Totals;

// =============================================================================
// Zone Configuration
// =============================================================================

/// How a zone claims destination countries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ZoneKind {
    /// Zone matching an explicit set of countries.
    CountryList,
    /// Catch-all zone for countries no other zone claims.
    Rest,
}

/// A shipping method entry in a zone's rate table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingMethod {
    /// Display name. The method's identity is a normalized slug of this
    /// name, stable within the zone's combined rate tables.
    pub name: String,
    /// Lower bound on the compared total, inclusive. No bound when absent.
    #[serde(default)]
    pub min: Option<Decimal>,
    /// Upper bound on the compared total, inclusive. No bound when absent.
    #[serde(default)]
    pub max: Option<Decimal>,
    /// Shipping cost charged when this method is active.
    #[serde(default)]
    pub rate: Decimal,
}

/// A configured shipping zone with its rate tables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingZone {
    /// Zone id referenced by the cart's shipping selection.
    pub id: ZoneId,
    /// Country-list or catch-all.
    #[serde(rename = "type")]
    pub kind: ZoneKind,
    /// Countries this zone claims (country-list zones).
    #[serde(default)]
    pub countries: Vec<CountryCode>,
    /// Methods compared against the cart subtotal.
    #[serde(default)]
    pub price_rates: Vec<ShippingMethod>,
    /// Methods compared against the cart weight.
    #[serde(default)]
    pub weight_rates: Vec<ShippingMethod>,
}

// =============================================================================
// Method Keys
// =============================================================================

/// Normalize a method name into its slug key.
///
/// Lowercased alphanumeric runs joined by single dashes: `"Priority Mail"`
/// becomes `"priority-mail"`.
#[must_use]
pub fn slug(name: &str) -> MethodKey {
    let mut out = String::with_capacity(name.len());
    let mut pending_dash = false;
    for c in name.chars() {
        if c.is_alphanumeric() {
            if pending_dash && !out.is_empty() {
                out.push('-');
            }
            pending_dash = false;
            out.extend(c.to_lowercase());
        } else {
            pending_dash = true;
        }
    }
    MethodKey::new(out)
}

/// Eligible shipping methods keyed by name slug.
///
/// Preserves rate-table insertion order; inserting an existing key
/// overwrites the stored method in place, so later table entries win slug
/// ties without reordering.
#[derive(Debug, Clone, Default)]
pub struct MethodTable {
    entries: Vec<(MethodKey, ShippingMethod)>,
}

impl MethodTable {
    /// Create an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a method under `key`, overwriting any existing entry while
    /// keeping its original position.
    pub fn insert(&mut self, key: MethodKey, method: ShippingMethod) {
        if let Some(entry) = self.entries.iter_mut().find(|(k, _)| k == &key) {
            entry.1 = method;
        } else {
            self.entries.push((key, method));
        }
    }

    /// Look up a method by key.
    #[must_use]
    pub fn get(&self, key: &MethodKey) -> Option<&ShippingMethod> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, m)| m)
    }

    /// Whether the table holds the given key.
    #[must_use]
    pub fn contains(&self, key: &MethodKey) -> bool {
        self.get(key).is_some()
    }

    /// First key in table order.
    #[must_use]
    pub fn first_key(&self) -> Option<&MethodKey> {
        self.entries.first().map(|(k, _)| k)
    }

    /// Whether the table is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Iterate entries in table order.
    pub fn iter(&self) -> impl Iterator<Item = (&MethodKey, &ShippingMethod)> {
        self.entries.iter().map(|(k, m)| (k, m))
    }
}

// =============================================================================
// Resolution
// =============================================================================

/// Resolve the zone for a destination country.
///
/// The first zone whose country set contains the country wins; otherwise
/// the first catch-all zone, if one exists. `None` means shipping is
/// unavailable for this destination.
#[must_use]
pub fn resolve_zone<'a>(
    zones: &'a [ShippingZone],
    country: &CountryCode,
) -> Option<&'a ShippingZone> {
    zones
        .iter()
        .find(|zone| zone.countries.iter().any(|c| c == country))
        .or_else(|| zones.iter().find(|zone| zone.kind == ZoneKind::Rest))
}

/// Whether a method's bounds admit the compared total.
fn within_bounds(method: &ShippingMethod, total: Decimal) -> bool {
    method.min.is_none_or(|min| total >= min) && method.max.is_none_or(|max| total <= max)
}

/// Compute the eligible methods for a zone against the cart's totals.
///
/// Price rates are compared against the subtotal, weight rates against the
/// weight, in that order; slug collisions overwrite, so a weight-rate entry
/// replaces a price-rate entry of the same name.
#[must_use]
pub fn eligible_methods(zone: &ShippingZone, totals: &Totals) -> MethodTable {
    let mut table = MethodTable::new();

    let bases = [
        (&zone.price_rates, totals.subtotal),
        (&zone.weight_rates, totals.weight),
    ];

    for (rates, compared) in bases {
        for method in rates {
            if within_bounds(method, compared) {
                table.insert(slug(&method.name), method.clone());
            }
        }
    }

    table
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    fn d(value: &str) -> Decimal {
        value.parse().unwrap()
    }

    fn method(name: &str, min: Option<Decimal>, max: Option<Decimal>, rate: Decimal) -> ShippingMethod {
        ShippingMethod {
            name: name.to_string(),
            min,
            max,
            rate,
        }
    }

    fn zones() -> Vec<ShippingZone> {
        vec![
            ShippingZone {
                id: ZoneId::new("domestic"),
                kind: ZoneKind::CountryList,
                countries: vec![CountryCode::new("US")],
                price_rates: vec![
                    method("Standard", Some(d("0")), None, d("5")),
                    method("Free over 50", Some(d("50")), None, d("0")),
                ],
                weight_rates: vec![method("Freight", Some(d("10")), None, d("40"))],
            },
            ShippingZone {
                id: ZoneId::new("world"),
                kind: ZoneKind::Rest,
                countries: Vec::new(),
                price_rates: vec![method("International", None, None, d("15"))],
                weight_rates: Vec::new(),
            },
        ]
    }

    fn totals(subtotal: Decimal, weight: Decimal) -> Totals {
        Totals {
            subtotal,
            weight,
            ..Totals::default()
        }
    }

    #[test]
    fn test_slug_normalization() {
        assert_eq!(slug("Standard").as_str(), "standard");
        assert_eq!(slug("Priority Mail").as_str(), "priority-mail");
        assert_eq!(slug("Free over 50!").as_str(), "free-over-50");
        assert_eq!(slug("  DHL -- Express  ").as_str(), "dhl-express");
    }

    #[test]
    fn test_resolve_zone_exact_match_wins() {
        let zones = zones();
        let zone = resolve_zone(&zones, &CountryCode::new("US")).unwrap();
        assert_eq!(zone.id.as_str(), "domestic");
    }

    #[test]
    fn test_resolve_zone_falls_back_to_rest() {
        let zones = zones();
        let zone = resolve_zone(&zones, &CountryCode::new("FR")).unwrap();
        assert_eq!(zone.id.as_str(), "world");
    }

    #[test]
    fn test_resolve_zone_unshippable_without_rest() {
        let mut zones = zones();
        zones.retain(|z| z.kind != ZoneKind::Rest);
        assert!(resolve_zone(&zones, &CountryCode::new("FR")).is_none());
    }

    #[test]
    fn test_eligibility_bounds() {
        let free = method("Free", Some(d("50")), None, d("0"));
        assert!(!within_bounds(&free, d("49.99")));
        assert!(within_bounds(&free, d("50")));

        let light = method("Light", None, Some(d("10")), d("4"));
        assert!(within_bounds(&light, d("10")));
        assert!(!within_bounds(&light, d("10.01")));
    }

    #[test]
    fn test_eligible_methods_surfaces_both_bases() {
        let zones = zones();
        let table = eligible_methods(&zones[0], &totals(d("60"), d("12")));

        // Standard, Free over 50 (price) and Freight (weight) all match
        assert_eq!(table.len(), 3);
        let keys: Vec<_> = table.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, ["standard", "free-over-50", "freight"]);
    }

    #[test]
    fn test_slug_collision_overwrites_in_place() {
        let zone = ShippingZone {
            id: ZoneId::new("z"),
            kind: ZoneKind::Rest,
            countries: Vec::new(),
            price_rates: vec![
                method("Economy", None, None, d("3")),
                method("Courier", None, None, d("9")),
            ],
            weight_rates: vec![method("Economy", None, None, d("7"))],
        };

        let table = eligible_methods(&zone, &totals(d("10"), d("1")));

        // The weight-rate entry replaced the price-rate entry but kept its
        // original position ahead of Courier.
        assert_eq!(table.len(), 2);
        assert_eq!(table.first_key().unwrap().as_str(), "economy");
        assert_eq!(table.get(&slug("Economy")).unwrap().rate, d("7"));
    }
}
