//! Engine configuration.
//!
//! The shipping zone table and the catalog field declarations are loaded
//! externally by the host (site configuration, an admin panel export) and
//! handed to the engine read-only. All configuration types deserialize from
//! plain JSON documents.

use cartwheel_core::ZoneId;
use serde::{Deserialize, Serialize};

use crate::enrich::FieldTable;
use crate::shipping::ShippingZone;

/// Read-only engine configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Shipping zones in match order.
    #[serde(default)]
    pub shipping_zones: Vec<ShippingZone>,
    /// Declared kinds of catalog product fields, consumed by the
    /// enrichment pass.
    #[serde(default)]
    pub product_fields: FieldTable,
}

impl EngineConfig {
    /// Look up a configured zone by id.
    #[must_use]
    pub fn zone(&self, id: &ZoneId) -> Option<&ShippingZone> {
        self.shipping_zones.iter().find(|z| &z.id == id)
    }

    /// Parse a configuration document from JSON.
    ///
    /// # Errors
    ///
    /// Returns the underlying `serde_json` error when the document does not
    /// match the configuration schema.
    pub fn from_json_str(raw: &str) -> serde_json::Result<Self> {
        serde_json::from_str(raw)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::shipping::ZoneKind;

    #[test]
    fn test_parse_config_document() {
        let config = EngineConfig::from_json_str(
            r#"{
                "shipping_zones": [
                    {
                        "id": "domestic",
                        "type": "country-list",
                        "countries": ["US", "CA"],
                        "price_rates": [
                            {"name": "Standard", "min": "0", "rate": "5"},
                            {"name": "Free over 50", "min": "50", "rate": "0"}
                        ],
                        "weight_rates": [
                            {"name": "Freight", "min": "10", "rate": "40"}
                        ]
                    },
                    {"id": "world", "type": "rest"}
                ],
                "product_fields": {
                    "brand": {"kind": "relation", "cardinality": "single"},
                    "collections": {"kind": "relation", "cardinality": "many"}
                }
            }"#,
        )
        .unwrap();

        assert_eq!(config.shipping_zones.len(), 2);
        let domestic = config.zone(&ZoneId::new("domestic")).unwrap();
        assert_eq!(domestic.kind, ZoneKind::CountryList);
        assert_eq!(domestic.price_rates.len(), 2);
        assert_eq!(config.zone(&ZoneId::new("world")).unwrap().kind, ZoneKind::Rest);
        assert!(config.zone(&ZoneId::new("nope")).is_none());
    }

    #[test]
    fn test_empty_document_defaults() {
        let config = EngineConfig::from_json_str("{}").unwrap();
        assert!(config.shipping_zones.is_empty());
    }
}
