//! Consumer-facing product payload enrichment.
//!
//! The stored cart references products by id only; the recalculated view
//! attaches the full product payload to each item. Before the payload is
//! attached, administrative fields are stripped, and relation fields -
//! catalog fields holding entry ids - are replaced by the resolved entries,
//! one level deep. Which fields are relations, and whether they hold one id
//! or many, is declared by a [`FieldTable`] supplied with the engine
//! configuration rather than discovered by inspecting untyped data.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use crate::catalog::{Product, ProductCatalog};

/// Administrative fields removed from every consumer-facing payload,
/// for products and resolved relation entries alike.
const STRIPPED_FIELDS: &[&str] = &[
    "columns",
    "products",
    "is_entry",
    "order",
    "order_type",
    "content",
    "content_raw",
    "listing_image",
    "listing_type",
    "listing_vendor",
    "listing_inventory",
    "edit_url",
    "uri",
    "url_path",
];

// =============================================================================
// Field Declarations
// =============================================================================

/// How many entry ids a relation field holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Cardinality {
    /// The field holds a single entry id.
    Single,
    /// The field holds a list of entry ids.
    Many,
}

/// Declared kind of a catalog field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum FieldKind {
    /// The field references other catalog entries by id.
    Relation {
        /// Single id or list of ids.
        cardinality: Cardinality,
    },
}

/// Declarative table of catalog field kinds.
///
/// Only declared fields are touched by the enrichment pass; everything else
/// in the payload is passed through untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldTable {
    fields: HashMap<String, FieldKind>,
}

impl FieldTable {
    /// Create an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a relation field (builder style).
    #[must_use]
    pub fn with_relation(mut self, name: impl Into<String>, cardinality: Cardinality) -> Self {
        self.fields
            .insert(name.into(), FieldKind::Relation { cardinality });
        self
    }

    /// Iterate declared fields.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &FieldKind)> {
        self.fields.iter()
    }
}

// =============================================================================
// Enrichment Pass
// =============================================================================

/// Remove administrative fields from a raw entry.
fn strip(entry: &mut Map<String, Value>) {
    for field in STRIPPED_FIELDS {
        entry.remove(*field);
    }
}

/// Resolve a relation target and strip it for display.
fn resolve_entry(catalog: &impl ProductCatalog, id: &str) -> Option<Map<String, Value>> {
    let mut entry = catalog.find_entry(id)?;
    strip(&mut entry);
    Some(entry)
}

/// Replace an id with its resolved entry, leaving the id in place when the
/// entry no longer exists.
fn resolve_element(catalog: &impl ProductCatalog, element: &Value) -> Option<Value> {
    let id = element.as_str()?;
    resolve_entry(catalog, id).map(Value::Object)
}

/// Build the consumer-facing payload for a product.
///
/// Serializes the product, strips administrative fields, and resolves the
/// declared relation fields one level deep: single-valued fields are
/// replaced by the resolved object, multi-valued fields have each element
/// replaced. Ids that no longer resolve stay in place untouched.
#[must_use]
pub fn product_payload(
    product: &Product,
    table: &FieldTable,
    catalog: &impl ProductCatalog,
) -> Map<String, Value> {
    let mut payload = match serde_json::to_value(product) {
        Ok(Value::Object(map)) => map,
        _ => Map::new(),
    };
    strip(&mut payload);

    for (name, kind) in table.iter() {
        let FieldKind::Relation { cardinality } = kind;

        // Declared fields may simply be empty on this product
        let Some(value) = payload.get(name).cloned() else {
            continue;
        };

        let replaced = match cardinality {
            Cardinality::Single => resolve_element(catalog, &value),
            Cardinality::Many => value.as_array().map(|elements| {
                Value::Array(
                    elements
                        .iter()
                        .map(|e| resolve_element(catalog, e).unwrap_or_else(|| e.clone()))
                        .collect(),
                )
            }),
        };

        match replaced {
            Some(resolved) => {
                payload.insert(name.clone(), resolved);
            }
            None => {
                debug!(field = %name, product = %product.id, "relation target not found, id left in place");
            }
        }
    }

    payload
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use cartwheel_core::ProductId;
    use serde_json::json;

    struct StubCatalog;

    impl ProductCatalog for StubCatalog {
        fn find_product(&self, _id: &ProductId) -> Option<Product> {
            None
        }

        fn find_entry(&self, id: &str) -> Option<Map<String, Value>> {
            match id {
                "brand-1" => {
                    let Value::Object(map) = json!({
                        "id": "brand-1",
                        "title": "Acme",
                        "edit_url": "/cp/brand-1"
                    }) else {
                        return None;
                    };
                    Some(map)
                }
                "col-a" => {
                    let Value::Object(map) = json!({"id": "col-a", "title": "Sale"}) else {
                        return None;
                    };
                    Some(map)
                }
                _ => None,
            }
        }
    }

    fn product() -> Product {
        serde_json::from_value(json!({
            "id": "prod-1",
            "class": "simple",
            "price": "19.99",
            "title": "Mug",
            "brand": "brand-1",
            "collections": ["col-a", "col-gone"],
            "edit_url": "/cp/prod-1",
            "listing_image": "mug.jpg"
        }))
        .unwrap()
    }

    fn table() -> FieldTable {
        FieldTable::new()
            .with_relation("brand", Cardinality::Single)
            .with_relation("collections", Cardinality::Many)
    }

    #[test]
    fn test_administrative_fields_stripped() {
        let payload = product_payload(&product(), &table(), &StubCatalog);
        assert!(payload.get("edit_url").is_none());
        assert!(payload.get("listing_image").is_none());
        assert_eq!(payload.get("title"), Some(&json!("Mug")));
    }

    #[test]
    fn test_single_relation_resolved_and_stripped() {
        let payload = product_payload(&product(), &table(), &StubCatalog);
        let brand = payload.get("brand").unwrap();
        assert_eq!(brand.get("title"), Some(&json!("Acme")));
        // The resolved entry is stripped with the same blacklist
        assert!(brand.get("edit_url").is_none());
    }

    #[test]
    fn test_many_relation_resolves_each_element() {
        let payload = product_payload(&product(), &table(), &StubCatalog);
        let collections = payload.get("collections").unwrap().as_array().unwrap();
        assert_eq!(collections.len(), 2);
        assert_eq!(collections.first().unwrap().get("title"), Some(&json!("Sale")));
        // Vanished targets keep their id in place
        assert_eq!(collections.get(1), Some(&json!("col-gone")));
    }

    #[test]
    fn test_undeclared_fields_untouched() {
        let empty = FieldTable::new();
        let payload = product_payload(&product(), &empty, &StubCatalog);
        assert_eq!(payload.get("brand"), Some(&json!("brand-1")));
    }
}
