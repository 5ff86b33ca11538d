//! Catalog and customer directory adapters.
//!
//! The engine never owns product or customer data; it consumes two lookup
//! interfaces and works with the plain value objects they return. Lookups
//! are synchronous and single-shot: callers must tolerate products
//! disappearing between cart add-time and read-time, and repeated lookups of
//! the same id within one recompute pass may hit the backing store again.

use cartwheel_core::{ProductId, VariantId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// =============================================================================
// Product Types
// =============================================================================

/// Product class: whether purchases select a variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductClass {
    /// Single-SKU product priced directly.
    Simple,
    /// Product sold through variants; a variant reference is required.
    Complex,
}

/// A product variant (specific purchasable combination).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variant {
    /// Variant id, unique within its product.
    pub id: VariantId,
    /// Unit price. Missing prices contribute nothing to totals.
    #[serde(default)]
    pub price: Option<Decimal>,
    /// Units in stock, when the product tracks inventory.
    #[serde(default)]
    pub inventory: Option<u32>,
    /// Catalog-defined display fields (option names, SKU, ...), passed
    /// through untouched.
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

/// A product as returned by the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Catalog product id.
    pub id: ProductId,
    /// Simple or complex.
    pub class: ProductClass,
    /// Unit price for simple products.
    #[serde(default)]
    pub price: Option<Decimal>,
    /// Shipping weight per unit.
    #[serde(default)]
    pub weight: Option<Decimal>,
    /// Whether stock levels are enforced on mutation.
    #[serde(default)]
    pub track_inventory: bool,
    /// Units in stock for simple products.
    #[serde(default)]
    pub inventory: Option<u32>,
    /// Variants, in catalog order (complex products only).
    #[serde(default)]
    pub variants: Vec<Variant>,
    /// Remaining catalog fields, including relation fields resolved by the
    /// enrichment pass.
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl Product {
    /// Locate a variant by id within this product's variant list.
    #[must_use]
    pub fn variant(&self, id: &VariantId) -> Option<&Variant> {
        self.variants.iter().find(|v| &v.id == id)
    }
}

// =============================================================================
// Customer Types
// =============================================================================

/// A saved customer address.
///
/// The `country` field is the directory's composite `"COUNTRY|Region"`
/// value; it is split when the address is promoted to the session's
/// default-address fact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Address {
    /// Composite country/region value as stored by the directory.
    pub country: String,
    /// Region name, populated once the composite value has been split.
    #[serde(default)]
    pub region: Option<String>,
    /// Whether this is the customer's default address.
    #[serde(rename = "default", default)]
    pub is_default: bool,
    /// Remaining address fields (name, street, ...), passed through.
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

/// A customer record with saved addresses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    /// Saved addresses, in directory order.
    #[serde(default)]
    pub addresses: Vec<Address>,
}

impl Customer {
    /// Pick an address by caller-specified index, falling back to the
    /// address flagged default when the index is absent or out of range.
    #[must_use]
    pub fn address(&self, key: Option<usize>) -> Option<(usize, &Address)> {
        if let Some(k) = key {
            if let Some(address) = self.addresses.get(k) {
                return Some((k, address));
            }
        }

        self.addresses
            .iter()
            .enumerate()
            .find(|(_, a)| a.is_default)
    }
}

// =============================================================================
// Lookup Interfaces
// =============================================================================

/// Read-only product catalog lookups.
pub trait ProductCatalog {
    /// Look up a product by id.
    fn find_product(&self, id: &ProductId) -> Option<Product>;

    /// Look up a raw catalog entry by id.
    ///
    /// Used by the enrichment pass to resolve relation fields, which may
    /// reference entries of any catalog collection, not just products.
    fn find_entry(&self, id: &str) -> Option<Map<String, Value>>;
}

/// Read-only customer directory lookups.
pub trait CustomerDirectory {
    /// Look up a customer by slug or key (typically the email slug).
    fn find_by_slug_or_key(&self, customer_key: &str) -> Option<Customer>;
}
