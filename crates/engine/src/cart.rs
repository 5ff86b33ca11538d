//! Cart document and view types.
//!
//! Two shapes of cart exist. The thin [`Cart`] document is what the session
//! store persists: line items referencing catalog products by id, coupon
//! passthrough, the resolved shipping zone, and the totals block. The
//! [`CartView`] is derived from it on every recalculated read: items carry
//! the enriched product payload and resolved variant, shipping carries the
//! eligible methods. Enrichment is view-only and never written back.

use cartwheel_core::{CartId, ItemId, MethodKey, ProductId, VariantId, ZoneId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::catalog::Variant;
use crate::shipping::ShippingMethod;

// =============================================================================
// Instance Naming
// =============================================================================

/// Name of a cart instance within a session.
///
/// The primary `"cart"` instance is the one that carries a shipping method
/// selection; alternate instances (a wishlist, a saved-for-later list) hold
/// items but no shipping state.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CartInstance(String);

impl CartInstance {
    /// Create an instance name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The primary cart instance.
    #[must_use]
    pub fn cart() -> Self {
        Self::new("cart")
    }

    /// Get the instance name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this is the primary cart instance.
    #[must_use]
    pub fn is_primary(&self) -> bool {
        self.0 == "cart"
    }
}

impl Default for CartInstance {
    fn default() -> Self {
        Self::cart()
    }
}

// =============================================================================
// Stored Document
// =============================================================================

/// A line item in the stored cart document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    /// Stable item id, assigned at creation.
    pub item_id: ItemId,
    /// Referenced catalog product.
    pub product: ProductId,
    /// Selected variant, required for complex products.
    #[serde(default)]
    pub variant: Option<VariantId>,
    /// Units of the product in the cart. Always greater than zero while the
    /// item is present; reaching zero removes the item.
    pub quantity: u32,
    /// Opaque personalization payload, passed through untouched.
    #[serde(default)]
    pub custom: Option<Value>,
}

impl LineItem {
    /// Whether this item holds the given (product, variant) identity.
    #[must_use]
    pub fn matches(&self, product: &ProductId, variant: Option<&VariantId>) -> bool {
        &self.product == product && self.variant.as_ref() == variant
    }
}

/// Cart totals, derived from scratch on every recalculated read.
///
/// Invariant: `grand = subtotal + discount + shipping + tax`. Discount and
/// tax are opaque passthrough values already baked into the stored document;
/// the engine sums them, it does not compute them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Totals {
    /// Sum of unit price times quantity over priced items.
    pub subtotal: Decimal,
    /// Opaque discount passthrough.
    pub discount: Decimal,
    /// Rate of the active shipping method, zero when unresolvable.
    pub shipping: Decimal,
    /// Opaque tax passthrough.
    pub tax: Decimal,
    /// `subtotal + discount + shipping + tax`.
    pub grand: Decimal,
    /// Sum of product weight times quantity.
    pub weight: Decimal,
}

/// Persisted shipping zone selection.
///
/// Only the zone survives in the stored document; eligible methods are
/// recomputed on every read and the active method key lives in its own
/// session fact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingSelection {
    /// Resolved shipping zone.
    pub zone: ZoneId,
}

/// The thin persisted cart document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cart {
    /// Opaque cart id, generated once at creation.
    pub id: CartId,
    /// Line items in insertion order.
    #[serde(default)]
    pub items: Vec<LineItem>,
    /// Opaque coupon identifiers, passed through untouched.
    #[serde(default)]
    pub coupons: Vec<String>,
    /// Resolved shipping zone, when a destination country is known.
    #[serde(default)]
    pub shipping: Option<ShippingSelection>,
    /// Totals block. Derived on read; never trusted as input beyond the
    /// discount and tax passthrough fields.
    #[serde(default)]
    pub totals: Totals,
}

impl Cart {
    /// Create an empty cart with a freshly generated id and zeroed totals.
    #[must_use]
    pub fn new() -> Self {
        Self {
            id: CartId::generate(),
            items: Vec::new(),
            coupons: Vec::new(),
            shipping: None,
            totals: Totals::default(),
        }
    }

    /// Position of the item holding the given (product, variant) identity.
    ///
    /// At most one line item exists per identity; adding a duplicate merges
    /// quantities instead of appending.
    #[must_use]
    pub fn position_of(&self, product: &ProductId, variant: Option<&VariantId>) -> Option<usize> {
        self.items.iter().position(|i| i.matches(product, variant))
    }

    /// Position of the item with the given item id.
    #[must_use]
    pub fn position_of_item(&self, item_id: &ItemId) -> Option<usize> {
        self.items.iter().position(|i| &i.item_id == item_id)
    }
}

impl Default for Cart {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Enriched View
// =============================================================================

/// A line item in the enriched cart view.
#[derive(Debug, Clone, Serialize)]
pub struct CartItemView {
    /// Stable item id from the stored document.
    pub item_id: ItemId,
    /// Quantity from the stored document.
    pub quantity: u32,
    /// Consumer-facing product payload: the full catalog entry with
    /// administrative fields stripped and relation fields resolved.
    pub product: Map<String, Value>,
    /// Resolved variant object, when one is selected and still present.
    pub variant: Option<Variant>,
    /// Personalization passthrough.
    pub custom: Option<Value>,
}

/// An eligible shipping method in the view.
#[derive(Debug, Clone, Serialize)]
pub struct MethodView {
    /// Slug key identifying the method within its zone.
    pub key: MethodKey,
    /// Whether this is the active (selected) method.
    pub active: bool,
    /// The method's rate-table entry.
    #[serde(flatten)]
    pub method: ShippingMethod,
}

/// Shipping state in the view: the resolved zone and the eligible methods.
#[derive(Debug, Clone, Serialize)]
pub struct ShippingView {
    /// Resolved shipping zone.
    pub zone: ZoneId,
    /// Eligible methods in rate-table order. Empty when nothing matches the
    /// cart's current totals.
    pub methods: Vec<MethodView>,
}

/// The fully resolved cart view returned by recalculated reads.
#[derive(Debug, Clone, Serialize)]
pub struct CartView {
    /// Cart id from the stored document.
    pub id: CartId,
    /// Enriched items. Items whose product no longer resolves in the
    /// catalog are omitted here while their stored records stay untouched.
    pub items: Vec<CartItemView>,
    /// Coupon passthrough.
    pub coupons: Vec<String>,
    /// Shipping state, when a zone is resolved.
    pub shipping: Option<ShippingView>,
    /// Freshly recomputed totals.
    pub totals: Totals,
}
