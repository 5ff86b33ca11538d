//! The cart recomputation engine.
//!
//! Orchestrates the catalog adapter, inventory validator, shipping
//! resolver, and session store. Mutations update the thin stored document
//! and return the recalculated view; recalculated reads rebuild the
//! enriched view and totals from scratch every time, so derived values can
//! never drift from current catalog or shipping state.

use cartwheel_core::{CountryCode, ItemId, ProductId, VariantId};
use rust_decimal::Decimal;
use serde_json::Value;
use tracing::{debug, instrument, warn};

use crate::cart::{
    Cart, CartInstance, CartItemView, CartView, LineItem, MethodView, ShippingSelection,
    ShippingView, Totals,
};
use crate::catalog::{CustomerDirectory, ProductCatalog, ProductClass};
use crate::config::EngineConfig;
use crate::error::{CartError, Result};
use crate::session::{DefaultAddress, SessionContext, SessionStore};
use crate::{enrich, inventory, shipping};

/// A candidate line item for [`CartEngine::add`].
#[derive(Debug, Clone)]
pub struct NewItem {
    /// Referenced catalog product.
    pub product: ProductId,
    /// Selected variant, required for complex products.
    pub variant: Option<VariantId>,
    /// Units to add.
    pub quantity: u32,
    /// Opaque personalization payload.
    pub custom: Option<Value>,
}

/// A quantity patch for [`CartEngine::update`].
///
/// Carries the new absolute quantity; the item's product, variant, and
/// personalization payload are never changed by an update.
#[derive(Debug, Clone)]
pub struct ItemPatch {
    /// Item to patch.
    pub item_id: ItemId,
    /// New absolute quantity. Zero removes the item.
    pub quantity: u32,
}

/// The recomputation engine over one user session.
///
/// Holds references to the external collaborators; every operation is a
/// single synchronous request/response. The engine assumes at most one
/// writer at a time per session (see [`crate::session::SessionStore`]).
pub struct CartEngine<'a, C, D, S: SessionStore> {
    catalog: &'a C,
    directory: &'a D,
    session: SessionContext<'a, S>,
    config: &'a EngineConfig,
}

impl<'a, C, D, S> CartEngine<'a, C, D, S>
where
    C: ProductCatalog,
    D: CustomerDirectory,
    S: SessionStore,
{
    /// Create an engine over the given collaborators.
    #[must_use]
    pub fn new(catalog: &'a C, directory: &'a D, store: &'a S, config: &'a EngineConfig) -> Self {
        Self {
            catalog,
            directory,
            session: SessionContext::new(store),
            config,
        }
    }

    /// Load the stored cart for an instance, lazily creating an empty one.
    ///
    /// The lazily created document is not persisted by the load itself; it
    /// first reaches the store through a mutation or through shipping
    /// resolution.
    fn load(&self, instance: &CartInstance) -> Cart {
        self.session.cart(instance).unwrap_or_default()
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// The raw stored cart document, without recomputation.
    #[must_use]
    pub fn stored_cart(&self, instance: &CartInstance) -> Cart {
        self.load(instance)
    }

    /// The recalculated, enriched cart view.
    #[instrument(skip(self))]
    #[must_use]
    pub fn cart(&self, instance: &CartInstance) -> CartView {
        let cart = self.load(instance);
        self.recalculate(instance, cart)
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Add an item to the cart.
    ///
    /// An existing item with the same (product, variant) identity absorbs
    /// the new quantity instead of a second item being created.
    ///
    /// # Errors
    ///
    /// Fails with [`CartError::ProductNotFound`],
    /// [`CartError::VariantRequired`], [`CartError::VariantNotFound`], or
    /// [`CartError::InsufficientStock`]; the stored cart is left unchanged
    /// on failure.
    #[instrument(skip(self))]
    pub fn add(&self, instance: &CartInstance, candidate: NewItem) -> Result<CartView> {
        let mut cart = self.load(instance);

        if let Some(existing) = cart
            .position_of(&candidate.product, candidate.variant.as_ref())
            .and_then(|pos| cart.items.get(pos))
        {
            // Duplicate identity: fold the quantities together and let
            // update run the stock check against the merged total.
            let patch = ItemPatch {
                item_id: existing.item_id.clone(),
                quantity: existing.quantity + candidate.quantity,
            };
            debug!(item = %patch.item_id, quantity = patch.quantity, "merging duplicate line item");
            return self.update(instance, patch);
        }

        let product = self
            .catalog
            .find_product(&candidate.product)
            .ok_or_else(|| CartError::ProductNotFound(candidate.product.clone()))?;

        if product.class == ProductClass::Complex {
            match &candidate.variant {
                None => return Err(CartError::VariantRequired(product.id.clone())),
                Some(variant) if product.variant(variant).is_none() => {
                    return Err(CartError::VariantNotFound {
                        product: product.id.clone(),
                        variant: variant.clone(),
                    });
                }
                Some(_) => {}
            }
        }

        inventory::validate(&product, candidate.variant.as_ref(), candidate.quantity, 0)?;

        cart.items.push(LineItem {
            item_id: ItemId::generate(),
            product: candidate.product,
            variant: candidate.variant,
            quantity: candidate.quantity,
            custom: candidate.custom,
        });
        self.session.put_cart(instance, &cart);

        Ok(self.recalculate(instance, cart))
    }

    /// Update an item's quantity; zero removes the item.
    ///
    /// Updating an item that no longer exists is a no-op returning the
    /// current view, not an error. Removing the last item clears the
    /// shipping selection and forgets the chosen method.
    ///
    /// # Errors
    ///
    /// Fails with [`CartError::ProductNotFound`] when the item's product
    /// has vanished from the catalog, or [`CartError::InsufficientStock`];
    /// the stored cart is left unchanged on failure.
    #[instrument(skip(self))]
    pub fn update(&self, instance: &CartInstance, patch: ItemPatch) -> Result<CartView> {
        let mut cart = self.load(instance);

        let Some(pos) = cart.position_of_item(&patch.item_id) else {
            debug!(item = %patch.item_id, "update on vanished item tolerated");
            return Ok(self.recalculate(instance, cart));
        };

        if patch.quantity == 0 {
            cart.items.remove(pos);
            if cart.items.is_empty() {
                cart.shipping = None;
                self.session.forget_shipping_method();
            }
            self.session.put_cart(instance, &cart);
            return Ok(self.recalculate(instance, cart));
        }

        let Some((product_id, variant, committed)) = cart
            .items
            .get(pos)
            .map(|item| (item.product.clone(), item.variant.clone(), item.quantity))
        else {
            return Ok(self.recalculate(instance, cart));
        };

        let product = self
            .catalog
            .find_product(&product_id)
            .ok_or(CartError::ProductNotFound(product_id))?;

        // The patch carries an absolute quantity, so the previously
        // committed amount only counts for the portion that is kept.
        let kept = patch.quantity.min(committed);
        inventory::validate(&product, variant.as_ref(), patch.quantity - kept, kept)?;

        if let Some(item) = cart.items.get_mut(pos) {
            item.quantity = patch.quantity;
        }
        self.session.put_cart(instance, &cart);

        Ok(self.recalculate(instance, cart))
    }

    /// Delete the cart document for an instance.
    ///
    /// Clearing the primary cart also forgets the chosen shipping method;
    /// alternate instances carry no method to forget.
    #[instrument(skip(self))]
    pub fn clear(&self, instance: &CartInstance) {
        self.session.delete_cart(instance);
        if instance.is_primary() {
            self.session.forget_shipping_method();
        }
    }

    /// Establish the shipping country and re-resolve the zone.
    ///
    /// Any previously chosen method is forgotten first, since eligibility
    /// is zone-dependent. Returns `None` when no zone claims the country
    /// and no catch-all exists (shipping unavailable).
    #[instrument(skip(self))]
    pub fn set_shipping_country(
        &self,
        instance: &CartInstance,
        country: CountryCode,
    ) -> Option<ShippingSelection> {
        self.session.set_shipping_country(&country);
        let mut cart = self.load(instance);
        self.apply_zone(instance, &mut cart)
    }

    // =========================================================================
    // Shipping Resolution
    // =========================================================================

    /// Resolve the zone from the session's shipping country and persist the
    /// selection into the stored document. Forgets the chosen method.
    fn apply_zone(&self, instance: &CartInstance, cart: &mut Cart) -> Option<ShippingSelection> {
        let selection = self.session.shipping_country().and_then(|country| {
            let zone = shipping::resolve_zone(&self.config.shipping_zones, &country);
            if zone.is_none() {
                debug!(country = %country, "no zone claims country, shipping unavailable");
            }
            zone.map(|z| ShippingSelection {
                zone: z.id.clone(),
            })
        });

        cart.shipping = selection.clone();
        self.session.forget_shipping_method();
        self.session.put_cart(instance, cart);

        selection
    }

    /// Seed the session's default-address and shipping-country facts from
    /// the logged-in customer's saved addresses.
    fn establish_default_address(&self, key: Option<usize>) {
        let Some(customer_key) = self.session.customer_key() else {
            return;
        };
        let Some(customer) = self.directory.find_by_slug_or_key(&customer_key) else {
            debug!(customer = %customer_key, "customer not found in directory");
            return;
        };
        let Some((key, address)) = customer.address(key) else {
            return;
        };

        let mut address = address.clone();
        let (country, region) = CountryCode::split_composite(&address.country);
        address.country = country.as_str().to_string();
        address.region = region;

        self.session
            .set_default_address(&DefaultAddress { key, address });
        self.session.set_shipping_country(&country);
    }

    /// Compute the eligible methods for the resolved zone, settle the
    /// active selection, and charge its rate.
    fn shipping_view(&self, selection: &ShippingSelection, totals: &mut Totals) -> ShippingView {
        let Some(zone) = self.config.zone(&selection.zone) else {
            warn!(zone = %selection.zone, "stored shipping zone missing from configuration");
            return ShippingView {
                zone: selection.zone.clone(),
                methods: Vec::new(),
            };
        };

        let table = shipping::eligible_methods(zone, totals);
        if table.is_empty() {
            return ShippingView {
                zone: zone.id.clone(),
                methods: Vec::new(),
            };
        }

        // Keep the previously chosen method while it stays eligible;
        // otherwise fall back to the first in table order and persist the
        // new selection.
        let chosen = self.session.shipping_method();
        let Some(active) = chosen
            .clone()
            .filter(|key| table.contains(key))
            .or_else(|| table.first_key().cloned())
        else {
            return ShippingView {
                zone: zone.id.clone(),
                methods: Vec::new(),
            };
        };
        if chosen.as_ref() != Some(&active) {
            self.session.set_shipping_method(&active);
        }

        totals.shipping = table.get(&active).map_or(Decimal::ZERO, |m| m.rate);

        let methods = table
            .iter()
            .map(|(key, method)| MethodView {
                key: key.clone(),
                active: key == &active,
                method: method.clone(),
            })
            .collect();

        ShippingView {
            zone: zone.id.clone(),
            methods,
        }
    }

    // =========================================================================
    // Recalculation
    // =========================================================================

    /// Rebuild the enriched view and totals from the stored document.
    fn recalculate(&self, instance: &CartInstance, mut cart: Cart) -> CartView {
        // Discount and tax are opaque passthrough values from the stored
        // document; everything else is derived from scratch.
        let discount = cart.totals.discount;
        let tax = cart.totals.tax;
        let mut totals = Totals::default();

        let mut items = Vec::with_capacity(cart.items.len());
        for item in &cart.items {
            let Some(product) = self.catalog.find_product(&item.product) else {
                debug!(
                    item = %item.item_id,
                    product = %item.product,
                    "product vanished from catalog, item skipped"
                );
                continue;
            };

            let quantity = Decimal::from(item.quantity);
            let (unit_price, variant) = match &item.variant {
                Some(variant_id) => match product.variant(variant_id) {
                    Some(found) => (found.price.unwrap_or_default(), Some(found.clone())),
                    None => (Decimal::ZERO, None),
                },
                None => (product.price.unwrap_or_default(), None),
            };

            totals.subtotal += unit_price * quantity;
            totals.weight += product.weight.unwrap_or_default() * quantity;

            items.push(CartItemView {
                item_id: item.item_id.clone(),
                quantity: item.quantity,
                product: enrich::product_payload(&product, &self.config.product_fields, self.catalog),
                variant,
                custom: item.custom.clone(),
            });
        }

        // No shipping country or address established yet for this session:
        // seed the country from the customer's default address, then derive
        // the zone from whatever country is now known.
        if self.session.default_address().is_none() && self.session.shipping_country().is_none() {
            self.establish_default_address(None);
            self.apply_zone(instance, &mut cart);
        }

        // A side effect may have dropped the selection while the country
        // stayed known; re-derive it from the stored country.
        if cart.shipping.is_none() && self.session.shipping_country().is_some() {
            self.apply_zone(instance, &mut cart);
        }

        let shipping = cart
            .shipping
            .as_ref()
            .map(|selection| self.shipping_view(selection, &mut totals));

        totals.discount = discount;
        totals.tax = tax;
        totals.grand = totals.subtotal + totals.discount + totals.shipping + totals.tax;

        CartView {
            id: cart.id.clone(),
            items,
            coupons: cart.coupons.clone(),
            shipping,
            totals,
        }
    }
}
