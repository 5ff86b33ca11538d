//! Session store seam and typed session facts.
//!
//! Persistence mechanics are an external collaborator: the engine only
//! requires an abstract keyed store of JSON-like documents. Alongside the
//! per-instance cart documents, three session-scoped facts outlive a single
//! recompute call and influence subsequent ones: the shipping country, the
//! selected shipping method key, and the default-address cache. They are
//! modeled as explicit named slots with get/set/forget operations on
//! [`SessionContext`], never as ambient globals.

use std::collections::HashMap;
use std::sync::Mutex;

use cartwheel_core::{CountryCode, MethodKey};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::cart::{Cart, CartInstance};
use crate::catalog::Address;

/// Abstract keyed store of JSON-like documents.
///
/// One store instance corresponds to one user session. The engine assumes
/// at most one writer at a time per session; hosts that allow concurrent
/// requests for the same session key must serialize read-modify-write
/// access per instance key themselves.
pub trait SessionStore {
    /// Read the document stored under `key`.
    fn get(&self, key: &str) -> Option<Value>;

    /// Store `value` under `key`, replacing any existing document.
    fn insert(&self, key: &str, value: Value);

    /// Delete the document stored under `key`.
    fn remove(&self, key: &str);
}

/// Session keys for cart documents and side facts.
pub mod keys {
    /// Key for the logged-in customer's directory key.
    pub const CUSTOMER: &str = "cartwheel.customer";

    /// Key for the established shipping country.
    pub const SHIPPING_COUNTRY: &str = "cartwheel.shipping_country";

    /// Key for the selected shipping method slug.
    pub const SHIPPING_METHOD: &str = "cartwheel.shipping_method";

    /// Key for the resolved default-address cache.
    pub const DEFAULT_ADDRESS: &str = "cartwheel.default_address";

    /// Key for the cart document of the given instance.
    #[must_use]
    pub fn cart(instance: &crate::cart::CartInstance) -> String {
        format!("cartwheel.{}", instance.as_str())
    }
}

/// The cached default-address fact.
///
/// Resolved once per session: the engine only triggers resolution while
/// this fact is absent, so a later address change in the directory does not
/// refresh it without an explicit re-trigger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DefaultAddress {
    /// Index of the picked address in the customer's address list.
    pub key: usize,
    /// The picked address, with its composite country field already split.
    pub address: Address,
}

/// Typed accessor over a [`SessionStore`].
///
/// Wraps the raw document store with the named slots the engine reads and
/// writes. Undecodable documents are treated as absent and logged, never
/// propagated as errors.
pub struct SessionContext<'a, S: SessionStore> {
    store: &'a S,
}

impl<'a, S: SessionStore> SessionContext<'a, S> {
    /// Wrap a session store.
    #[must_use]
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    fn read<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let value = self.store.get(key)?;
        match serde_json::from_value(value) {
            Ok(decoded) => Some(decoded),
            Err(e) => {
                warn!(key, error = %e, "undecodable session document, treating as absent");
                None
            }
        }
    }

    fn write<T: Serialize>(&self, key: &str, value: &T) {
        match serde_json::to_value(value) {
            Ok(doc) => self.store.insert(key, doc),
            Err(e) => warn!(key, error = %e, "failed to encode session document"),
        }
    }

    /// Read the stored cart document for an instance.
    #[must_use]
    pub fn cart(&self, instance: &CartInstance) -> Option<Cart> {
        self.read(&keys::cart(instance))
    }

    /// Persist the cart document for an instance.
    pub fn put_cart(&self, instance: &CartInstance, cart: &Cart) {
        self.write(&keys::cart(instance), cart);
    }

    /// Delete the cart document for an instance.
    pub fn delete_cart(&self, instance: &CartInstance) {
        self.store.remove(&keys::cart(instance));
    }

    /// The logged-in customer's directory key, when one is established.
    #[must_use]
    pub fn customer_key(&self) -> Option<String> {
        self.read(keys::CUSTOMER)
    }

    /// Establish the logged-in customer's directory key.
    pub fn set_customer_key(&self, key: &str) {
        self.write(keys::CUSTOMER, &key);
    }

    /// The established shipping country.
    #[must_use]
    pub fn shipping_country(&self) -> Option<CountryCode> {
        self.read(keys::SHIPPING_COUNTRY)
    }

    /// Establish the shipping country.
    pub fn set_shipping_country(&self, country: &CountryCode) {
        self.write(keys::SHIPPING_COUNTRY, country);
    }

    /// The selected shipping method key.
    #[must_use]
    pub fn shipping_method(&self) -> Option<MethodKey> {
        self.read(keys::SHIPPING_METHOD)
    }

    /// Persist the selected shipping method key.
    pub fn set_shipping_method(&self, key: &MethodKey) {
        self.write(keys::SHIPPING_METHOD, key);
    }

    /// Forget the selected shipping method key.
    pub fn forget_shipping_method(&self) {
        self.store.remove(keys::SHIPPING_METHOD);
    }

    /// The cached default-address fact.
    #[must_use]
    pub fn default_address(&self) -> Option<DefaultAddress> {
        self.read(keys::DEFAULT_ADDRESS)
    }

    /// Cache the resolved default address.
    pub fn set_default_address(&self, address: &DefaultAddress) {
        self.write(keys::DEFAULT_ADDRESS, address);
    }

    /// Drop the cached default address so the next recompute re-resolves it.
    pub fn forget_default_address(&self) {
        self.store.remove(keys::DEFAULT_ADDRESS);
    }
}

// =============================================================================
// In-Memory Store
// =============================================================================

/// Mutex-guarded in-memory [`SessionStore`].
///
/// Suitable for tests and for embedding hosts that keep sessions in
/// process memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, Value>>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, Value>> {
        self.entries
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl SessionStore for MemoryStore {
    fn get(&self, key: &str) -> Option<Value> {
        self.lock().get(key).cloned()
    }

    fn insert(&self, key: &str, value: Value) {
        self.lock().insert(key.to_string(), value);
    }

    fn remove(&self, key: &str) {
        self.lock().remove(key);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_cart_document_roundtrip() {
        let store = MemoryStore::new();
        let session = SessionContext::new(&store);
        let instance = CartInstance::cart();

        assert!(session.cart(&instance).is_none());

        let cart = Cart::new();
        session.put_cart(&instance, &cart);
        assert_eq!(session.cart(&instance).unwrap().id, cart.id);

        session.delete_cart(&instance);
        assert!(session.cart(&instance).is_none());
    }

    #[test]
    fn test_instances_are_isolated() {
        let store = MemoryStore::new();
        let session = SessionContext::new(&store);

        session.put_cart(&CartInstance::cart(), &Cart::new());
        assert!(session.cart(&CartInstance::new("wishlist")).is_none());
    }

    #[test]
    fn test_undecodable_document_is_absent() {
        let store = MemoryStore::new();
        store.insert(keys::SHIPPING_COUNTRY, json!({"not": "a country"}));

        let session = SessionContext::new(&store);
        assert!(session.shipping_country().is_none());
    }

    #[test]
    fn test_shipping_method_fact() {
        let store = MemoryStore::new();
        let session = SessionContext::new(&store);

        assert!(session.shipping_method().is_none());
        session.set_shipping_method(&MethodKey::new("standard"));
        assert_eq!(
            session.shipping_method().unwrap(),
            MethodKey::new("standard")
        );

        session.forget_shipping_method();
        assert!(session.shipping_method().is_none());
    }
}
