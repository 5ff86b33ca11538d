//! Cartwheel Engine - the cart recomputation pipeline.
//!
//! Given a thin persisted cart document (line items referencing external
//! catalog products), the engine derives a fully resolved view on every
//! read: enriched product payloads, validated inventory, and recomputed
//! monetary and shipping totals. Derived values are never trusted as input;
//! totals are rebuilt from scratch so they cannot drift from current
//! catalog or shipping state.
//!
//! # Collaborators
//!
//! Storage is external: the engine consumes a [`catalog::ProductCatalog`]
//! and [`catalog::CustomerDirectory`] for lookups and a
//! [`session::SessionStore`] for the persisted documents and session facts.
//!
//! # Example
//!
//! ```rust,ignore
//! use cartwheel_engine::{CartEngine, CartInstance, NewItem};
//!
//! let engine = CartEngine::new(&catalog, &directory, &store, &config);
//! let instance = CartInstance::cart();
//!
//! let view = engine.add(&instance, NewItem {
//!     product: "prod-1".into(),
//!     variant: None,
//!     quantity: 2,
//!     custom: None,
//! })?;
//! assert_eq!(view.totals.grand, view.totals.subtotal + view.totals.shipping);
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod catalog;
pub mod config;
pub mod engine;
pub mod enrich;
pub mod error;
pub mod inventory;
pub mod session;
pub mod shipping;

pub use cart::{Cart, CartInstance, CartView, LineItem, ShippingSelection, Totals};
pub use config::EngineConfig;
pub use engine::{CartEngine, ItemPatch, NewItem};
pub use error::{CartError, Result};
