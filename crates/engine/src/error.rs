//! Error types for cart mutations.
//!
//! All variants are caller-visible, synchronous failures raised at the point
//! of mutation (`add`/`update`). A failed mutation leaves the stored cart
//! unchanged. Catalog misses during recomputation are not errors: vanished
//! products are skipped from the view (see [`crate::engine`]), and a country
//! with no matching zone degrades to "shipping unavailable".

use cartwheel_core::{ProductId, VariantId};
use thiserror::Error;

/// Mutation-rejecting errors for cart operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CartError {
    /// Referenced product id does not resolve in the catalog.
    #[error("product not found: {0}")]
    ProductNotFound(ProductId),

    /// A product with variants was added without a variant reference.
    #[error("product {0} requires a variant selection")]
    VariantRequired(ProductId),

    /// Supplied variant id is not present among the product's variants.
    #[error("variant {variant} not found on product {product}")]
    VariantNotFound {
        /// Product the variant was looked up on.
        product: ProductId,
        /// The unknown variant id.
        variant: VariantId,
    },

    /// Requested total quantity exceeds tracked inventory.
    #[error(
        "insufficient stock for product {product}: requested {requested}, available {available}"
    )]
    InsufficientStock {
        /// Product that failed the stock check.
        product: ProductId,
        /// Variant that failed the stock check, for complex products.
        variant: Option<VariantId>,
        /// Total post-mutation quantity that was requested.
        requested: u32,
        /// Quantity the catalog currently has available.
        available: u32,
    },
}

/// Result type alias for [`CartError`].
pub type Result<T> = std::result::Result<T, CartError>;
