//! Inventory validation for cart mutations.
//!
//! The check always covers the total post-mutation quantity for one
//! (product, variant) identity: `requested` is the quantity the mutation
//! adds and `already_in_cart` the quantity already committed for the same
//! identity, so their sum is what the catalog must be able to supply.

use cartwheel_core::VariantId;

use crate::catalog::{Product, ProductClass};
use crate::error::{CartError, Result};

/// Validate a proposed quantity against available stock.
///
/// Products that do not track inventory always pass. Simple products check
/// the product-level stock count; complex products check the stock count of
/// the referenced variant, and an unset variant count never satisfies a
/// positive quantity.
///
/// # Errors
///
/// Returns [`CartError::InsufficientStock`] when stock cannot cover the
/// post-mutation total, [`CartError::VariantRequired`] /
/// [`CartError::VariantNotFound`] when a complex product's variant
/// reference is missing or unknown.
pub fn validate(
    product: &Product,
    variant: Option<&VariantId>,
    requested: u32,
    already_in_cart: u32,
) -> Result<()> {
    if !product.track_inventory {
        return Ok(());
    }

    let total = requested + already_in_cart;

    match product.class {
        ProductClass::Simple => {
            let available = product.inventory.unwrap_or(0);
            if available < total {
                return Err(CartError::InsufficientStock {
                    product: product.id.clone(),
                    variant: None,
                    requested: total,
                    available,
                });
            }
        }
        ProductClass::Complex => {
            let Some(variant_id) = variant else {
                return Err(CartError::VariantRequired(product.id.clone()));
            };
            let Some(found) = product.variant(variant_id) else {
                return Err(CartError::VariantNotFound {
                    product: product.id.clone(),
                    variant: variant_id.clone(),
                });
            };
            let available = found.inventory.unwrap_or(0);
            if available < total {
                return Err(CartError::InsufficientStock {
                    product: product.id.clone(),
                    variant: Some(variant_id.clone()),
                    requested: total,
                    available,
                });
            }
        }
    }

    Ok(())
}
