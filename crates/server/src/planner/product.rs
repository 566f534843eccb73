//! Product update planning.

use shop_core::Price;

use super::{Column, ColumnValue, PlanBuilder, PlanError, UpdatePlan};
use crate::models::Product;

/// Writable columns of the `products` table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProductColumn {
    Name,
    Price,
    Image,
}

impl Column for ProductColumn {
    const TABLE: &'static str = "products";

    fn name(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Price => "price",
            Self::Image => "image",
        }
    }
}

/// Fields submitted in a product PATCH.
///
/// `image` is the reference of an image the caller has already stored, not
/// the upload itself.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductPatch {
    pub name: Option<String>,
    /// `Some(0)` is treated as "not provided".
    pub price: Option<i64>,
    pub image: Option<String>,
}

/// Plan the column updates that take `current` to the state described by `patch`.
///
/// # Errors
///
/// - `PlanError::InvalidField` if a negative price was submitted.
/// - `PlanError::NothingToUpdate` if no submitted field changes the row.
pub fn plan_product_update(
    current: &Product,
    patch: &ProductPatch,
) -> Result<UpdatePlan<ProductColumn>, PlanError> {
    let mut builder = PlanBuilder::new(current.id.as_i64());

    builder.set_text(ProductColumn::Name, patch.name.as_deref(), &current.name);

    if let Some(amount) = patch.price.filter(|amount| *amount != 0) {
        let price = Price::new(amount).map_err(|e| PlanError::InvalidField {
            field: "price",
            reason: e.to_string(),
        })?;
        if price != current.price {
            builder.set(ProductColumn::Price, ColumnValue::Integer(price.amount()));
        }
    }

    builder.set_text(ProductColumn::Image, patch.image.as_deref(), &current.image);

    builder.finish()
}
