//! Product domain types.

use serde::Serialize;

use shop_core::{Price, ProductId};

/// Image reference meaning "no image".
pub const NO_IMAGE_SENTINEL: &str = "/";

/// A product as persisted in the `products` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct Product {
    /// Store-assigned id, immutable after creation.
    pub id: ProductId,
    /// Display name (never empty).
    pub name: String,
    /// Price in minor units (always positive).
    pub price: Price,
    /// Root-relative image reference, e.g. `/uploads/images/1700-mug.png`.
    ///
    /// Empty or `/` means the product has no image.
    pub image: String,
}

/// Whether `reference` points at an image rather than being a "no image" marker.
#[must_use]
pub fn has_image_reference(reference: &str) -> bool {
    !reference.is_empty() && reference != NO_IMAGE_SENTINEL
}

/// A validated product ready to insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProduct {
    pub name: String,
    pub price: Price,
    pub image: String,
}
