//! Business logic services for the shop.
//!
//! # Services
//!
//! - `images` - Product image blob storage under the upload root

pub mod images;

pub use images::{Discard, ImageError, ImageStore};
