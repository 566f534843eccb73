//! Core types for the shop backend.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod cart;
pub mod id;
pub mod price;

pub use cart::Cart;
pub use id::*;
pub use price::{Price, PriceError};
