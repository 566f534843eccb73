//! Domain models for the shop.
//!
//! These are the persisted row shapes plus the payloads used to create them.
//! Partial-update payloads live with the planner in [`crate::planner`].

pub mod product;
pub mod user;

pub use product::{NewProduct, Product};
pub use user::{NewUser, User};
