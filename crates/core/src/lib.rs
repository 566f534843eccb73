//! Shop Core - Shared types library.
//!
//! This crate provides common types used across the shop backend components:
//! - `server` - HTTP CRUD backend for products and users
//! - `cli` - Command-line tools for migrations and seeding
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no database
//! connections, no HTTP. The optional `sqlite` feature adds sqlx encode/decode
//! implementations so the types can be bound and read directly.
//!
//! # Modules
//!
//! - [`types`] - Typed IDs, prices, and the cart codec

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
