//! Shop server - HTTP CRUD backend for products and users.
//!
//! # Architecture
//!
//! - Axum web framework, JSON responses
//! - `SQLite` row store via sqlx (products, users)
//! - Product images kept on local disk under the upload root
//!   and served back under `/uploads`
//!
//! PATCH requests are reconciled against the stored row by the
//! [`planner`], which emits only the columns that actually change.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod planner;
pub mod routes;
pub mod services;
pub mod state;

pub use config::ServerConfig;
pub use error::{AppError, Result};
pub use state::AppState;
