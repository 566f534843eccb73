//! User domain types.

use serde::{Deserialize, Serialize};

use shop_core::{Cart, UserId};

/// A shop user as persisted in the `users` table.
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct User {
    /// Store-assigned id.
    pub id: UserId,
    /// Display name (never empty).
    pub name: String,
    /// No range validation is performed on coordinates.
    pub latitude: f64,
    pub longitude: f64,
    /// Whether the user pays by card.
    pub is_card: bool,
    /// Product ids in the user's cart. Not checked against existing products.
    pub cart: Cart,
}

/// JSON payload for `POST /user`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NewUser {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub is_card: bool,
    #[serde(default)]
    pub cart: Cart,
}
