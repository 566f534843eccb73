//! User repository for database operations.

use sqlx::SqlitePool;

use shop_core::UserId;

use super::{RepositoryError, execute_update};
use crate::models::{NewUser, User};
use crate::planner::{UpdatePlan, UserColumn};

/// Repository for user database operations.
pub struct UserRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> UserRepository<'a> {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// List all users in id order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<User>, RepositoryError> {
        let users = sqlx::query_as::<_, User>(
            r"
            SELECT id, name, latitude, longitude, is_card, cart
            FROM users
            ORDER BY id
            ",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(users)
    }

    /// Get a user by their ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let user = sqlx::query_as::<_, User>(
            r"
            SELECT id, name, latitude, longitude, is_card, cart
            FROM users
            WHERE id = ?
            ",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(user)
    }

    /// Insert a user and return it with its generated ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(&self, user: &NewUser) -> Result<User, RepositoryError> {
        let created = sqlx::query_as::<_, User>(
            r"
            INSERT INTO users (name, latitude, longitude, is_card, cart)
            VALUES (?, ?, ?, ?, ?)
            RETURNING id, name, latitude, longitude, is_card, cart
            ",
        )
        .bind(&user.name)
        .bind(user.latitude)
        .bind(user.longitude)
        .bind(user.is_card)
        .bind(&user.cart)
        .fetch_one(self.pool)
        .await?;

        Ok(created)
    }

    /// Apply a planned partial update.
    ///
    /// Returns the number of affected rows (0 if the user no longer exists).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the update fails.
    pub async fn apply_update(&self, plan: &UpdatePlan<UserColumn>) -> Result<u64, RepositoryError> {
        execute_update(self.pool, plan).await
    }

    /// Delete a user by ID.
    ///
    /// Returns the number of affected rows.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the delete fails.
    pub async fn delete(&self, id: UserId) -> Result<u64, RepositoryError> {
        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
