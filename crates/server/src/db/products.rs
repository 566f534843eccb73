//! Product repository for database operations.

use sqlx::SqlitePool;

use shop_core::ProductId;

use super::{RepositoryError, execute_update};
use crate::models::{NewProduct, Product};
use crate::planner::{ProductColumn, UpdatePlan};

/// Repository for product database operations.
pub struct ProductRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// List all products in id order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails or a stored price
    /// is not positive.
    pub async fn list(&self) -> Result<Vec<Product>, RepositoryError> {
        let products = sqlx::query_as::<_, Product>(
            r"
            SELECT id, name, price, image
            FROM products
            ORDER BY id
            ",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(products)
    }

    /// Get a product by its ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let product = sqlx::query_as::<_, Product>(
            r"
            SELECT id, name, price, image
            FROM products
            WHERE id = ?
            ",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(product)
    }

    /// Insert a product and return it with its generated ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(&self, product: &NewProduct) -> Result<Product, RepositoryError> {
        let created = sqlx::query_as::<_, Product>(
            r"
            INSERT INTO products (name, price, image)
            VALUES (?, ?, ?)
            RETURNING id, name, price, image
            ",
        )
        .bind(&product.name)
        .bind(product.price)
        .bind(&product.image)
        .fetch_one(self.pool)
        .await?;

        Ok(created)
    }

    /// Apply a planned partial update.
    ///
    /// Returns the number of affected rows (0 if the product no longer exists).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the update fails.
    pub async fn apply_update(
        &self,
        plan: &UpdatePlan<ProductColumn>,
    ) -> Result<u64, RepositoryError> {
        execute_update(self.pool, plan).await
    }

    /// Delete a product by ID.
    ///
    /// Returns the number of affected rows.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the delete fails.
    pub async fn delete(&self, id: ProductId) -> Result<u64, RepositoryError> {
        let result = sqlx::query("DELETE FROM products WHERE id = ?")
            .bind(id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
