//! Seed the database with demo products and users.
//!
//! Seeded products carry no image (empty reference), so deleting them never
//! touches the upload directory.

use shop_core::{Cart, Price};
use shop_server::db::{ProductRepository, UserRepository};
use shop_server::models::{NewProduct, NewUser};

use super::{CommandError, connect};

const DEMO_PRODUCTS: &[(&str, i64)] = &[
    ("Espresso Cup", 450),
    ("Pour-over Kettle", 3900),
    ("Burr Grinder", 12900),
];

const DEMO_USERS: &[(&str, f64, f64, bool)] = &[
    ("Ann", 59.437, 24.7536, true),
    ("Bob", 52.52, 13.405, false),
];

/// Insert the demo rows.
///
/// Skips seeding when either table already has rows unless `force` is set.
///
/// # Errors
///
/// Returns an error if the database is unreachable or an insert fails.
pub async fn run(force: bool) -> Result<(), CommandError> {
    let pool = connect().await?;
    let products = ProductRepository::new(&pool);
    let users = UserRepository::new(&pool);

    let existing = products.list().await?.len() + users.list().await?.len();
    if existing > 0 && !force {
        tracing::warn!(existing, "Database already has rows, skipping seed (use --force)");
        pool.close().await;
        return Ok(());
    }

    let mut product_ids = Vec::with_capacity(DEMO_PRODUCTS.len());
    for &(name, price) in DEMO_PRODUCTS {
        let product = products
            .create(&NewProduct {
                name: name.to_owned(),
                price: Price::new(price)?,
                image: String::new(),
            })
            .await?;
        tracing::info!(id = %product.id, name, "Seeded product");
        product_ids.push(product.id.as_i64());
    }

    for &(name, latitude, longitude, is_card) in DEMO_USERS {
        let cart = if is_card {
            Cart::new(product_ids.clone())
        } else {
            Cart::default()
        };
        let user = users
            .create(&NewUser {
                name: name.to_owned(),
                latitude,
                longitude,
                is_card,
                cart,
            })
            .await?;
        tracing::info!(id = %user.id, name, "Seeded user");
    }

    pool.close().await;
    tracing::info!(
        products = DEMO_PRODUCTS.len(),
        users = DEMO_USERS.len(),
        "Seed complete!"
    );
    Ok(())
}
