//! Shared test utilities for the stock ledger.
//!
//! This module provides common helper functions for setting up test databases
//! and creating test entities with sensible defaults.

use crate::{
    core::{
        product,
        sku::{self, NewSku},
    },
    entities,
    errors::Result,
};
use rust_decimal_macros::dec;
use sea_orm::DatabaseConnection;

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Creates a test product whose code is also its name.
pub async fn create_test_product(
    db: &DatabaseConnection,
    code: &str,
) -> Result<entities::product::Model> {
    product::create_product(db, code.to_string(), code.to_string()).await
}

/// Valid SKU attributes with sensible defaults.
///
/// # Defaults
/// * `price`: `"10.00"`, `cost_value`: `"5.00"`
/// * `length`: 1, `weight`: 2, `thickness`: 0.5
/// * `declared_stock`: 10, `stock_warning_level`: 3
pub fn valid_new_sku(product_id: i64, code: &str) -> NewSku {
    NewSku {
        product_id,
        code: Some(code.to_string()),
        price: Some("10.00".to_string()),
        cost_value: Some("5.00".to_string()),
        length: Some(dec!(1)),
        weight: Some(dec!(2)),
        thickness: Some(dec!(0.5)),
        declared_stock: Some(10),
        stock_warning_level: Some(3),
        active: None,
    }
}

/// Creates a test SKU with the defaults of [`valid_new_sku`].
pub async fn create_test_sku(
    db: &DatabaseConnection,
    product_id: i64,
    code: &str,
) -> Result<entities::sku::Model> {
    sku::create_sku(db, valid_new_sku(product_id, code)).await
}

/// Sets up a complete test environment with product `"PROD123"` and SKU `"A1"`.
/// Returns (db, product, sku) for common test scenarios.
pub async fn setup_with_sku() -> Result<(
    DatabaseConnection,
    entities::product::Model,
    entities::sku::Model,
)> {
    let db = setup_test_db().await?;
    let product = create_test_product(&db, "PROD123").await?;
    let sku = create_test_sku(&db, product.id, "A1").await?;
    Ok((db, product, sku))
}
