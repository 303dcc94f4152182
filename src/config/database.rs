//! Database configuration module for the stock ledger.
//!
//! This module handles `SQLite` database connection and table creation using `SeaORM`.
//! Tables are generated from the entity definitions with `Schema::create_table_from_entity`,
//! so the schema (including foreign keys and their `ON DELETE` actions) always matches the
//! Rust structs without hand-written SQL.

use crate::entities::{
    CartItem, Notification, OrderItem, Product, Sku, SkuVariant, StockAdjustment, sku,
    stock_adjustment,
};
use crate::errors::Result;
use sea_orm::{
    ConnectionTrait, Database, DatabaseConnection, EntityTrait, Schema, sea_query::Index,
};
use tracing::{debug, info, instrument};

const DEFAULT_DATABASE_URL: &str = "sqlite://data/stock_ledger.sqlite?mode=rwc";

/// Gets the database URL from the `DATABASE_URL` environment variable, falling back to
/// a local `SQLite` file.
#[must_use]
pub fn get_database_url() -> String {
    std::env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string())
}

/// Establishes a connection to the database named by [`get_database_url`].
pub async fn create_connection() -> Result<DatabaseConnection> {
    let database_url = get_database_url();
    debug!("Connecting to database at {}", database_url);
    Database::connect(&database_url).await.map_err(Into::into)
}

async fn create_table_for<E, C>(db: &C, schema: &Schema, entity: E) -> Result<()>
where
    E: EntityTrait,
    C: ConnectionTrait,
{
    let builder = db.get_database_backend();
    let mut statement = schema.create_table_from_entity(entity);
    statement.if_not_exists();
    db.execute(builder.build(&statement)).await?;
    Ok(())
}

/// Creates all tables if they do not exist yet.
///
/// Tables are created parents first so the foreign keys of `skus` and its dependents
/// always reference an existing table, followed by the SKU code and ledger indexes.
#[instrument(skip(db))]
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let schema = Schema::new(db.get_database_backend());

    create_table_for(db, &schema, Product).await?;
    create_table_for(db, &schema, Sku).await?;
    create_table_for(db, &schema, StockAdjustment).await?;
    create_table_for(db, &schema, CartItem).await?;
    create_table_for(db, &schema, OrderItem).await?;
    create_table_for(db, &schema, SkuVariant).await?;
    create_table_for(db, &schema, Notification).await?;

    let builder = db.get_database_backend();

    // Code uniqueness is scoped to (product_id, active), so deactivating a SKU frees its code
    let sku_code_index = Index::create()
        .name("idx_skus_product_code_active")
        .table(Sku)
        .col(sku::Column::ProductId)
        .col(sku::Column::Code)
        .col(sku::Column::Active)
        .unique()
        .if_not_exists()
        .to_owned();
    db.execute(builder.build(&sku_code_index)).await?;

    // Latest-entry lookups read (sku_id, created_at) newest first
    let ledger_index = Index::create()
        .name("idx_stock_adjustments_sku_created")
        .table(StockAdjustment)
        .col(stock_adjustment::Column::SkuId)
        .col(stock_adjustment::Column::CreatedAt)
        .if_not_exists()
        .to_owned();
    db.execute(builder.build(&ledger_index)).await?;

    info!("Database tables ensured");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{
        cart_item::Model as CartItemModel, product::Model as ProductModel,
        sku::Model as SkuModel, stock_adjustment::Model as StockAdjustmentModel,
    };
    use sea_orm::QuerySelect;

    #[tokio::test]
    async fn test_create_tables() -> Result<()> {
        let db = Database::connect("sqlite::memory:").await?;
        create_tables(&db).await?;

        // Test that tables exist by querying them
        let _: Vec<ProductModel> = Product::find().limit(1).all(&db).await?;
        let _: Vec<SkuModel> = Sku::find().limit(1).all(&db).await?;
        let _: Vec<StockAdjustmentModel> = StockAdjustment::find().limit(1).all(&db).await?;
        let _: Vec<CartItemModel> = CartItem::find().limit(1).all(&db).await?;

        Ok(())
    }

    #[tokio::test]
    async fn test_create_tables_is_idempotent() -> Result<()> {
        let db = Database::connect("sqlite::memory:").await?;
        create_tables(&db).await?;
        create_tables(&db).await?;
        Ok(())
    }
}
