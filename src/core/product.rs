//! Product business logic - The small slice of catalog management the ledger needs.
//!
//! Products own SKUs and supply the code prefix used by qualified SKU codes. This module
//! also seeds an empty database from the catalog configuration.

use crate::{
    config::catalog::CatalogConfig,
    core::{
        sku::{self, NewSku},
        validation,
    },
    entities::{Product, product},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};
use tracing::{info, instrument};

/// Retrieves all active products, ordered alphabetically by name.
///
/// # Errors
/// Returns an error if the database query fails.
pub async fn get_all_active_products(db: &DatabaseConnection) -> Result<Vec<product::Model>> {
    Product::find()
        .filter(product::Column::Active.eq(true))
        .order_by_asc(product::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Retrieves a specific product by its unique ID.
///
/// # Errors
/// Returns an error if the database query fails.
pub async fn get_product_by_id(
    db: &DatabaseConnection,
    product_id: i64,
) -> Result<Option<product::Model>> {
    Product::find_by_id(product_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Creates a new product, trimming whitespace from its name and code.
///
/// # Errors
/// Returns `Error::Validation` if the name or code is blank, or a database error.
pub async fn create_product<C>(db: &C, name: String, sku_code: String) -> Result<product::Model>
where
    C: ConnectionTrait,
{
    let mut errors = Vec::new();
    validation::check_text("name", Some(name.as_str()), &mut errors);
    validation::check_text("sku", Some(sku_code.as_str()), &mut errors);
    if !errors.is_empty() {
        return Err(Error::Validation { errors });
    }

    let now = chrono::Utc::now();
    let product = product::ActiveModel {
        name: Set(name.trim().to_string()),
        sku: Set(sku_code.trim().to_string()),
        active: Set(true),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    product.insert(db).await.map_err(Into::into)
}

/// Seeds products and SKUs from the catalog configuration if no products exist yet.
///
/// The whole catalog is written in one transaction: either every product and SKU is
/// seeded, or nothing is and the next start tries again. Every SKU goes through the same
/// validation as [`sku::create_sku`], so seeded SKUs start with an `"Initial stock"`
/// ledger entry like any other.
///
/// # Returns
/// The number of SKUs created (zero when the database was already seeded).
///
/// # Errors
/// Returns the first validation or database error encountered.
#[instrument(skip(db, catalog))]
pub async fn seed_catalog(db: &DatabaseConnection, catalog: &CatalogConfig) -> Result<usize> {
    if Product::find().count(db).await? > 0 {
        info!("Catalog already present, skipping seed");
        return Ok(0);
    }

    let txn = db.begin().await?;

    let mut created = 0;
    for product_config in &catalog.products {
        let product =
            create_product(&txn, product_config.name.clone(), product_config.sku.clone())
                .await?;

        for sku_config in &product_config.skus {
            sku::insert_sku(
                &txn,
                NewSku {
                    product_id: product.id,
                    code: Some(sku_config.code.clone()),
                    price: Some(sku_config.price.clone()),
                    cost_value: Some(sku_config.cost_value.clone()),
                    length: Some(sku_config.length),
                    weight: Some(sku_config.weight),
                    thickness: Some(sku_config.thickness),
                    declared_stock: Some(sku_config.stock),
                    stock_warning_level: Some(sku_config.stock_warning_level),
                    active: None,
                },
            )
            .await?;
            created += 1;
        }
    }

    txn.commit().await?;

    info!(
        products = catalog.products.len(),
        skus = created,
        "Seeded catalog"
    );
    Ok(created)
}
