//! Order line access used to guard SKU deletion.

use crate::{
    core::ledger,
    entities::{OrderItem, order_item},
    errors::Result,
};
use sea_orm::{Set, prelude::*};

/// Records an order line for a SKU at its current price.
///
/// # Errors
/// Returns `Error::SkuNotFound` if the SKU does not exist, or a database error.
pub async fn add_order_item(
    db: &DatabaseConnection,
    order_id: i64,
    sku_id: i64,
    quantity: i32,
) -> Result<order_item::Model> {
    let sku = ledger::find_sku(db, sku_id).await?;

    let item = order_item::ActiveModel {
        order_id: Set(order_id),
        sku_id: Set(sku_id),
        quantity: Set(quantity),
        price: Set(sku.price),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };
    item.insert(db).await.map_err(Into::into)
}

/// Returns `true` if any order line references the SKU.
pub async fn has_order_items_for_sku<C>(db: &C, sku_id: i64) -> Result<bool>
where
    C: ConnectionTrait,
{
    let count = OrderItem::find()
        .filter(order_item::Column::SkuId.eq(sku_id))
        .count(db)
        .await?;
    Ok(count > 0)
}
