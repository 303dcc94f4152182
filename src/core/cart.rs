//! Cart line access used by the SKU weight fan-out.
//!
//! Carts themselves belong to the checkout flow. This module only creates lines with a
//! correctly cached weight, lists the lines holding a SKU, and rewrites a line's weight.

use crate::{
    core::ledger,
    entities::{CartItem, cart_item},
    errors::{Error, Result, ValidationError, ValidationRule},
};
use sea_orm::{QueryOrder, Set, prelude::*};

/// Weight of a cart line: unit weight times quantity.
#[must_use]
pub fn line_weight(unit_weight: Decimal, quantity: i32) -> Decimal {
    unit_weight * Decimal::from(quantity)
}

/// Adds a SKU to a cart, caching the line weight from the SKU's current weight.
///
/// # Errors
/// Returns `Error::Validation` if `quantity` is below 1, `Error::SkuNotFound` if the SKU
/// does not exist, or a database error.
pub async fn add_cart_item(
    db: &DatabaseConnection,
    cart_id: i64,
    sku_id: i64,
    quantity: i32,
) -> Result<cart_item::Model> {
    if quantity < 1 {
        return Err(Error::Validation {
            errors: vec![ValidationError::new(
                "quantity",
                ValidationRule::Numericality,
                "must be greater than or equal to 1",
            )],
        });
    }

    let sku = ledger::find_sku(db, sku_id).await?;

    let item = cart_item::ActiveModel {
        cart_id: Set(cart_id),
        sku_id: Set(sku_id),
        quantity: Set(quantity),
        weight: Set(line_weight(sku.weight, quantity)),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };
    item.insert(db).await.map_err(Into::into)
}

/// Lists every cart line currently holding a SKU, oldest first.
///
/// # Errors
/// Returns an error if the database query fails.
pub async fn get_cart_items_for_sku(
    db: &DatabaseConnection,
    sku_id: i64,
) -> Result<Vec<cart_item::Model>> {
    CartItem::find()
        .filter(cart_item::Column::SkuId.eq(sku_id))
        .order_by_asc(cart_item::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Overwrites the cached weight of a single cart line.
///
/// Only the `weight` column is written.
///
/// # Errors
/// Returns `Error::CartItemNotFound` if no line has this ID.
pub async fn update_cart_item_weight(
    db: &DatabaseConnection,
    cart_item_id: i64,
    weight: Decimal,
) -> Result<()> {
    use sea_orm::sea_query::Expr;

    let result = CartItem::update_many()
        .col_expr(cart_item::Column::Weight, Expr::value(weight))
        .filter(cart_item::Column::Id.eq(cart_item_id))
        .exec(db)
        .await?;

    if result.rows_affected == 0 {
        return Err(Error::CartItemNotFound { id: cart_item_id });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_line_weight() {
        assert_eq!(line_weight(dec!(0.35), 4), dec!(1.40));
        assert_eq!(line_weight(dec!(3), 5), dec!(15));
    }

    #[tokio::test]
    async fn test_add_cart_item_caches_weight() -> Result<()> {
        let (db, _product, sku) = setup_with_sku().await?;

        let item = add_cart_item(&db, 7, sku.id, 3).await?;
        assert_eq!(item.cart_id, 7);
        assert_eq!(item.quantity, 3);
        assert_eq!(item.weight, dec!(6));

        let items = get_cart_items_for_sku(&db, sku.id).await?;
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].id, item.id);

        Ok(())
    }

    #[tokio::test]
    async fn test_add_cart_item_validation() -> Result<()> {
        let (db, _product, sku) = setup_with_sku().await?;

        let result = add_cart_item(&db, 1, sku.id, 0).await;
        assert!(matches!(result.unwrap_err(), Error::Validation { errors: _ }));

        let result = add_cart_item(&db, 1, 999, 1).await;
        assert!(matches!(result.unwrap_err(), Error::SkuNotFound { id: 999 }));

        Ok(())
    }

    #[tokio::test]
    async fn test_update_cart_item_weight() -> Result<()> {
        let (db, _product, sku) = setup_with_sku().await?;
        let item = add_cart_item(&db, 1, sku.id, 2).await?;

        update_cart_item_weight(&db, item.id, dec!(9.5)).await?;
        let reloaded = CartItem::find_by_id(item.id).one(&db).await?.unwrap();
        assert_eq!(reloaded.weight, dec!(9.5));

        let result = update_cart_item_weight(&db, 999, dec!(1)).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::CartItemNotFound { id: 999 }
        ));

        Ok(())
    }
}
