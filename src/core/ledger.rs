//! Stock ledger - The append-only history of a SKU's stock level.
//!
//! A SKU never stores a mutable stock counter. Every change is a new
//! `stock_adjustments` row carrying the signed `adjustment` and the resulting
//! `stock_total`; the newest row (by `created_at`, then `id`) is the current stock.
//! Rows are never updated, and are only deleted together with their SKU.

use crate::{
    entities::{Notification, Sku, StockAdjustment, notification, sku, stock_adjustment},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, QuerySelect, Set, TransactionTrait, prelude::*};
use tracing::{debug, instrument, warn};

/// Description recorded on the entry written when a SKU is created.
pub const INITIAL_STOCK_DESCRIPTION: &str = "Initial stock";

pub(crate) async fn find_sku<C>(db: &C, sku_id: i64) -> Result<sku::Model>
where
    C: ConnectionTrait,
{
    Sku::find_by_id(sku_id)
        .one(db)
        .await?
        .ok_or(Error::SkuNotFound { id: sku_id })
}

pub(crate) async fn insert_entry<C>(
    db: &C,
    sku_id: i64,
    description: String,
    adjustment: i32,
    stock_total: i32,
) -> Result<stock_adjustment::Model>
where
    C: ConnectionTrait,
{
    let entry = stock_adjustment::ActiveModel {
        sku_id: Set(sku_id),
        description: Set(description),
        adjustment: Set(adjustment),
        stock_total: Set(stock_total),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };
    entry.insert(db).await.map_err(Into::into)
}

/// Appends one immutable entry to a SKU's ledger.
///
/// `stock_total` is taken as given: the caller is responsible for it matching the previous
/// total plus `adjustment`. Use [`adjust_stock`] to have the ledger derive it instead.
///
/// # Errors
/// Returns `Error::SkuNotFound` if the SKU does not exist, or a database error.
#[instrument(skip(db, description))]
pub async fn append_entry<C>(
    db: &C,
    sku_id: i64,
    description: String,
    adjustment: i32,
    stock_total: i32,
) -> Result<stock_adjustment::Model>
where
    C: ConnectionTrait,
{
    find_sku(db, sku_id).await?;
    let entry = insert_entry(db, sku_id, description, adjustment, stock_total).await?;
    debug!(entry_id = entry.id, "Appended ledger entry");
    Ok(entry)
}

/// Returns the most recent entry for a SKU, or `None` if its ledger is empty.
///
/// # Errors
/// Returns `Error::SkuNotFound` if the SKU does not exist, or a database error.
pub async fn latest_entry<C>(db: &C, sku_id: i64) -> Result<Option<stock_adjustment::Model>>
where
    C: ConnectionTrait,
{
    find_sku(db, sku_id).await?;
    newest_entry(db, sku_id).await
}

async fn newest_entry<C>(db: &C, sku_id: i64) -> Result<Option<stock_adjustment::Model>>
where
    C: ConnectionTrait,
{
    StockAdjustment::find()
        .filter(stock_adjustment::Column::SkuId.eq(sku_id))
        .order_by_desc(stock_adjustment::Column::CreatedAt)
        .order_by_desc(stock_adjustment::Column::Id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Current stock of an already loaded SKU: its newest entry's total, or the declared
/// stock when the ledger is empty.
pub(crate) async fn stock_of<C>(db: &C, sku: &sku::Model) -> Result<i32>
where
    C: ConnectionTrait,
{
    Ok(newest_entry(db, sku.id)
        .await?
        .map_or(sku.declared_stock, |entry| entry.stock_total))
}

/// Returns the newest `limit` entries for a SKU, newest first.
pub(crate) async fn recent_entries<C>(
    db: &C,
    sku_id: i64,
    limit: u64,
) -> Result<Vec<stock_adjustment::Model>>
where
    C: ConnectionTrait,
{
    StockAdjustment::find()
        .filter(stock_adjustment::Column::SkuId.eq(sku_id))
        .order_by_desc(stock_adjustment::Column::CreatedAt)
        .order_by_desc(stock_adjustment::Column::Id)
        .limit(limit)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Returns every entry for a SKU, oldest first.
///
/// Each call runs a fresh query, so repeated calls with no appends in between return
/// equal sequences.
///
/// # Errors
/// Returns `Error::SkuNotFound` if the SKU does not exist.
pub async fn ledger_history<C>(db: &C, sku_id: i64) -> Result<Vec<stock_adjustment::Model>>
where
    C: ConnectionTrait,
{
    find_sku(db, sku_id).await?;
    StockAdjustment::find()
        .filter(stock_adjustment::Column::SkuId.eq(sku_id))
        .order_by_asc(stock_adjustment::Column::CreatedAt)
        .order_by_asc(stock_adjustment::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Records a stock change, deriving the new total from the latest entry.
///
/// Reading the current total and appending happen in one database transaction. The
/// resulting stock may not go below zero. When the change takes stock from above the
/// SKU's warning level to at or below it, a low-stock notification is attached to the SKU.
///
/// # Errors
/// Returns an error if:
/// - `adjustment` is zero or overflows the stock total
/// - The SKU does not exist
/// - The resulting total would be negative
/// - The database operation fails
#[instrument(skip(db, description))]
pub async fn adjust_stock(
    db: &DatabaseConnection,
    sku_id: i64,
    description: String,
    adjustment: i32,
) -> Result<stock_adjustment::Model> {
    if adjustment == 0 {
        return Err(Error::InvalidAdjustment { adjustment });
    }

    let txn = db.begin().await?;

    let sku = find_sku(&txn, sku_id).await?;
    let current = stock_of(&txn, &sku).await?;

    let new_total = current
        .checked_add(adjustment)
        .ok_or(Error::InvalidAdjustment { adjustment })?;
    if new_total < 0 {
        return Err(Error::InsufficientStock {
            current,
            adjustment,
        });
    }

    let entry = insert_entry(&txn, sku_id, description, adjustment, new_total).await?;

    if current > sku.stock_warning_level && new_total <= sku.stock_warning_level {
        warn!(
            sku_id,
            stock = new_total,
            warning_level = sku.stock_warning_level,
            "SKU stock fell to its warning level"
        );
        let notice = notification::ActiveModel {
            notifiable_type: Set(notification::SKU_NOTIFIABLE_TYPE.to_string()),
            notifiable_id: Set(sku_id),
            message: Set(format!(
                "Stock for {} is down to {new_total} (warning level {})",
                sku.code, sku.stock_warning_level
            )),
            created_at: Set(chrono::Utc::now()),
            ..Default::default()
        };
        notice.insert(&txn).await?;
    }

    txn.commit().await?;
    Ok(entry)
}

/// Lists the low-stock notifications attached to a SKU, newest first.
///
/// # Errors
/// Returns an error if the database query fails.
pub async fn get_notifications_for_sku<C>(db: &C, sku_id: i64) -> Result<Vec<notification::Model>>
where
    C: ConnectionTrait,
{
    Notification::find()
        .filter(notification::Column::NotifiableType.eq(notification::SKU_NOTIFIABLE_TYPE))
        .filter(notification::Column::NotifiableId.eq(sku_id))
        .order_by_desc(notification::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}
