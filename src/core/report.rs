//! Stock report generation.
//!
//! Builds framework-agnostic summaries of a SKU's stock position from its ledger, and
//! lists the SKUs that have fallen to their warning level.

use crate::{
    core::{ledger, sku as sku_ops},
    entities::{Sku, sku, stock_adjustment},
    errors::Result,
};
use sea_orm::{QueryOrder, prelude::*};

/// A SKU's stock position.
#[derive(Debug, Clone)]
pub struct StockReport {
    /// The SKU being reported on
    pub sku: sku::Model,
    /// Product code and SKU code, e.g. `"PROD123-A"`
    pub qualified_code: String,
    /// Stock according to the latest ledger entry
    pub current_stock: i32,
    /// The SKU's warning level
    pub stock_warning_level: i32,
    /// `true` when current stock is at or below the warning level
    pub is_low_stock: bool,
    /// Most recent ledger entries, newest first
    pub recent_entries: Vec<stock_adjustment::Model>,
}

/// Returns `true` if `current_stock` is at or below `warning_level`.
#[must_use]
pub const fn is_low_stock(current_stock: i32, warning_level: i32) -> bool {
    current_stock <= warning_level
}

/// Generates a stock report for one SKU.
///
/// # Arguments
/// * `db` - Database connection
/// * `sku_id` - ID of the SKU to report on
/// * `entry_limit` - Maximum number of recent ledger entries to include (default 10)
///
/// # Errors
/// Returns `Error::SkuNotFound` if the SKU does not exist.
pub async fn generate_stock_report(
    db: &DatabaseConnection,
    sku_id: i64,
    entry_limit: Option<u64>,
) -> Result<StockReport> {
    let sku = ledger::find_sku(db, sku_id).await?;
    let current_stock = ledger::stock_of(db, &sku).await?;
    build_report(db, sku, current_stock, entry_limit.unwrap_or(10)).await
}

async fn build_report(
    db: &DatabaseConnection,
    sku: sku::Model,
    current_stock: i32,
    entry_limit: u64,
) -> Result<StockReport> {
    let qualified_code = sku_ops::qualified_code(db, sku.id).await?;
    let recent_entries = ledger::recent_entries(db, sku.id, entry_limit).await?;

    Ok(StockReport {
        qualified_code,
        current_stock,
        stock_warning_level: sku.stock_warning_level,
        is_low_stock: is_low_stock(current_stock, sku.stock_warning_level),
        recent_entries,
        sku,
    })
}

/// Lists reports for every active SKU at or below its warning level, ordered by SKU ID.
///
/// Only the latest ledger entry is included in each report.
///
/// # Errors
/// Returns an error if the database query fails, or `Error::ProductNotFound` if a low
/// SKU's product is missing.
pub async fn low_stock_skus(db: &DatabaseConnection) -> Result<Vec<StockReport>> {
    let skus = Sku::find()
        .filter(sku::Column::Active.eq(true))
        .order_by_asc(sku::Column::Id)
        .all(db)
        .await?;

    let mut reports = Vec::new();
    for sku in skus {
        let current = ledger::stock_of(db, &sku).await?;
        if is_low_stock(current, sku.stock_warning_level) {
            reports.push(build_report(db, sku, current, 1).await?);
        }
    }
    Ok(reports)
}

/// Formats a one-line summary such as `"PROD123-A: 2 in stock (warning level 3) LOW"`.
#[must_use]
pub fn format_stock_line(report: &StockReport) -> String {
    let flag = if report.is_low_stock { " LOW" } else { "" };
    format!(
        "{}: {} in stock (warning level {}){flag}",
        report.qualified_code, report.current_stock, report.stock_warning_level
    )
}
