//! Stock adjustment entity - One immutable entry of a SKU's stock ledger.
//!
//! Rows are only ever inserted. `stock_total` is the absolute stock level after applying
//! `adjustment`; the newest row by (`created_at`, `id`) is the SKU's current stock.
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Stock adjustment database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "stock_adjustments")]
pub struct Model {
    /// Unique identifier, also the tie-breaker for entries sharing a timestamp
    #[sea_orm(primary_key)]
    pub id: i64,
    /// ID of the SKU this entry belongs to
    pub sku_id: i64,
    /// Free-text reason, e.g. `"Initial stock"`
    pub description: String,
    /// Signed change in stock
    pub adjustment: i32,
    /// Resulting absolute stock level
    pub stock_total: i32,
    /// When the entry was recorded
    pub created_at: DateTimeUtc,
}

/// Defines relationships between StockAdjustment and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each entry belongs to one SKU
    #[sea_orm(
        belongs_to = "super::sku::Entity",
        from = "Column::SkuId",
        to = "super::sku::Column::Id",
        on_delete = "Cascade"
    )]
    Sku,
}

impl Related<super::sku::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Sku.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
