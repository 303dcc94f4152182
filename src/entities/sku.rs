//! SKU entity - A sellable variant of a product.
//!
//! Holds identifying, physical and commercial attributes plus the stock figures declared
//! at creation. `declared_stock` is a baseline only: the authoritative stock level is the
//! latest row in `stock_adjustments` (see [`crate::core::ledger`]).

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// SKU database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "skus")]
pub struct Model {
    /// Unique identifier for the SKU
    #[sea_orm(primary_key)]
    pub id: i64,
    /// ID of the owning product
    pub product_id: i64,
    /// Variant code, unique per (`product_id`, `active`)
    pub code: String,
    /// Length in the catalog's length unit
    #[sea_orm(column_type = "Decimal(Some((8, 2)))")]
    pub length: Decimal,
    /// Weight per unit, cached into cart lines as `weight * quantity`
    #[sea_orm(column_type = "Decimal(Some((8, 2)))")]
    pub weight: Decimal,
    /// Thickness in the catalog's length unit
    #[sea_orm(column_type = "Decimal(Some((8, 2)))")]
    pub thickness: Decimal,
    /// Selling price
    #[sea_orm(column_type = "Decimal(Some((8, 2)))")]
    pub price: Decimal,
    /// Cost of goods
    #[sea_orm(column_type = "Decimal(Some((8, 2)))")]
    pub cost_value: Decimal,
    /// Stock declared at creation; only read as a fallback when the ledger is empty
    pub declared_stock: i32,
    /// Threshold at or below which stock is considered low
    pub stock_warning_level: i32,
    /// Soft delete flag - inactive SKUs do not block reuse of their code
    pub active: bool,
    /// When the SKU was created
    pub created_at: DateTimeUtc,
    /// When the SKU was last modified
    pub updated_at: DateTimeUtc,
}

/// Defines relationships between SKU and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each SKU belongs to one product
    #[sea_orm(
        belongs_to = "super::product::Entity",
        from = "Column::ProductId",
        to = "super::product::Column::Id"
    )]
    Product,
    /// One SKU appears in many cart lines
    #[sea_orm(has_many = "super::cart_item::Entity")]
    CartItems,
    /// One SKU appears in many order lines (these block deletion)
    #[sea_orm(has_many = "super::order_item::Entity")]
    OrderItems,
    /// One SKU owns its stock ledger
    #[sea_orm(has_many = "super::stock_adjustment::Entity")]
    StockAdjustments,
    /// One SKU has many variant selections
    #[sea_orm(has_many = "super::sku_variant::Entity")]
    Variants,
}

impl Related<super::product::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Product.def()
    }
}

impl Related<super::cart_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CartItems.def()
    }
}

impl Related<super::order_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::OrderItems.def()
    }
}

impl Related<super::stock_adjustment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::StockAdjustments.def()
    }
}

impl Related<super::sku_variant::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Variants.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
