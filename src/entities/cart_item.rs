//! Cart item entity - A line in a shopper's cart.
//!
//! Carts are owned by the checkout layer. The ledger only keeps the cached `weight`
//! in step with the SKU (`sku.weight * quantity`).
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Cart item database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "cart_items")]
pub struct Model {
    /// Unique identifier for the cart line
    #[sea_orm(primary_key)]
    pub id: i64,
    /// ID of the owning cart
    pub cart_id: i64,
    /// ID of the SKU in this line
    pub sku_id: i64,
    /// Number of units
    pub quantity: i32,
    /// Cached line weight
    #[sea_orm(column_type = "Decimal(Some((8, 2)))")]
    pub weight: Decimal,
    /// When the line was added
    pub created_at: DateTimeUtc,
}

/// Defines relationships between CartItem and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
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
