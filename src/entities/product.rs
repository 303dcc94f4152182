//! Product entity - The owning catalog entry for a group of SKUs.
//!
//! Products are managed by the catalog layer; this crate only reads the product-level
//! `sku` code (used to build qualified SKU codes) and links SKUs to their owner.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Product database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "products")]
pub struct Model {
    /// Unique identifier for the product
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Display name of the product (e.g., "Leather Strap")
    pub name: String,
    /// Product-level code, prefixed onto every SKU code of this product
    pub sku: String,
    /// Soft delete flag - inactive products are hidden but keep their SKUs
    pub active: bool,
    /// When the product was created
    pub created_at: DateTimeUtc,
    /// When the product was last modified
    pub updated_at: DateTimeUtc,
}

/// Defines relationships between Product and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One product has many SKUs
    #[sea_orm(has_many = "super::sku::Entity")]
    Skus,
}

impl Related<super::sku::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Skus.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
