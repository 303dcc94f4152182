//! SKU variant entity - A selected option (e.g. colour "Red") for a SKU.
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Variant selection database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "sku_variants")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    /// ID of the SKU this option belongs to
    pub sku_id: i64,
    /// Option group, e.g. colour
    pub variant_type_id: i64,
    /// Selected value, e.g. `"Red"`
    pub name: String,
}

/// Defines relationships between variant selections and other entities
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
