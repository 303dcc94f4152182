//! Notification entity - Polymorphic notices attached to any record.
//!
//! `notifiable_type` names the owning table's record kind (e.g. `"Sku"`) and
//! `notifiable_id` its primary key, so there is no foreign key to declare.
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Record kind used for notifications attached to SKUs
pub const SKU_NOTIFIABLE_TYPE: &str = "Sku";

/// Notification database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "notifications")]
pub struct Model {
    /// Unique identifier for the notification
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Kind of record the notice is attached to, e.g. [`SKU_NOTIFIABLE_TYPE`]
    pub notifiable_type: String,
    /// ID of the record the notice is attached to
    pub notifiable_id: i64,
    /// Human-readable notice
    pub message: String,
    /// When the notice was raised
    pub created_at: DateTimeUtc,
}

/// Notifications have no foreign keys
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
