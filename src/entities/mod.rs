//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities represent the database tables and their relationships.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod cart_item;
pub mod notification;
pub mod order_item;
pub mod product;
pub mod sku;
pub mod sku_variant;
pub mod stock_adjustment;

// Re-export specific types to avoid conflicts
pub use cart_item::{Column as CartItemColumn, Entity as CartItem, Model as CartItemModel};
pub use notification::{
    Column as NotificationColumn, Entity as Notification, Model as NotificationModel,
};
pub use order_item::{Column as OrderItemColumn, Entity as OrderItem, Model as OrderItemModel};
pub use product::{Column as ProductColumn, Entity as Product, Model as ProductModel};
pub use sku::{Column as SkuColumn, Entity as Sku, Model as SkuModel};
pub use sku_variant::{Column as SkuVariantColumn, Entity as SkuVariant, Model as SkuVariantModel};
pub use stock_adjustment::{
    Column as StockAdjustmentColumn, Entity as StockAdjustment, Model as StockAdjustmentModel,
};
