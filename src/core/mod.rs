//! Core business logic - framework-agnostic SKU, ledger and reporting operations.

/// Cart line lookups and weight updates
pub mod cart;
/// Append-only stock ledger
pub mod ledger;
/// Order line existence checks
pub mod order;
/// Product lookups and catalog seeding
pub mod product;
/// Stock position reports
pub mod report;
/// SKU lifecycle: create, update, delete, stock and codes
pub mod sku;
/// Attribute validation rules
pub mod validation;
