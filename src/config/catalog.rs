//! Catalog configuration loading from catalog.toml
//!
//! This module loads the initial product catalog from a TOML file. The products and SKUs
//! defined there are used to seed an empty database on first run. Prices are kept as text
//! so they pass through the same currency-format validation as any other SKU input.

use crate::errors::{Error, Result};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::path::Path;

/// Configuration structure representing the entire catalog.toml file
#[derive(Debug, Deserialize)]
pub struct CatalogConfig {
    /// Products to seed, each with its SKUs
    #[serde(default)]
    pub products: Vec<ProductConfig>,
}

/// Configuration for a single product
#[derive(Debug, Deserialize, Clone)]
pub struct ProductConfig {
    /// Display name
    pub name: String,
    /// Product-level code prefix
    pub sku: String,
    /// Variants of this product
    #[serde(default)]
    pub skus: Vec<SkuConfig>,
}

/// Configuration for a single SKU
#[derive(Debug, Deserialize, Clone)]
pub struct SkuConfig {
    /// Variant code, e.g. `"BLK"`
    pub code: String,
    /// Price in currency format, e.g. `"$10.00"`
    pub price: String,
    /// Cost in currency format
    pub cost_value: String,
    /// Length, at most two decimal places
    pub length: Decimal,
    /// Unit weight
    pub weight: Decimal,
    /// Thickness
    pub thickness: Decimal,
    /// Opening stock, recorded as the first ledger entry
    pub stock: i32,
    /// Must be below `stock`
    pub stock_warning_level: i32,
}

/// Loads catalog configuration from a TOML file
///
/// # Errors
/// Returns an error if:
/// - The file cannot be read
/// - The TOML syntax is invalid
/// - Required fields are missing
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<CatalogConfig> {
    let path_ref = path.as_ref();
    tracing::debug!("Attempting to load catalog from: {:?}", path_ref);
    let contents = std::fs::read_to_string(path_ref).map_err(|e| Error::Config {
        message: format!("Failed to read catalog file {}: {e}", path_ref.display()),
    })?;

    toml::from_str(&contents).map_err(|e| Error::Config {
        message: format!("Failed to parse {}: {e}", path_ref.display()),
    })
}

/// Loads catalog configuration from the location named by `CATALOG_PATH`,
/// defaulting to `./catalog.toml`.
pub fn load_default_config() -> Result<CatalogConfig> {
    let path = std::env::var("CATALOG_PATH").unwrap_or_else(|_| "catalog.toml".to_string());
    load_config(path)
}
