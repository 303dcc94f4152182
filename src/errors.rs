//! Unified error type for the stock ledger.
//!
//! Validation failures are collected into a single [`Error::Validation`] so callers
//! see every violated rule at once instead of only the first.

use std::fmt;
use thiserror::Error;

/// The kind of rule a [`ValidationError`] reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationRule {
    /// A required attribute was missing or blank
    Presence,
    /// A value did not match the expected textual format
    Format,
    /// A numeric value was out of range
    Numericality,
    /// Declared stock was not strictly above the warning level
    StockExceedsWarningLevel,
    /// Another record already uses this value in the same scope
    Uniqueness,
    /// A referenced record does not exist
    Reference,
}

impl fmt::Display for ValidationRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Presence => "presence",
            Self::Format => "format",
            Self::Numericality => "numericality",
            Self::StockExceedsWarningLevel => "stock_exceeds_warning_level",
            Self::Uniqueness => "uniqueness",
            Self::Reference => "reference",
        };
        f.write_str(name)
    }
}

/// A single violated rule on a single attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Attribute name, e.g. `"price"`
    pub field: &'static str,
    /// Which rule was violated
    pub rule: ValidationRule,
    /// Human-readable message
    pub message: String,
}

impl ValidationError {
    pub(crate) fn new(field: &'static str, rule: ValidationRule, message: impl Into<String>) -> Self {
        Self {
            field,
            rule,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.field, self.message)
    }
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Every failure the stock ledger can report.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration could not be loaded or parsed
    #[error("Configuration error: {message}")]
    Config {
        /// What was wrong with the configuration
        message: String,
    },

    /// The database rejected a query or could not be reached
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// Reading a file failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// One or more attribute rules were violated; nothing was written
    #[error("Validation failed: {}", join_errors(.errors))]
    Validation {
        /// Every violated rule, in attribute order
        errors: Vec<ValidationError>,
    },

    /// A dependent record blocks the operation; nothing was changed
    #[error("Constraint violation: {message}")]
    Constraint {
        /// Which dependent blocked the operation
        message: String,
    },

    /// No SKU has this ID
    #[error("SKU not found: {id}")]
    SkuNotFound {
        /// The missing SKU ID
        id: i64,
    },

    /// No product has this ID
    #[error("Product not found: {id}")]
    ProductNotFound {
        /// The missing product ID
        id: i64,
    },

    /// No cart line has this ID
    #[error("Cart item not found: {id}")]
    CartItemNotFound {
        /// The missing cart line ID
        id: i64,
    },

    /// A stock adjustment would take stock below zero
    #[error("Insufficient stock: current {current}, adjustment {adjustment}")]
    InsufficientStock {
        /// Stock before the adjustment
        current: i32,
        /// The rejected change
        adjustment: i32,
    },

    /// A stock adjustment was zero or overflowed the stock total
    #[error("Invalid stock adjustment: {adjustment}")]
    InvalidAdjustment {
        /// The rejected change
        adjustment: i32,
    },
}

impl Error {
    /// Returns the collected validation errors, or an empty slice for any other variant.
    #[must_use]
    pub fn validation_errors(&self) -> &[ValidationError] {
        match self {
            Self::Validation { errors } => errors,
            _ => &[],
        }
    }
}

/// Convenience `Result` type using the crate's [`Error`].
pub type Result<T> = std::result::Result<T, Error>;
