//! Attribute validation shared by SKU create and update.
//!
//! Every check pushes onto a caller-owned `Vec<ValidationError>` instead of returning early,
//! so one pass reports every violated rule.

use crate::errors::{ValidationError, ValidationRule};
use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;
use std::str::FromStr;

// Optional `$`, digits, optional `.` or `,` separator, then at most two fractional digits.
const CURRENCY_PATTERN: &str = r"^\$?\d+[.,]?\d{0,2}$";

#[allow(clippy::expect_used)]
static CURRENCY_FORMAT: Lazy<Regex> =
    Lazy::new(|| Regex::new(CURRENCY_PATTERN).expect("currency pattern compiles"));

/// Money and dimension columns are `DECIMAL(8, 2)`.
const MAX_INTEGER_DIGITS: u32 = 6;
const MAX_SCALE: u32 = 2;

/// Returns `true` if `input` is a currency-like amount such as `"10"`, `"$5.5"` or `"12,99"`.
#[must_use]
pub fn is_currency_format(input: &str) -> bool {
    CURRENCY_FORMAT.is_match(input)
}

/// Parses a string already accepted by [`is_currency_format`] into a `Decimal`.
#[must_use]
pub fn parse_currency(input: &str) -> Option<Decimal> {
    let normalized = input.trim_start_matches('$').replace(',', ".");
    Decimal::from_str(normalized.trim_end_matches('.')).ok()
}

pub(crate) fn blank(field: &'static str) -> ValidationError {
    ValidationError::new(field, ValidationRule::Presence, "can't be blank")
}

/// Checks that a text attribute is present and not blank.
pub(crate) fn check_text<'a>(
    field: &'static str,
    value: Option<&'a str>,
    errors: &mut Vec<ValidationError>,
) -> Option<&'a str> {
    match value {
        Some(text) if !text.trim().is_empty() => Some(text),
        _ => {
            errors.push(blank(field));
            None
        }
    }
}

/// Checks presence and currency format, returning the parsed amount.
pub(crate) fn check_currency(
    field: &'static str,
    value: Option<&str>,
    errors: &mut Vec<ValidationError>,
) -> Option<Decimal> {
    let text = check_text(field, value, errors)?.trim();
    match parse_currency(text).filter(|_| is_currency_format(text)) {
        Some(amount) => check_precision(field, amount, errors),
        None => {
            errors.push(ValidationError::new(
                field,
                ValidationRule::Format,
                "is not a valid amount",
            ));
            None
        }
    }
}

/// Checks presence and `value >= 0`.
pub(crate) fn check_non_negative(
    field: &'static str,
    value: Option<Decimal>,
    errors: &mut Vec<ValidationError>,
) -> Option<Decimal> {
    let Some(value) = value else {
        errors.push(blank(field));
        return None;
    };
    if value.is_sign_negative() && !value.is_zero() {
        errors.push(ValidationError::new(
            field,
            ValidationRule::Numericality,
            "must be greater than or equal to 0",
        ));
        return None;
    }
    check_precision(field, value, errors)
}

/// Checks that `value` fits a `DECIMAL(8, 2)` column: at most six digits before the
/// decimal point and two after it.
pub(crate) fn check_precision(
    field: &'static str,
    value: Decimal,
    errors: &mut Vec<ValidationError>,
) -> Option<Decimal> {
    let message = if value.normalize().scale() > MAX_SCALE {
        format!("must have at most {MAX_SCALE} decimal places")
    } else if value.trunc().abs() >= Decimal::from(10_i64.pow(MAX_INTEGER_DIGITS)) {
        format!("must have at most {MAX_INTEGER_DIGITS} digits before the decimal point")
    } else {
        return Some(value);
    };
    errors.push(ValidationError::new(field, ValidationRule::Numericality, message));
    None
}

/// Checks presence and `value >= 1` for stock figures.
pub(crate) fn check_stock_figure(
    field: &'static str,
    value: Option<i32>,
    errors: &mut Vec<ValidationError>,
) -> Option<i32> {
    let Some(value) = value else {
        errors.push(blank(field));
        return None;
    };
    if value < 1 {
        errors.push(ValidationError::new(
            field,
            ValidationRule::Numericality,
            "must be greater than or equal to 1",
        ));
        return None;
    }
    Some(value)
}

/// Checks that declared stock is strictly above the warning level.
///
/// Only runs when both figures are present; missing figures are already reported.
pub(crate) fn check_stock_exceeds_warning_level(
    declared_stock: Option<i32>,
    stock_warning_level: Option<i32>,
    errors: &mut Vec<ValidationError>,
) -> bool {
    match (declared_stock, stock_warning_level) {
        (Some(stock), Some(warning)) if stock <= warning => {
            errors.push(ValidationError::new(
                "declared_stock",
                ValidationRule::StockExceedsWarningLevel,
                "must be greater than the stock warning level",
            ));
            false
        }
        _ => true,
    }
}

pub(crate) fn code_taken(field: &'static str) -> ValidationError {
    ValidationError::new(field, ValidationRule::Uniqueness, "has already been taken")
}
