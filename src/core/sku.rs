//! SKU business logic - Creation, updates, deletion and stock lookups for product variants.
//!
//! Creating a SKU validates every attribute, collecting all violations, then inserts the
//! SKU and its `"Initial stock"` ledger entry in one database transaction. Updating a SKU's
//! weight recomputes the cached weight of every cart line holding it once the SKU update
//! has committed; failures on individual lines are reported rather than rolled back.

use crate::{
    core::{cart, ledger, order, validation},
    entities::{
        CartItem, Notification, Product, Sku, SkuVariant, StockAdjustment, cart_item,
        notification, sku, sku_variant, stock_adjustment,
    },
    errors::{Error, Result, ValidationError, ValidationRule},
};
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};
use tracing::{info, instrument, warn};

/// Attributes for a new SKU.
///
/// Every field is optional so that missing input is reported as a validation error
/// alongside any other problems, rather than being rejected by the type system first.
#[derive(Debug, Clone, Default)]
pub struct NewSku {
    /// Owning product
    pub product_id: i64,
    /// Unique within the product among SKUs with the same `active` value
    pub code: Option<String>,
    /// Price in currency format, e.g. `"$10.00"` or `"10,5"`
    pub price: Option<String>,
    /// Cost in currency format
    pub cost_value: Option<String>,
    /// Non-negative, at most two decimal places
    pub length: Option<Decimal>,
    /// Unit weight used for cart line weights
    pub weight: Option<Decimal>,
    /// Non-negative, at most two decimal places
    pub thickness: Option<Decimal>,
    /// Opening stock, recorded as the first ledger entry
    pub declared_stock: Option<i32>,
    /// Stock at or below this level counts as low; must be below `declared_stock`
    pub stock_warning_level: Option<i32>,
    /// Defaults to `true`
    pub active: Option<bool>,
}

/// Attribute changes for an existing SKU. `None` leaves the attribute untouched.
///
/// Stock figures are deliberately absent: stock only changes through the ledger.
#[derive(Debug, Clone, Default)]
pub struct SkuChanges {
    /// New code; re-checked for uniqueness
    pub code: Option<String>,
    /// New price in currency format
    pub price: Option<String>,
    /// New cost in currency format
    pub cost_value: Option<String>,
    /// New length
    pub length: Option<Decimal>,
    /// New unit weight; a change is pushed to every cart line holding the SKU
    pub weight: Option<Decimal>,
    /// New thickness
    pub thickness: Option<Decimal>,
    /// Moves the SKU between the active and inactive uniqueness scopes
    pub active: Option<bool>,
}

/// A cart line whose cached weight could not be refreshed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartLineFailure {
    /// The failing line, or `None` when the lines could not be listed at all
    pub cart_item_id: Option<i64>,
    /// Error reported by the database
    pub message: String,
}

/// Outcome of recomputing cart line weights after a SKU weight change.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WeightPropagation {
    /// IDs of the cart lines that now hold the new weight
    pub updated: Vec<i64>,
    /// Lines left with their old weight
    pub failed: Vec<CartLineFailure>,
}

impl WeightPropagation {
    /// Returns `true` when every cart line was refreshed.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Result of [`update_sku`].
#[derive(Debug, Clone)]
pub struct SkuUpdate {
    /// The SKU as saved
    pub sku: sku::Model,
    /// Present only when the weight changed
    pub weight_propagation: Option<WeightPropagation>,
}

struct ValidSku {
    code: String,
    price: Decimal,
    cost_value: Decimal,
    length: Decimal,
    weight: Decimal,
    thickness: Decimal,
    declared_stock: i32,
    stock_warning_level: i32,
}

fn check_new_sku(attrs: &NewSku, errors: &mut Vec<ValidationError>) -> Option<ValidSku> {
    let code = validation::check_text("code", attrs.code.as_deref(), errors);
    let price = validation::check_currency("price", attrs.price.as_deref(), errors);
    let cost_value = validation::check_currency("cost_value", attrs.cost_value.as_deref(), errors);
    let length = validation::check_non_negative("length", attrs.length, errors);
    let weight = validation::check_non_negative("weight", attrs.weight, errors);
    let thickness = validation::check_non_negative("thickness", attrs.thickness, errors);
    let declared_stock =
        validation::check_stock_figure("declared_stock", attrs.declared_stock, errors);
    let stock_warning_level =
        validation::check_stock_figure("stock_warning_level", attrs.stock_warning_level, errors);
    let stock_ok = validation::check_stock_exceeds_warning_level(
        attrs.declared_stock,
        attrs.stock_warning_level,
        errors,
    );

    Some(ValidSku {
        code: code?.to_string(),
        price: price?,
        cost_value: cost_value?,
        length: length?,
        weight: weight?,
        thickness: thickness?,
        declared_stock: declared_stock.filter(|_| stock_ok)?,
        stock_warning_level: stock_warning_level?,
    })
}

/// Returns `true` if another SKU of the product already uses `code` under the same
/// `active` value.
async fn code_in_use<C>(
    db: &C,
    product_id: i64,
    code: &str,
    active: bool,
    exclude_id: Option<i64>,
) -> Result<bool>
where
    C: ConnectionTrait,
{
    let mut query = Sku::find()
        .filter(sku::Column::ProductId.eq(product_id))
        .filter(sku::Column::Code.eq(code))
        .filter(sku::Column::Active.eq(active));
    if let Some(id) = exclude_id {
        query = query.filter(sku::Column::Id.ne(id));
    }
    Ok(query.count(db).await? > 0)
}

/// Retrieves a SKU by its unique ID.
///
/// # Errors
/// Returns an error if the database query fails. An unknown ID is `Ok(None)`.
pub async fn get_sku_by_id(db: &DatabaseConnection, sku_id: i64) -> Result<Option<sku::Model>> {
    Sku::find_by_id(sku_id).one(db).await.map_err(Into::into)
}

/// Retrieves the active SKUs of a product, ordered by code.
///
/// # Errors
/// Returns an error if the database query fails.
pub async fn get_active_skus_for_product(
    db: &DatabaseConnection,
    product_id: i64,
) -> Result<Vec<sku::Model>> {
    Sku::find()
        .filter(sku::Column::ProductId.eq(product_id))
        .filter(sku::Column::Active.eq(true))
        .order_by_asc(sku::Column::Code)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Creates a SKU and its initial ledger entry.
///
/// # Errors
/// Returns `Error::Validation` listing every violated rule:
/// - price, cost value, length, weight, thickness or code missing
/// - price or cost value not in currency format
/// - length, weight or thickness negative
/// - a decimal with more than six integer digits or two decimal places
/// - declared stock or warning level missing or below 1
/// - declared stock not strictly above the warning level
/// - code already used by another SKU of the product with the same `active` value
/// - owning product missing
///
/// Nothing is persisted when validation fails. Database errors are returned as-is.
#[instrument(skip(db, attrs), fields(product_id = attrs.product_id))]
pub async fn create_sku(db: &DatabaseConnection, attrs: NewSku) -> Result<sku::Model> {
    // Uniqueness check, insert and ledger entry share one transaction
    let txn = db.begin().await?;
    let sku = insert_sku(&txn, attrs).await?;
    txn.commit().await?;

    info!(sku_id = sku.id, code = %sku.code, "Created SKU");
    Ok(sku)
}

/// Validates and inserts a SKU plus its initial ledger entry on `db`.
///
/// Callers own the transaction; [`create_sku`] opens one per SKU, catalog seeding one
/// for the whole catalog.
pub(crate) async fn insert_sku<C>(db: &C, attrs: NewSku) -> Result<sku::Model>
where
    C: ConnectionTrait,
{
    let active = attrs.active.unwrap_or(true);
    let mut errors = Vec::new();
    let valid = check_new_sku(&attrs, &mut errors);

    if Product::find_by_id(attrs.product_id).one(db).await?.is_none() {
        errors.push(ValidationError::new(
            "product",
            ValidationRule::Reference,
            "must exist",
        ));
    }
    if let Some(code) = attrs.code.as_deref().filter(|c| !c.trim().is_empty()) {
        if code_in_use(db, attrs.product_id, code, active, None).await? {
            errors.push(validation::code_taken("code"));
        }
    }

    let valid = match valid {
        Some(valid) if errors.is_empty() => valid,
        _ => return Err(Error::Validation { errors }),
    };

    let now = chrono::Utc::now();
    let sku = sku::ActiveModel {
        product_id: Set(attrs.product_id),
        code: Set(valid.code),
        length: Set(valid.length),
        weight: Set(valid.weight),
        thickness: Set(valid.thickness),
        price: Set(valid.price),
        cost_value: Set(valid.cost_value),
        declared_stock: Set(valid.declared_stock),
        stock_warning_level: Set(valid.stock_warning_level),
        active: Set(active),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await?;

    ledger::insert_entry(
        db,
        sku.id,
        ledger::INITIAL_STOCK_DESCRIPTION.to_string(),
        sku.declared_stock,
        sku.declared_stock,
    )
    .await?;

    Ok(sku)
}

/// Updates a SKU's attributes and, when its weight changed, refreshes cart line weights.
///
/// Stock figures are not part of an update and are never re-validated. The weight fan-out
/// runs after the SKU update is saved; its per-line failures are returned in
/// [`SkuUpdate::weight_propagation`] and do not undo the update.
///
/// # Errors
/// Returns `Error::SkuNotFound` if the SKU does not exist, `Error::Validation` listing every
/// violated rule among the changed attributes, or a database error.
#[instrument(skip(db, changes))]
pub async fn update_sku(
    db: &DatabaseConnection,
    sku_id: i64,
    changes: SkuChanges,
) -> Result<SkuUpdate> {
    let existing = ledger::find_sku(db, sku_id).await?;
    let mut errors = Vec::new();

    let code = match changes.code.as_deref() {
        Some(code) => validation::check_text("code", Some(code), &mut errors).map(str::to_string),
        None => None,
    };
    let price = match changes.price.as_deref() {
        Some(price) => validation::check_currency("price", Some(price), &mut errors),
        None => None,
    };
    let cost_value = match changes.cost_value.as_deref() {
        Some(cost) => validation::check_currency("cost_value", Some(cost), &mut errors),
        None => None,
    };
    let length = changes
        .length
        .and_then(|v| validation::check_non_negative("length", Some(v), &mut errors));
    let weight = changes
        .weight
        .and_then(|v| validation::check_non_negative("weight", Some(v), &mut errors));
    let thickness = changes
        .thickness
        .and_then(|v| validation::check_non_negative("thickness", Some(v), &mut errors));

    let new_code = code.clone().unwrap_or_else(|| existing.code.clone());
    let new_active = changes.active.unwrap_or(existing.active);
    let scope_changed = new_code != existing.code || new_active != existing.active;
    if scope_changed
        && code_in_use(db, existing.product_id, &new_code, new_active, Some(sku_id)).await?
    {
        errors.push(validation::code_taken("code"));
    }

    if !errors.is_empty() {
        return Err(Error::Validation { errors });
    }

    let weight_changed = weight.is_some_and(|w| w != existing.weight);

    let mut model: sku::ActiveModel = existing.into();
    if let Some(code) = code {
        model.code = Set(code);
    }
    if let Some(price) = price {
        model.price = Set(price);
    }
    if let Some(cost_value) = cost_value {
        model.cost_value = Set(cost_value);
    }
    if let Some(length) = length {
        model.length = Set(length);
    }
    if let Some(weight) = weight {
        model.weight = Set(weight);
    }
    if let Some(thickness) = thickness {
        model.thickness = Set(thickness);
    }
    if let Some(active) = changes.active {
        model.active = Set(active);
    }
    model.updated_at = Set(chrono::Utc::now());

    let sku = model.update(db).await?;

    let weight_propagation = if weight_changed {
        Some(propagate_weight(db, &sku).await)
    } else {
        None
    };

    Ok(SkuUpdate {
        sku,
        weight_propagation,
    })
}

/// Recomputes `sku.weight * quantity` for every cart line holding the SKU.
///
/// Each line is written on its own; a failure is recorded and the remaining lines are
/// still processed.
async fn propagate_weight(db: &DatabaseConnection, sku: &sku::Model) -> WeightPropagation {
    let mut outcome = WeightPropagation::default();

    let items = match cart::get_cart_items_for_sku(db, sku.id).await {
        Ok(items) => items,
        Err(e) => {
            warn!(sku_id = sku.id, error = %e, "Could not list cart lines for weight update");
            outcome.failed.push(CartLineFailure {
                cart_item_id: None,
                message: e.to_string(),
            });
            return outcome;
        }
    };

    for item in items {
        let weight = cart::line_weight(sku.weight, item.quantity);
        match cart::update_cart_item_weight(db, item.id, weight).await {
            Ok(()) => outcome.updated.push(item.id),
            Err(e) => {
                warn!(cart_item_id = item.id, error = %e, "Failed to update cart line weight");
                outcome.failed.push(CartLineFailure {
                    cart_item_id: Some(item.id),
                    message: e.to_string(),
                });
            }
        }
    }

    info!(
        sku_id = sku.id,
        updated = outcome.updated.len(),
        failed = outcome.failed.len(),
        "Propagated SKU weight to cart lines"
    );
    outcome
}

/// Returns the SKU's current stock: the `stock_total` of its latest ledger entry, or its
/// declared stock if the ledger is empty.
///
/// # Errors
/// Returns `Error::SkuNotFound` if the SKU does not exist.
pub async fn current_stock(db: &DatabaseConnection, sku_id: i64) -> Result<i32> {
    let sku = ledger::find_sku(db, sku_id).await?;
    ledger::stock_of(db, &sku).await
}

/// Joins the owning product's code and the SKU's code with a hyphen, e.g. `"PROD123-A"`.
///
/// # Errors
/// Returns `Error::SkuNotFound` or `Error::ProductNotFound` if either record is missing.
pub async fn qualified_code(db: &DatabaseConnection, sku_id: i64) -> Result<String> {
    let sku = ledger::find_sku(db, sku_id).await?;
    let product = sku
        .find_related(Product)
        .one(db)
        .await?
        .ok_or(Error::ProductNotFound { id: sku.product_id })?;
    Ok(format!("{}-{}", product.sku, sku.code))
}

/// Permanently deletes a SKU together with its cart lines, notifications, ledger and
/// variant selections.
///
/// # Errors
/// Returns `Error::Constraint` while any order line references the SKU (nothing is
/// changed), `Error::SkuNotFound` if it does not exist, or a database error.
#[instrument(skip(db))]
pub async fn delete_sku(db: &DatabaseConnection, sku_id: i64) -> Result<()> {
    let txn = db.begin().await?;

    let sku = ledger::find_sku(&txn, sku_id).await?;

    if order::has_order_items_for_sku(&txn, sku_id).await? {
        return Err(Error::Constraint {
            message: format!("SKU {} is referenced by order items", sku.code),
        });
    }

    CartItem::delete_many()
        .filter(cart_item::Column::SkuId.eq(sku_id))
        .exec(&txn)
        .await?;
    Notification::delete_many()
        .filter(notification::Column::NotifiableType.eq(notification::SKU_NOTIFIABLE_TYPE))
        .filter(notification::Column::NotifiableId.eq(sku_id))
        .exec(&txn)
        .await?;
    StockAdjustment::delete_many()
        .filter(stock_adjustment::Column::SkuId.eq(sku_id))
        .exec(&txn)
        .await?;
    SkuVariant::delete_many()
        .filter(sku_variant::Column::SkuId.eq(sku_id))
        .exec(&txn)
        .await?;

    sku.delete(&txn).await?;
    txn.commit().await?;

    info!(sku_id, "Deleted SKU");
    Ok(())
}

async fn set_active(db: &DatabaseConnection, sku_id: i64, active: bool) -> Result<sku::Model> {
    let update = update_sku(
        db,
        sku_id,
        SkuChanges {
            active: Some(active),
            ..Default::default()
        },
    )
    .await?;
    Ok(update.sku)
}

/// Marks a SKU inactive, freeing its code for a new active SKU of the same product.
///
/// # Errors
/// Returns `Error::Validation` if an inactive SKU of the product already uses this code.
pub async fn deactivate_sku(db: &DatabaseConnection, sku_id: i64) -> Result<sku::Model> {
    set_active(db, sku_id, false).await
}

/// Marks a SKU active again.
///
/// # Errors
/// Returns `Error::Validation` if an active SKU of the product already uses this code.
pub async fn activate_sku(db: &DatabaseConnection, sku_id: i64) -> Result<sku::Model> {
    set_active(db, sku_id, true).await
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;
    use rust_decimal_macros::dec;

    fn rules(error: &Error) -> Vec<(&'static str, ValidationRule)> {
        error
            .validation_errors()
            .iter()
            .map(|e| (e.field, e.rule))
            .collect()
    }

    #[tokio::test]
    async fn test_create_sku_scenario() -> Result<()> {
        let db = setup_test_db().await?;
        let product = create_test_product(&db, "PROD123").await?;

        let sku = create_sku(&db, valid_new_sku(product.id, "A1")).await?;

        assert_eq!(sku.code, "A1");
        assert_eq!(sku.price, dec!(10.00));
        assert_eq!(sku.cost_value, dec!(5.00));
        assert_eq!(sku.weight, dec!(2));
        assert_eq!(sku.thickness, dec!(0.5));
        assert!(sku.active);
        assert_eq!(current_stock(&db, sku.id).await?, 10);

        Ok(())
    }

    #[tokio::test]
    async fn test_create_sku_stock_equal_to_warning_level_fails() -> Result<()> {
        let db = setup_test_db().await?;
        let product = create_test_product(&db, "PROD123").await?;

        let attrs = NewSku {
            declared_stock: Some(5),
            stock_warning_level: Some(5),
            ..valid_new_sku(product.id, "A1")
        };
        let err = create_sku(&db, attrs).await.unwrap_err();
        assert_eq!(
            rules(&err),
            vec![("declared_stock", ValidationRule::StockExceedsWarningLevel)]
        );

        // Neither a SKU nor a ledger entry was written
        assert_eq!(Sku::find().count(&db).await?, 0);
        assert_eq!(StockAdjustment::find().count(&db).await?, 0);

        Ok(())
    }

    #[tokio::test]
    async fn test_create_sku_collects_every_violation() -> Result<()> {
        let db = setup_test_db().await?;
        let product = create_test_product(&db, "PROD123").await?;

        let attrs = NewSku {
            product_id: product.id,
            code: Some("  ".to_string()),
            price: Some("ten".to_string()),
            cost_value: None,
            length: Some(dec!(-1)),
            weight: Some(dec!(2)),
            thickness: None,
            declared_stock: Some(0),
            stock_warning_level: Some(3),
            active: None,
        };
        let err = create_sku(&db, attrs).await.unwrap_err();

        let found = rules(&err);
        assert!(found.contains(&("code", ValidationRule::Presence)));
        assert!(found.contains(&("price", ValidationRule::Format)));
        assert!(found.contains(&("cost_value", ValidationRule::Presence)));
        assert!(found.contains(&("length", ValidationRule::Numericality)));
        assert!(found.contains(&("thickness", ValidationRule::Presence)));
        assert!(found.contains(&("declared_stock", ValidationRule::Numericality)));
        assert!(found.contains(&(
            "declared_stock",
            ValidationRule::StockExceedsWarningLevel
        )));
        assert_eq!(found.len(), 7);

        Ok(())
    }

    #[tokio::test]
    async fn test_create_sku_rejects_values_beyond_column_precision() -> Result<()> {
        let db = setup_test_db().await?;
        let product = create_test_product(&db, "PROD123").await?;

        let attrs = NewSku {
            price: Some("12345678901234567.89".to_string()),
            weight: Some(dec!(0.355)),
            ..valid_new_sku(product.id, "A1")
        };
        let err = create_sku(&db, attrs).await.unwrap_err();
        assert_eq!(
            rules(&err),
            vec![
                ("price", ValidationRule::Numericality),
                ("weight", ValidationRule::Numericality),
            ]
        );
        assert_eq!(Sku::find().count(&db).await?, 0);

        // The largest DECIMAL(8, 2) values still fit
        let attrs = NewSku {
            price: Some("$999999.99".to_string()),
            weight: Some(dec!(0.35)),
            ..valid_new_sku(product.id, "A1")
        };
        let sku = create_sku(&db, attrs).await?;
        assert_eq!(sku.price, dec!(999999.99));

        Ok(())
    }

    #[tokio::test]
    async fn test_create_sku_missing_stock_figures() -> Result<()> {
        let db = setup_test_db().await?;
        let product = create_test_product(&db, "PROD123").await?;

        let attrs = NewSku {
            declared_stock: None,
            stock_warning_level: None,
            ..valid_new_sku(product.id, "A1")
        };
        let err = create_sku(&db, attrs).await.unwrap_err();
        assert_eq!(
            rules(&err),
            vec![
                ("declared_stock", ValidationRule::Presence),
                ("stock_warning_level", ValidationRule::Presence),
            ]
        );

        Ok(())
    }

    #[tokio::test]
    async fn test_create_sku_unknown_product() -> Result<()> {
        let db = setup_test_db().await?;

        let err = create_sku(&db, valid_new_sku(999, "A1")).await.unwrap_err();
        assert_eq!(rules(&err), vec![("product", ValidationRule::Reference)]);

        Ok(())
    }

    #[tokio::test]
    async fn test_code_unique_among_active_skus() -> Result<()> {
        let db = setup_test_db().await?;
        let product = create_test_product(&db, "PROD123").await?;

        let first = create_sku(&db, valid_new_sku(product.id, "A1")).await?;
        let err = create_sku(&db, valid_new_sku(product.id, "A1")).await.unwrap_err();
        assert_eq!(rules(&err), vec![("code", ValidationRule::Uniqueness)]);

        // Same code under another product is fine
        let other = create_test_product(&db, "PROD456").await?;
        create_sku(&db, valid_new_sku(other.id, "A1")).await?;

        // Reusable once the first SKU is inactive
        let deactivated = deactivate_sku(&db, first.id).await?;
        assert!(!deactivated.active);
        let second = create_sku(&db, valid_new_sku(product.id, "A1")).await?;
        assert!(second.active);

        // Reactivating the first would now clash with the second
        let err = activate_sku(&db, first.id).await.unwrap_err();
        assert_eq!(rules(&err), vec![("code", ValidationRule::Uniqueness)]);

        Ok(())
    }

    #[tokio::test]
    async fn test_update_sku_weight_propagates_to_cart_lines() -> Result<()> {
        let (db, _product, sku) = setup_with_sku().await?;

        let line_a = cart::add_cart_item(&db, 1, sku.id, 2).await?;
        let line_b = cart::add_cart_item(&db, 2, sku.id, 5).await?;
        assert_eq!(line_a.weight, dec!(4));

        let update = update_sku(
            &db,
            sku.id,
            SkuChanges {
                weight: Some(dec!(3)),
                ..Default::default()
            },
        )
        .await?;

        assert_eq!(update.sku.weight, dec!(3));
        let propagation = update.weight_propagation.unwrap();
        assert!(propagation.is_complete());
        assert_eq!(propagation.updated.len(), 2);

        let a = CartItem::find_by_id(line_a.id).one(&db).await?.unwrap();
        let b = CartItem::find_by_id(line_b.id).one(&db).await?.unwrap();
        assert_eq!(a.weight, dec!(6));
        assert_eq!(b.weight, dec!(15));

        Ok(())
    }

    #[tokio::test]
    async fn test_weight_update_survives_failed_cart_line() -> Result<()> {
        use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

        let now = chrono::Utc::now();
        let stored = sku::Model {
            id: 1,
            product_id: 1,
            code: "A1".to_string(),
            length: dec!(1),
            weight: dec!(2),
            thickness: dec!(0.5),
            price: dec!(10),
            cost_value: dec!(5),
            declared_stock: 10,
            stock_warning_level: 3,
            active: true,
            created_at: now,
            updated_at: now,
        };
        let saved = sku::Model {
            weight: dec!(3),
            ..stored.clone()
        };
        let line = |id: i64, quantity: i32| cart_item::Model {
            id,
            cart_id: id,
            sku_id: 1,
            quantity,
            weight: dec!(2) * Decimal::from(quantity),
            created_at: now,
        };

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![stored]])
            .append_query_results(vec![vec![saved]])
            .append_query_results(vec![vec![line(10, 2), line(11, 5)]])
            .append_exec_results(vec![MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }])
            .append_exec_errors(vec![DbErr::Custom("database is locked".to_string())])
            .into_connection();

        let update = update_sku(
            &db,
            1,
            SkuChanges {
                weight: Some(dec!(3)),
                ..Default::default()
            },
        )
        .await?;

        assert_eq!(update.sku.weight, dec!(3));
        let propagation = update.weight_propagation.unwrap();
        assert!(!propagation.is_complete());
        assert_eq!(propagation.updated, vec![10]);
        assert_eq!(propagation.failed.len(), 1);
        assert_eq!(propagation.failed[0].cart_item_id, Some(11));
        assert!(propagation.failed[0].message.contains("database is locked"));

        // The SKU update and both line updates were sent, and nothing rolled back
        let log = db.into_transaction_log();
        let updates = log
            .iter()
            .filter(|t| format!("{t:?}").contains("UPDATE"))
            .count();
        assert_eq!(updates, 3);
        assert!(!log.iter().any(|t| format!("{t:?}").contains("ROLLBACK")));

        Ok(())
    }

    #[tokio::test]
    async fn test_update_sku_without_weight_change_skips_propagation() -> Result<()> {
        let (db, _product, sku) = setup_with_sku().await?;
        cart::add_cart_item(&db, 1, sku.id, 2).await?;

        let update = update_sku(
            &db,
            sku.id,
            SkuChanges {
                price: Some("$12.50".to_string()),
                weight: Some(dec!(2)),
                ..Default::default()
            },
        )
        .await?;

        assert_eq!(update.sku.price, dec!(12.50));
        assert!(update.weight_propagation.is_none());

        Ok(())
    }

    #[tokio::test]
    async fn test_update_sku_validation() -> Result<()> {
        let (db, _product, sku) = setup_with_sku().await?;

        let err = update_sku(
            &db,
            sku.id,
            SkuChanges {
                price: Some("12.345".to_string()),
                thickness: Some(dec!(-2)),
                code: Some(String::new()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
        let found = rules(&err);
        assert!(found.contains(&("price", ValidationRule::Format)));
        assert!(found.contains(&("thickness", ValidationRule::Numericality)));
        assert!(found.contains(&("code", ValidationRule::Presence)));

        // Nothing changed
        let unchanged = get_sku_by_id(&db, sku.id).await?.unwrap();
        assert_eq!(unchanged.code, sku.code);
        assert_eq!(unchanged.price, sku.price);
        assert_eq!(unchanged.thickness, sku.thickness);

        Ok(())
    }

    #[tokio::test]
    async fn test_update_sku_rejects_values_beyond_column_precision() -> Result<()> {
        let (db, _product, sku) = setup_with_sku().await?;

        let err = update_sku(
            &db,
            sku.id,
            SkuChanges {
                cost_value: Some("1234567".to_string()),
                thickness: Some(dec!(1.005)),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
        assert_eq!(
            rules(&err),
            vec![
                ("cost_value", ValidationRule::Numericality),
                ("thickness", ValidationRule::Numericality),
            ]
        );

        let unchanged = get_sku_by_id(&db, sku.id).await?.unwrap();
        assert_eq!(unchanged.cost_value, sku.cost_value);
        assert_eq!(unchanged.thickness, sku.thickness);

        Ok(())
    }

    #[tokio::test]
    async fn test_update_sku_not_found() -> Result<()> {
        let db = setup_test_db().await?;
        let result = update_sku(&db, 999, SkuChanges::default()).await;
        assert!(matches!(result.unwrap_err(), Error::SkuNotFound { id: 999 }));
        Ok(())
    }

    #[tokio::test]
    async fn test_current_stock_follows_latest_entry() -> Result<()> {
        let (db, _product, sku) = setup_with_sku().await?;

        ledger::append_entry(&db, sku.id, "Received".to_string(), 4, 14).await?;
        assert_eq!(current_stock(&db, sku.id).await?, 14);

        let history = ledger::ledger_history(&db, sku.id).await?;
        assert_eq!(
            current_stock(&db, sku.id).await?,
            history.last().unwrap().stock_total
        );

        // The declared baseline is untouched
        assert_eq!(get_sku_by_id(&db, sku.id).await?.unwrap().declared_stock, 10);

        Ok(())
    }

    #[tokio::test]
    async fn test_current_stock_falls_back_to_declared_stock() -> Result<()> {
        let (db, _product, sku) = setup_with_sku().await?;

        StockAdjustment::delete_many()
            .filter(stock_adjustment::Column::SkuId.eq(sku.id))
            .exec(&db)
            .await?;
        assert_eq!(current_stock(&db, sku.id).await?, sku.declared_stock);

        Ok(())
    }

    #[tokio::test]
    async fn test_qualified_code() -> Result<()> {
        let db = setup_test_db().await?;
        let product = create_test_product(&db, "PROD123").await?;
        let sku = create_sku(&db, valid_new_sku(product.id, "A")).await?;

        assert_eq!(qualified_code(&db, sku.id).await?, "PROD123-A");

        Ok(())
    }

    #[tokio::test]
    async fn test_delete_sku_blocked_by_order_items() -> Result<()> {
        let (db, _product, sku) = setup_with_sku().await?;
        order::add_order_item(&db, 1, sku.id, 1).await?;

        let result = delete_sku(&db, sku.id).await;
        assert!(matches!(result.unwrap_err(), Error::Constraint { message: _ }));

        // Nothing changed
        assert!(get_sku_by_id(&db, sku.id).await?.is_some());
        assert_eq!(ledger::ledger_history(&db, sku.id).await?.len(), 1);

        Ok(())
    }

    #[tokio::test]
    async fn test_delete_sku_cascades() -> Result<()> {
        let (db, _product, sku) = setup_with_sku().await?;
        cart::add_cart_item(&db, 1, sku.id, 3).await?;
        ledger::adjust_stock(&db, sku.id, "Sold".to_string(), -8).await?;
        sku_variant::ActiveModel {
            sku_id: Set(sku.id),
            variant_type_id: Set(1),
            name: Set("Red".to_string()),
            ..Default::default()
        }
        .insert(&db)
        .await?;
        assert_eq!(ledger::get_notifications_for_sku(&db, sku.id).await?.len(), 1);

        delete_sku(&db, sku.id).await?;

        assert!(get_sku_by_id(&db, sku.id).await?.is_none());
        assert_eq!(CartItem::find().count(&db).await?, 0);
        assert_eq!(StockAdjustment::find().count(&db).await?, 0);
        assert_eq!(SkuVariant::find().count(&db).await?, 0);
        assert_eq!(Notification::find().count(&db).await?, 0);

        Ok(())
    }

    #[tokio::test]
    async fn test_delete_sku_not_found() -> Result<()> {
        let db = setup_test_db().await?;
        let result = delete_sku(&db, 999).await;
        assert!(matches!(result.unwrap_err(), Error::SkuNotFound { id: 999 }));
        Ok(())
    }

    #[tokio::test]
    async fn test_get_active_skus_for_product() -> Result<()> {
        let db = setup_test_db().await?;
        let product = create_test_product(&db, "PROD123").await?;
        let b = create_sku(&db, valid_new_sku(product.id, "B")).await?;
        let a = create_sku(&db, valid_new_sku(product.id, "A")).await?;
        let c = create_sku(&db, valid_new_sku(product.id, "C")).await?;
        deactivate_sku(&db, c.id).await?;

        let skus = get_active_skus_for_product(&db, product.id).await?;
        let ids: Vec<i64> = skus.iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![a.id, b.id]);

        Ok(())
    }
}
