//! Item catalog business logic - Handles item creation and barcode lookups.
//!
//! The bulk barcode lookup here is the matching half of the import pipeline:
//! one case-insensitive query covers every distinct barcode in a batch, so
//! row processing never issues per-row catalog queries.

use crate::{
    entities::{Item, item},
    errors::{Error, Result},
};
use sea_orm::sea_query::{Expr, Func};
use sea_orm::{QueryOrder, Set, prelude::*};
use std::collections::HashMap;

/// Retrieves all active (non-deleted) items, ordered alphabetically by name.
pub async fn get_all_active_items(db: &DatabaseConnection) -> Result<Vec<item::Model>> {
    Item::find()
        .filter(item::Column::IsDeleted.eq(false))
        .order_by_asc(item::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Retrieves a specific item by its unique ID.
pub async fn get_item_by_id(db: &DatabaseConnection, item_id: i64) -> Result<Option<item::Model>> {
    Item::find_by_id(item_id).one(db).await.map_err(Into::into)
}

/// Finds all non-deleted items whose barcode matches any of the given
/// barcodes, case-insensitively, in a single query.
///
/// Returns a map keyed by lowercased barcode for constant-time row matching.
/// One bulk query instead of one query per row keeps large imports from
/// amplifying into N catalog round-trips.
pub async fn find_items_by_barcodes(
    db: &DatabaseConnection,
    barcodes: &[String],
) -> Result<HashMap<String, item::Model>> {
    if barcodes.is_empty() {
        return Ok(HashMap::new());
    }

    let lowered: Vec<String> = barcodes.iter().map(|b| b.trim().to_lowercase()).collect();

    let items = Item::find()
        .filter(item::Column::IsDeleted.eq(false))
        .filter(Expr::expr(Func::lower(Expr::col(item::Column::Barcode))).is_in(lowered))
        .all(db)
        .await?;

    Ok(items
        .into_iter()
        .map(|item| (item.barcode.to_lowercase(), item))
        .collect())
}

/// Creates a new catalog item, performing input validation.
///
/// # Errors
/// Returns an error if:
/// - The barcode or name is empty or whitespace-only
/// - The cost is negative or not finite (NaN, infinity)
/// - The database insert operation fails (e.g., duplicate barcode)
pub async fn create_item(
    db: &DatabaseConnection,
    barcode: String,
    name: String,
    cost: f64,
) -> Result<item::Model> {
    if barcode.trim().is_empty() {
        return Err(Error::Config {
            message: "Item barcode cannot be empty".to_string(),
        });
    }

    if name.trim().is_empty() {
        return Err(Error::Config {
            message: "Item name cannot be empty".to_string(),
        });
    }

    if cost < 0.0 || !cost.is_finite() {
        return Err(Error::InvalidAmount { amount: cost });
    }

    let item = item::ActiveModel {
        barcode: Set(barcode.trim().to_string()),
        name: Set(name.trim().to_string()),
        cost: Set(cost),
        is_deleted: Set(false),
        ..Default::default()
    };

    item.insert(db).await.map_err(Into::into)
}

/// Soft deletes an item by marking it as deleted, preserving transaction history.
///
/// Deleted items stop matching in barcode lookups but keep their ledger rows.
pub async fn delete_item(db: &DatabaseConnection, item_id: i64) -> Result<item::Model> {
    let mut item: item::ActiveModel = Item::find_by_id(item_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::Config {
            message: format!("Item {item_id} not found"),
        })?
        .into();

    item.is_deleted = Set(true);
    item.update(db).await.map_err(Into::into)
}
