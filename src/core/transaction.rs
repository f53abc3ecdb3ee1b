//! Inventory transaction business logic - Creates immutable ledger entries.
//!
//! Every stock movement is recorded as one validated, append-only row.
//! Transactions are never updated or deleted; corrections are expressed as
//! offsetting entries (see import reversal).

use crate::{
    entities::{InventoryTransaction, inventory_transaction},
    errors::{Error, Result},
};
use chrono::{DateTime, Utc};
use sea_orm::{Set, prelude::*};

/// Inbound movement (receiving, reversal credits)
pub const TYPE_IN: &str = "IN";
/// Outbound movement (sales, shipments)
pub const TYPE_OUT: &str = "OUT";
/// Manual stock correction
pub const TYPE_ADJUSTMENT: &str = "ADJUSTMENT";
/// Movement between warehouses
pub const TYPE_TRANSFER: &str = "TRANSFER";

const ALLOWED_TYPES: &[&str] = &[TYPE_IN, TYPE_OUT, TYPE_ADJUSTMENT, TYPE_TRANSFER];

/// Reason code for transactions posted from POS sales imports
pub const REASON_POS_SALE: &str = "POS_SALE";
/// Reason code for offsetting entries created by an import reversal
pub const REASON_SALE_REVERSAL: &str = "SALE_REVERSAL";

/// All fields needed to post one inventory transaction.
#[derive(Debug, Clone)]
pub struct TransactionDraft {
    /// Unique human-friendly transaction number
    pub transaction_number: String,
    /// Item being moved
    pub item_id: i64,
    /// Warehouse the movement occurred at
    pub warehouse_id: i64,
    /// One of `TYPE_IN`, `TYPE_OUT`, `TYPE_ADJUSTMENT`, `TYPE_TRANSFER`
    pub transaction_type: String,
    /// Reason code for the movement
    pub reason: String,
    /// Quantity moved; always positive
    pub quantity: i32,
    /// Stock on hand read before the movement
    pub quantity_before: i32,
    /// Unit cost snapshot
    pub unit_cost: f64,
    /// Date the movement occurred
    pub transaction_date: DateTime<Utc>,
    /// Source document reference
    pub reference: Option<String>,
    /// Free-text details
    pub notes: Option<String>,
    /// User who performed the movement
    pub performed_by: Option<String>,
    /// Whether the transaction is pre-approved
    pub is_approved: bool,
}

/// Creates and persists a new inventory transaction from a validated draft.
///
/// `quantity_after` is derived from the direction: `quantity_before + quantity`
/// for `IN`, `quantity_before - quantity` otherwise. An `OUT` movement may
/// drive the implied after-quantity negative; that is recorded as-is.
///
/// # Errors
/// Returns an error if:
/// - The transaction number is empty or longer than 100 characters
/// - The transaction type is not one of the allowed values
/// - The reason is empty or longer than 200 characters
/// - The quantity is not positive
/// - The unit cost is negative or not finite
/// - The database insert operation fails (e.g., duplicate number)
pub async fn create_inventory_transaction(
    db: &DatabaseConnection,
    draft: TransactionDraft,
) -> Result<inventory_transaction::Model> {
    if draft.transaction_number.trim().is_empty() {
        return Err(Error::Config {
            message: "TransactionNumber is required".to_string(),
        });
    }
    if draft.transaction_number.len() > 100 {
        return Err(Error::Config {
            message: "TransactionNumber must not exceed 100 characters".to_string(),
        });
    }

    if !ALLOWED_TYPES.contains(&draft.transaction_type.as_str()) {
        return Err(Error::Config {
            message: format!("Invalid transaction type: {}", draft.transaction_type),
        });
    }

    if draft.reason.trim().is_empty() || draft.reason.len() > 200 {
        return Err(Error::Config {
            message: "Reason is required and must not exceed 200 characters".to_string(),
        });
    }

    if draft.quantity <= 0 {
        return Err(Error::InvalidQuantity {
            quantity: draft.quantity,
        });
    }

    if draft.quantity_before < 0 {
        return Err(Error::InvalidQuantity {
            quantity: draft.quantity_before,
        });
    }

    if draft.unit_cost < 0.0 || !draft.unit_cost.is_finite() {
        return Err(Error::InvalidAmount {
            amount: draft.unit_cost,
        });
    }

    let quantity_after = if draft.transaction_type == TYPE_IN {
        draft.quantity_before + draft.quantity
    } else {
        draft.quantity_before - draft.quantity
    };
    let total_cost = f64::from(draft.quantity) * draft.unit_cost;

    let transaction = inventory_transaction::ActiveModel {
        transaction_number: Set(draft.transaction_number),
        item_id: Set(draft.item_id),
        warehouse_id: Set(draft.warehouse_id),
        transaction_type: Set(draft.transaction_type),
        reason: Set(draft.reason),
        quantity: Set(draft.quantity),
        quantity_before: Set(draft.quantity_before),
        quantity_after: Set(quantity_after),
        unit_cost: Set(draft.unit_cost),
        total_cost: Set(total_cost),
        transaction_date: Set(draft.transaction_date),
        reference: Set(draft.reference),
        notes: Set(draft.notes),
        performed_by: Set(draft.performed_by),
        is_approved: Set(draft.is_approved),
        ..Default::default()
    };

    transaction.insert(db).await.map_err(Into::into)
}

/// Finds a transaction by its unique transaction number.
pub async fn get_transaction_by_number(
    db: &DatabaseConnection,
    transaction_number: &str,
) -> Result<Option<inventory_transaction::Model>> {
    InventoryTransaction::find()
        .filter(inventory_transaction::Column::TransactionNumber.eq(transaction_number))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Retrieves all transactions for an item at a warehouse, newest first.
pub async fn get_transactions_for_item(
    db: &DatabaseConnection,
    item_id: i64,
    warehouse_id: i64,
) -> Result<Vec<inventory_transaction::Model>> {
    use sea_orm::QueryOrder;

    InventoryTransaction::find()
        .filter(inventory_transaction::Column::ItemId.eq(item_id))
        .filter(inventory_transaction::Column::WarehouseId.eq(warehouse_id))
        .order_by_desc(inventory_transaction::Column::TransactionDate)
        .all(db)
        .await
        .map_err(Into::into)
}
