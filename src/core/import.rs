//! Sales import orchestration - The pipeline from CSV payload to posted
//! inventory transactions.
//!
//! An import moves through `PENDING -> PROCESSING -> COMPLETED | FAILED`.
//! Request-level preconditions (warehouse exists and is active, import number
//! unused, payload structurally valid) abort before anything is persisted.
//! Row-level failures never abort the batch: each row ends in a row outcome,
//! either processed (with the matched item and posted transaction) or failed
//! (with an error message recorded on the row), and the final statistics are
//! folded from those outcomes.

use crate::{
    core::{csv, item, stock, transaction},
    entities::{SalesImport, SalesImportItem, sales_import, sales_import_item},
    errors::{Error, Result},
};
use chrono::{DateTime, Utc};
use sea_orm::{QueryOrder, Set, prelude::*};
use std::collections::{HashMap, HashSet};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Import created, rows not yet processed
pub const STATUS_PENDING: &str = "PENDING";
/// Row processing underway
pub const STATUS_PROCESSING: &str = "PROCESSING";
/// At least one row processed successfully (partial success included)
pub const STATUS_COMPLETED: &str = "COMPLETED";
/// Processing finished with zero successful rows
pub const STATUS_FAILED: &str = "FAILED";

const ALLOWED_STATUSES: &[&str] = &[
    STATUS_PENDING,
    STATUS_PROCESSING,
    STATUS_COMPLETED,
    STATUS_FAILED,
];

/// Request to create (and optionally immediately process) a sales import.
#[derive(Debug, Clone)]
pub struct CreateSalesImportRequest {
    /// Unique human-friendly import identifier
    pub import_number: String,
    /// Date the import is being recorded
    pub import_date: DateTime<Utc>,
    /// Start of the covered sales period
    pub sales_period_from: DateTime<Utc>,
    /// End of the covered sales period (must be >= from)
    pub sales_period_to: DateTime<Utc>,
    /// Target warehouse
    pub warehouse_id: i64,
    /// Original CSV file name
    pub file_name: String,
    /// CSV payload, base64-encoded or raw text
    pub csv_data: String,
    /// Free-text notes
    pub notes: Option<String>,
    /// Process rows immediately after parsing (default behavior)
    pub auto_process: bool,
}

/// Summary returned to the caller; per-row error detail is retrieved
/// separately (see [`crate::core::report`]).
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct CreateSalesImportResponse {
    /// Database id of the import
    pub id: i64,
    /// Echo of the import number
    pub import_number: String,
    /// Final lifecycle status
    pub status: String,
    /// Rows that parsed into line items
    pub total_records: i32,
    /// Rows posted to the inventory ledger
    pub processed_records: i32,
    /// Rows that failed matching or posting
    pub error_records: i32,
}

/// Outcome of processing a single import row.
enum RowOutcome {
    Processed { item_id: i64, transaction_id: i64 },
    Failed { message: String },
}

/// Finds a sales import by its unique import number.
pub async fn get_import_by_number(
    db: &DatabaseConnection,
    import_number: &str,
) -> Result<Option<sales_import::Model>> {
    SalesImport::find()
        .filter(sales_import::Column::ImportNumber.eq(import_number))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Retrieves the rows of an import in line-number order.
pub async fn get_import_items(
    db: &DatabaseConnection,
    import_id: i64,
) -> Result<Vec<sales_import_item::Model>> {
    SalesImportItem::find()
        .filter(sales_import_item::Column::SalesImportId.eq(import_id))
        .order_by_asc(sales_import_item::Column::LineNumber)
        .all(db)
        .await
        .map_err(Into::into)
}

fn validate_request(request: &CreateSalesImportRequest) -> Result<()> {
    if request.import_number.trim().is_empty() {
        return Err(Error::Config {
            message: "ImportNumber is required".to_string(),
        });
    }
    if request.import_number.len() > 100 {
        return Err(Error::Config {
            message: "ImportNumber must not exceed 100 characters".to_string(),
        });
    }
    if request.file_name.trim().is_empty() {
        return Err(Error::Config {
            message: "FileName is required".to_string(),
        });
    }
    if request.file_name.len() > 255 {
        return Err(Error::Config {
            message: "FileName must not exceed 255 characters".to_string(),
        });
    }
    if request.sales_period_to < request.sales_period_from {
        return Err(Error::Config {
            message: "SalesPeriodTo must be greater than or equal to SalesPeriodFrom".to_string(),
        });
    }
    Ok(())
}

/// Builds a validated row from a parsed CSV record, or explains why the
/// record cannot become a line item.
fn build_import_item(
    import_id: i64,
    record: &csv::SaleRecord,
) -> std::result::Result<sales_import_item::ActiveModel, String> {
    if record.quantity_sold <= 0 {
        return Err(format!(
            "QuantitySold must be greater than zero (got {})",
            record.quantity_sold
        ));
    }
    if record.barcode.len() > 100 {
        return Err("Barcode must not exceed 100 characters".to_string());
    }
    if let Some(name) = &record.item_name {
        if name.len() > 255 {
            return Err("ItemName must not exceed 255 characters".to_string());
        }
    }
    if let Some(price) = record.unit_price {
        if price < 0.0 || !price.is_finite() {
            return Err(format!("UnitPrice must be zero or greater (got {price})"));
        }
    }

    let total_amount = record
        .unit_price
        .map(|price| price * f64::from(record.quantity_sold));

    Ok(sales_import_item::ActiveModel {
        sales_import_id: Set(import_id),
        line_number: Set(record.line_number),
        sale_date: Set(record.sale_date),
        barcode: Set(record.barcode.clone()),
        item_name: Set(record.item_name.clone()),
        quantity_sold: Set(record.quantity_sold),
        unit_price: Set(record.unit_price),
        total_amount: Set(total_amount),
        item_id: Set(None),
        inventory_transaction_id: Set(None),
        is_processed: Set(false),
        has_error: Set(false),
        error_message: Set(None),
        ..Default::default()
    })
}

/// Updates the aggregate statistics on an import.
///
/// # Errors
/// Returns an error if any counter is negative.
pub async fn update_statistics(
    db: &DatabaseConnection,
    import: sales_import::Model,
    total_records: i32,
    processed_records: i32,
    error_records: i32,
    total_quantity: i32,
    total_value: Option<f64>,
) -> Result<sales_import::Model> {
    if total_records < 0 || processed_records < 0 || error_records < 0 || total_quantity < 0 {
        return Err(Error::Config {
            message: "Statistics counters must be zero or greater".to_string(),
        });
    }
    if total_value.is_some_and(|value| value < 0.0) {
        return Err(Error::Config {
            message: "TotalValue must be zero or greater".to_string(),
        });
    }

    let mut active: sales_import::ActiveModel = import.into();
    active.total_records = Set(total_records);
    active.processed_records = Set(processed_records);
    active.error_records = Set(error_records);
    active.total_quantity = Set(total_quantity);
    active.total_value = Set(total_value);
    active.update(db).await.map_err(Into::into)
}

/// Transitions an import to a new lifecycle status.
///
/// No transition graph is enforced beyond membership in the allowed set;
/// callers choose the next status at each phase.
pub async fn update_status(
    db: &DatabaseConnection,
    import: sales_import::Model,
    status: &str,
) -> Result<sales_import::Model> {
    let status = status.to_uppercase();
    if !ALLOWED_STATUSES.contains(&status.as_str()) {
        return Err(Error::Config {
            message: format!("Invalid status: {status}"),
        });
    }

    let mut active: sales_import::ActiveModel = import.into();
    active.status = Set(status);
    active.update(db).await.map_err(Into::into)
}

/// Records a successful outcome on a row: the matched item, the posted
/// transaction, and the processed flag. Called at most once per row.
async fn mark_item_processed(
    db: &DatabaseConnection,
    row: sales_import_item::Model,
    item_id: i64,
    transaction_id: i64,
) -> Result<sales_import_item::Model> {
    let mut active: sales_import_item::ActiveModel = row.into();
    active.item_id = Set(Some(item_id));
    active.inventory_transaction_id = Set(Some(transaction_id));
    active.is_processed = Set(true);
    active.has_error = Set(false);
    active.error_message = Set(None);
    active.update(db).await.map_err(Into::into)
}

/// Records a terminal per-row failure reason. Mutually exclusive with
/// [`mark_item_processed`] for the same row.
async fn mark_item_error(
    db: &DatabaseConnection,
    row: sales_import_item::Model,
    message: &str,
) -> Result<sales_import_item::Model> {
    let message: String = message.chars().take(1000).collect();
    let mut active: sales_import_item::ActiveModel = row.into();
    active.is_processed = Set(false);
    active.has_error = Set(true);
    active.error_message = Set(Some(message));
    active.update(db).await.map_err(Into::into)
}

/// Creates a sales import from a POS CSV payload and, unless deferred,
/// immediately matches and posts its rows.
///
/// The `processed_by` identity and the cancellation token are explicit
/// parameters; there is no ambient user or cancellation context.
///
/// # Errors
/// Fatal, request-level failures only:
/// - [`Error::WarehouseNotFound`] when the target warehouse does not exist
/// - [`Error::Config`] when the warehouse is inactive or a request field is invalid
/// - [`Error::DuplicateImport`] when the import number was already used
/// - [`Error::InvalidCsv`] when the payload is structurally unparseable
/// - [`Error::Database`] when persistence itself fails
pub async fn create_sales_import(
    db: &DatabaseConnection,
    request: CreateSalesImportRequest,
    processed_by: &str,
    cancel: &CancellationToken,
) -> Result<CreateSalesImportResponse> {
    info!(
        "Creating sales import {} for warehouse {}",
        request.import_number, request.warehouse_id
    );

    validate_request(&request)?;

    // Validate warehouse exists and accepts imports
    let warehouse = crate::core::warehouse::get_warehouse_by_id(db, request.warehouse_id)
        .await?
        .ok_or_else(|| Error::WarehouseNotFound {
            warehouse: request.warehouse_id.to_string(),
        })?;
    if !warehouse.is_active {
        return Err(Error::Config {
            message: format!("Warehouse {} is not active", warehouse.code),
        });
    }

    // Check for duplicate import before any row is parsed
    if get_import_by_number(db, &request.import_number).await?.is_some() {
        return Err(Error::DuplicateImport {
            number: request.import_number,
        });
    }

    // Structurally invalid payloads abort here, before persistence
    let records = csv::decode_sales_csv(&request.csv_data)?;

    let import = sales_import::ActiveModel {
        import_number: Set(request.import_number.clone()),
        import_date: Set(request.import_date),
        sales_period_from: Set(request.sales_period_from),
        sales_period_to: Set(request.sales_period_to),
        warehouse_id: Set(request.warehouse_id),
        file_name: Set(request.file_name.clone()),
        notes: Set(request.notes.clone()),
        status: Set(STATUS_PENDING.to_string()),
        total_records: Set(0),
        processed_records: Set(0),
        error_records: Set(0),
        total_quantity: Set(0),
        total_value: Set(None),
        processed_by: Set(Some(processed_by.to_string())),
        error_message: Set(None),
        is_reversed: Set(false),
        reversed_date: Set(None),
        reversed_by: Set(None),
        reversal_reason: Set(None),
        created_at: Set(Utc::now()),
        ..Default::default()
    };
    let import = import.insert(db).await?;

    // Rows that fail construction are dropped before joining the batch;
    // their line numbers stay consumed.
    let mut items = Vec::with_capacity(records.len());
    for record in &records {
        match build_import_item(import.id, record) {
            Ok(active) => items.push(active.insert(db).await?),
            Err(reason) => {
                warn!(
                    "Error creating import item at line {}: {reason}",
                    record.line_number
                );
            }
        }
    }

    // Statistics from parse results only; processing refines them later
    let total_quantity: i32 = items.iter().map(|i| i.quantity_sold).sum();
    let total_value: f64 = items.iter().filter_map(|i| i.total_amount).sum();
    let total_records = i32::try_from(items.len()).unwrap_or(i32::MAX);
    let mut import = update_statistics(
        db,
        import,
        total_records,
        0,
        0,
        total_quantity,
        Some(total_value),
    )
    .await?;

    info!(
        "Sales import {} created with {} records",
        import.import_number, total_records
    );

    if request.auto_process {
        import = process_import(db, import, items, cancel).await?;
    }

    Ok(CreateSalesImportResponse {
        id: import.id,
        import_number: import.import_number,
        status: import.status,
        total_records: import.total_records,
        processed_records: import.processed_records,
        error_records: import.error_records,
    })
}

/// Runs matching and posting for an import left in `PENDING` by a deferred
/// create request.
///
/// # Errors
/// Returns [`Error::ImportNotFound`] for an unknown import number and
/// [`Error::Config`] when the import is not pending.
pub async fn process_pending_import(
    db: &DatabaseConnection,
    import_number: &str,
    cancel: &CancellationToken,
) -> Result<CreateSalesImportResponse> {
    let import = get_import_by_number(db, import_number)
        .await?
        .ok_or_else(|| Error::ImportNotFound {
            number: import_number.to_string(),
        })?;

    if import.status != STATUS_PENDING {
        return Err(Error::Config {
            message: format!(
                "Import {} is not pending (status: {})",
                import.import_number, import.status
            ),
        });
    }

    let items = get_import_items(db, import.id).await?;
    let import = process_import(db, import, items, cancel).await?;

    Ok(CreateSalesImportResponse {
        id: import.id,
        import_number: import.import_number,
        status: import.status,
        total_records: import.total_records,
        processed_records: import.processed_records,
        error_records: import.error_records,
    })
}

/// Matches rows to catalog items and posts inventory transactions,
/// finalizing the import's statistics and terminal status.
async fn process_import(
    db: &DatabaseConnection,
    import: sales_import::Model,
    items: Vec<sales_import_item::Model>,
    cancel: &CancellationToken,
) -> Result<sales_import::Model> {
    info!("Processing sales import {}", import.import_number);

    let import = update_status(db, import, STATUS_PROCESSING).await?;

    // One bulk catalog query for every distinct barcode in the batch
    let barcodes: Vec<String> = items
        .iter()
        .map(|row| row.barcode.to_lowercase())
        .collect::<HashSet<_>>()
        .into_iter()
        .collect();
    let item_lookup = item::find_items_by_barcodes(db, &barcodes).await?;

    let mut processed_count: i32 = 0;
    let mut error_count: i32 = 0;
    let mut processed_quantity: i32 = 0;
    let mut processed_value: f64 = 0.0;

    for row in items {
        // Cooperative cancellation: abandon remaining rows, keep what was
        // already posted, finalize from the tally so far.
        if cancel.is_cancelled() {
            warn!(
                "Processing of import {} cancelled at line {}; remaining rows left unprocessed",
                import.import_number, row.line_number
            );
            break;
        }

        let outcome = match process_row(db, &import, &row, &item_lookup).await {
            Ok(outcome) => outcome,
            Err(e) => {
                error!(
                    "Error processing import item at line {}: {e}",
                    row.line_number
                );
                RowOutcome::Failed {
                    message: format!("Processing error: {e}"),
                }
            }
        };

        match outcome {
            RowOutcome::Processed {
                item_id,
                transaction_id,
            } => {
                processed_quantity += row.quantity_sold;
                processed_value += row.total_amount.unwrap_or(0.0);
                mark_item_processed(db, row, item_id, transaction_id).await?;
                processed_count += 1;
            }
            RowOutcome::Failed { message } => {
                mark_item_error(db, row, &message).await?;
                error_count += 1;
            }
        }
    }

    // Statistics now reflect final row outcomes; totals over processed rows only
    let total_records = import.total_records;
    let import = update_statistics(
        db,
        import,
        total_records,
        processed_count,
        error_count,
        processed_quantity,
        Some(processed_value),
    )
    .await?;

    let final_status = if processed_count == 0 {
        STATUS_FAILED
    } else {
        // Partial success still completes; the counters expose the errors
        STATUS_COMPLETED
    };
    let import = update_status(db, import, final_status).await?;

    info!(
        "Sales import {} processed: {} successful, {} errors",
        import.import_number, processed_count, error_count
    );

    Ok(import)
}

/// Processes one row: barcode match, stock check, transaction posting.
///
/// Returns a [`RowOutcome`] for business-level failures (unmatched barcode);
/// infrastructure errors bubble up as `Err` and are converted to a failed
/// outcome by the caller.
async fn process_row(
    db: &DatabaseConnection,
    import: &sales_import::Model,
    row: &sales_import_item::Model,
    item_lookup: &HashMap<String, crate::entities::item::Model>,
) -> Result<RowOutcome> {
    let Some(matched) = item_lookup.get(&row.barcode.to_lowercase()) else {
        return Ok(RowOutcome::Failed {
            message: format!(
                "Item with barcode {} not found in inventory",
                row.barcode
            ),
        });
    };

    // Stock check is a warning only; POS sales are historical fact and are
    // posted even when they reveal a discrepancy.
    let stock_level = stock::get_stock_level(db, matched.id, import.warehouse_id).await?;
    let quantity_before = stock_level.map_or(0, |level| level.quantity_on_hand);
    if quantity_before < row.quantity_sold {
        warn!(
            "Insufficient stock for item {} ({}). Required: {}, Available: {}",
            matched.id, matched.barcode, row.quantity_sold, quantity_before
        );
    }

    let transaction_number = format!("SALE-{}-{}", import.import_number, row.line_number);
    let posted = transaction::create_inventory_transaction(
        db,
        transaction::TransactionDraft {
            transaction_number,
            item_id: matched.id,
            warehouse_id: import.warehouse_id,
            transaction_type: transaction::TYPE_OUT.to_string(),
            reason: transaction::REASON_POS_SALE.to_string(),
            quantity: row.quantity_sold,
            quantity_before,
            unit_cost: matched.cost,
            transaction_date: row.sale_date,
            reference: Some(format!(
                "POS Sale - Import: {}, Line: {}",
                import.import_number, row.line_number
            )),
            notes: Some(format!(
                "Barcode: {}, Item: {}",
                row.barcode,
                row.item_name.as_deref().unwrap_or("unknown")
            )),
            performed_by: import.processed_by.clone(),
            is_approved: true,
        },
    )
    .await?;

    debug!(
        "Processed sale: Item {}, Quantity {}, Transaction {}",
        matched.id, row.quantity_sold, posted.id
    );

    Ok(RowOutcome::Processed {
        item_id: matched.id,
        transaction_id: posted.id,
    })
}

/// Reverses a completed import by posting one offsetting `IN` transaction
/// per processed row, then marking the import reversed.
///
/// Row outcomes and statistics are left untouched; the reversal is a new
/// set of ledger entries, not an edit of history.
///
/// # Errors
/// Returns [`Error::ImportNotFound`] for an unknown import number,
/// [`Error::ImportNotReversible`] when the import is not completed or was
/// already reversed, and [`Error::Config`] for a missing/oversized reason.
pub async fn reverse_import(
    db: &DatabaseConnection,
    import_number: &str,
    reason: &str,
    reversed_by: &str,
) -> Result<sales_import::Model> {
    let import = get_import_by_number(db, import_number)
        .await?
        .ok_or_else(|| Error::ImportNotFound {
            number: import_number.to_string(),
        })?;

    if import.is_reversed {
        return Err(Error::ImportNotReversible {
            message: format!("Import {} has already been reversed", import.import_number),
        });
    }
    if import.status != STATUS_COMPLETED {
        return Err(Error::ImportNotReversible {
            message: format!(
                "Only completed imports can be reversed (status: {})",
                import.status
            ),
        });
    }
    if reason.trim().is_empty() {
        return Err(Error::Config {
            message: "Reversal reason is required".to_string(),
        });
    }
    if reason.len() > 500 {
        return Err(Error::Config {
            message: "Reversal reason must not exceed 500 characters".to_string(),
        });
    }

    info!("Reversing sales import {}", import.import_number);

    let rows = get_import_items(db, import.id).await?;
    for row in rows.into_iter().filter(|row| row.is_processed) {
        let Some(item_id) = row.item_id else {
            continue;
        };
        let matched = item::get_item_by_id(db, item_id).await?;
        let unit_cost = matched.map_or(0.0, |item| item.cost);

        let stock_level = stock::get_stock_level(db, item_id, import.warehouse_id).await?;
        let quantity_before = stock_level.map_or(0, |level| level.quantity_on_hand);

        transaction::create_inventory_transaction(
            db,
            transaction::TransactionDraft {
                transaction_number: format!(
                    "RSALE-{}-{}",
                    import.import_number, row.line_number
                ),
                item_id,
                warehouse_id: import.warehouse_id,
                transaction_type: transaction::TYPE_IN.to_string(),
                reason: transaction::REASON_SALE_REVERSAL.to_string(),
                quantity: row.quantity_sold,
                quantity_before,
                unit_cost,
                transaction_date: Utc::now(),
                reference: Some(format!(
                    "Reversal - Import: {}, Line: {}",
                    import.import_number, row.line_number
                )),
                notes: Some(format!("Barcode: {}", row.barcode)),
                performed_by: Some(reversed_by.to_string()),
                is_approved: true,
            },
        )
        .await?;
    }

    let mut active: sales_import::ActiveModel = import.into();
    active.is_reversed = Set(true);
    active.reversed_date = Set(Some(Utc::now()));
    active.reversed_by = Set(Some(reversed_by.to_string()));
    active.reversal_reason = Set(Some(reason.to_string()));
    let reversed = active.update(db).await?;

    info!("Sales import {} reversed", reversed.import_number);
    Ok(reversed)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::core::{stock, transaction};
    use crate::test_utils::*;

    #[tokio::test]
    async fn test_request_validation() -> Result<()> {
        let (db, warehouse) = setup_with_warehouse().await?;
        let cancel = CancellationToken::new();

        let mut request = test_import_request(warehouse.id, "", "Date,Barcode,Quantity\n");
        let result = create_sales_import(&db, request.clone(), "user", &cancel).await;
        assert!(matches!(result.unwrap_err(), Error::Config { message: _ }));

        request.import_number = "IMP-001".to_string();
        request.sales_period_to = test_date() - chrono::Duration::days(1);
        let result = create_sales_import(&db, request, "user", &cancel).await;
        assert!(matches!(result.unwrap_err(), Error::Config { message: _ }));

        Ok(())
    }

    #[tokio::test]
    async fn test_missing_warehouse_fails_before_persistence() -> Result<()> {
        let db = setup_test_db().await?;
        let cancel = CancellationToken::new();

        let request = test_import_request(999, "IMP-001", "Date,Barcode,Quantity\n");
        let result = create_sales_import(&db, request, "user", &cancel).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::WarehouseNotFound { .. }
        ));

        // Nothing was persisted
        assert!(SalesImport::find().all(&db).await?.is_empty());
        assert!(SalesImportItem::find().all(&db).await?.is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn test_inactive_warehouse_is_rejected() -> Result<()> {
        let db = setup_test_db().await?;
        let closed = crate::core::warehouse::create_warehouse(
            &db,
            "OLD".to_string(),
            "Closed Store".to_string(),
            false,
        )
        .await?;

        let request = test_import_request(closed.id, "IMP-001", "Date,Barcode,Quantity\n");
        let result =
            create_sales_import(&db, request, "user", &CancellationToken::new()).await;
        assert!(matches!(result.unwrap_err(), Error::Config { message: _ }));

        Ok(())
    }

    #[tokio::test]
    async fn test_duplicate_import_number_conflicts() -> Result<()> {
        let (db, warehouse) = setup_with_warehouse().await?;
        create_test_item(&db, "ABC123", 4.5).await?;

        let csv = "Date,Barcode,Quantity\n2025-11-10,ABC123,1\n";
        run_test_import(&db, warehouse.id, "IMP-001", csv).await?;

        let result = run_test_import(&db, warehouse.id, "IMP-001", csv).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::DuplicateImport { number } if number == "IMP-001"
        ));

        // Only the first import's rows exist
        assert_eq!(SalesImportItem::find().all(&db).await?.len(), 1);

        Ok(())
    }

    #[tokio::test]
    async fn test_invalid_csv_aborts_whole_import() -> Result<()> {
        let (db, warehouse) = setup_with_warehouse().await?;

        // Missing the required barcode column
        let request =
            test_import_request(warehouse.id, "IMP-001", "Date,ItemName,Quantity\n");
        let result =
            create_sales_import(&db, request, "user", &CancellationToken::new()).await;
        assert!(matches!(result.unwrap_err(), Error::InvalidCsv { .. }));
        assert!(SalesImport::find().all(&db).await?.is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn test_example_scenario_partial_success() -> Result<()> {
        let (db, warehouse) = setup_with_warehouse().await?;
        let coffee = create_test_item(&db, "ABC123", 4.5).await?;
        let tea = create_test_item(&db, "XYZ789", 3.0).await?;
        stock::set_stock_level(&db, coffee.id, warehouse.id, 10).await?;
        stock::set_stock_level(&db, tea.id, warehouse.id, 1).await?;

        // Row 1 valid+matched, row 2 barcode unknown, row 3 matched but short on stock
        let csv = "Date,Barcode,Quantity,Price\n\
                   2025-11-10,ABC123,2,4.50\n\
                   2025-11-10,UNKNOWN,1,2.00\n\
                   2025-11-10,XYZ789,5,3.00\n";
        let response = run_test_import(&db, warehouse.id, "IMP-001", csv).await?;

        assert_eq!(response.total_records, 3);
        assert_eq!(response.processed_records, 2);
        assert_eq!(response.error_records, 1);
        assert_eq!(response.status, STATUS_COMPLETED);
        assert_eq!(
            response.processed_records + response.error_records,
            response.total_records
        );

        // Two transactions were created, one per matched row
        let sale_1 = transaction::get_transaction_by_number(&db, "SALE-IMP-001-1")
            .await?
            .unwrap();
        assert_eq!(sale_1.quantity, 2);
        assert_eq!(sale_1.quantity_before, 10);
        assert_eq!(sale_1.quantity_after, 8);
        assert_eq!(sale_1.transaction_type, transaction::TYPE_OUT);
        assert_eq!(sale_1.reason, transaction::REASON_POS_SALE);
        assert!(sale_1.is_approved);

        // Insufficient stock is non-blocking; the implied after goes negative
        let sale_3 = transaction::get_transaction_by_number(&db, "SALE-IMP-001-3")
            .await?
            .unwrap();
        assert_eq!(sale_3.quantity_before, 1);
        assert_eq!(sale_3.quantity_after, -4);

        // The unknown barcode produced no transaction and an error row
        assert!(
            transaction::get_transaction_by_number(&db, "SALE-IMP-001-2")
                .await?
                .is_none()
        );
        let import = get_import_by_number(&db, "IMP-001").await?.unwrap();
        let rows = get_import_items(&db, import.id).await?;
        assert_eq!(rows.len(), 3);
        assert!(rows[0].is_processed && !rows[0].has_error);
        assert!(!rows[1].is_processed && rows[1].has_error);
        assert!(rows[1].error_message.as_deref().unwrap().contains("UNKNOWN"));
        assert_eq!(rows[1].inventory_transaction_id, None);
        assert!(rows[2].is_processed);

        Ok(())
    }

    #[tokio::test]
    async fn test_all_rows_failing_marks_import_failed() -> Result<()> {
        let (db, warehouse) = setup_with_warehouse().await?;

        let csv = "Date,Barcode,Quantity\n\
                   2025-11-10,NOPE-1,1\n\
                   2025-11-10,NOPE-2,2\n";
        let response = run_test_import(&db, warehouse.id, "IMP-001", csv).await?;

        assert_eq!(response.status, STATUS_FAILED);
        assert_eq!(response.total_records, 2);
        assert_eq!(response.processed_records, 0);
        assert_eq!(response.error_records, 2);

        Ok(())
    }

    #[tokio::test]
    async fn test_statistics_reflect_processed_rows_only() -> Result<()> {
        let (db, warehouse) = setup_with_warehouse().await?;
        create_test_item(&db, "ABC123", 4.5).await?;

        let csv = "Date,Barcode,Quantity,Price\n\
                   2025-11-10,ABC123,2,4.50\n\
                   2025-11-10,UNKNOWN,3,1.00\n";
        run_test_import(&db, warehouse.id, "IMP-001", csv).await?;

        let import = get_import_by_number(&db, "IMP-001").await?.unwrap();
        assert_eq!(import.total_quantity, 2);
        assert_eq!(import.total_value, Some(9.0));

        Ok(())
    }

    #[tokio::test]
    async fn test_row_construction_failures_are_dropped_but_keep_line_numbers() -> Result<()> {
        let (db, warehouse) = setup_with_warehouse().await?;
        create_test_item(&db, "ABC123", 4.5).await?;
        create_test_item(&db, "DEF456", 1.0).await?;

        // Line 2 has a non-positive quantity and is dropped at construction
        let csv = "Date,Barcode,Quantity\n\
                   2025-11-10,ABC123,2\n\
                   2025-11-10,DEF456,0\n\
                   2025-11-10,DEF456,3\n";
        let response = run_test_import(&db, warehouse.id, "IMP-001", csv).await?;

        assert_eq!(response.total_records, 2);
        assert_eq!(response.processed_records, 2);
        assert_eq!(response.error_records, 0);

        // The surviving third row kept its original line ordinal
        assert!(
            transaction::get_transaction_by_number(&db, "SALE-IMP-001-3")
                .await?
                .is_some()
        );
        assert!(
            transaction::get_transaction_by_number(&db, "SALE-IMP-001-2")
                .await?
                .is_none()
        );

        Ok(())
    }

    #[tokio::test]
    async fn test_no_stock_record_snapshots_zero_before() -> Result<()> {
        let (db, warehouse) = setup_with_warehouse().await?;
        create_test_item(&db, "ABC123", 4.5).await?;

        let csv = "Date,Barcode,Quantity\n2025-11-10,ABC123,2\n";
        run_test_import(&db, warehouse.id, "IMP-001", csv).await?;

        let sale = transaction::get_transaction_by_number(&db, "SALE-IMP-001-1")
            .await?
            .unwrap();
        assert_eq!(sale.quantity_before, 0);
        assert_eq!(sale.quantity_after, -2);

        Ok(())
    }

    #[tokio::test]
    async fn test_barcode_matching_is_case_insensitive() -> Result<()> {
        let (db, warehouse) = setup_with_warehouse().await?;
        create_test_item(&db, "AbC123", 4.5).await?;

        let csv = "Date,Barcode,Quantity\n2025-11-10,aBc123,1\n";
        let response = run_test_import(&db, warehouse.id, "IMP-001", csv).await?;

        assert_eq!(response.processed_records, 1);
        assert_eq!(response.status, STATUS_COMPLETED);

        Ok(())
    }

    #[tokio::test]
    async fn test_deferred_import_stays_pending_then_processes() -> Result<()> {
        let (db, warehouse) = setup_with_warehouse().await?;
        create_test_item(&db, "ABC123", 4.5).await?;
        let cancel = CancellationToken::new();

        let csv = "Date,Barcode,Quantity\n2025-11-10,ABC123,2\n";
        let mut request = test_import_request(warehouse.id, "IMP-001", csv);
        request.auto_process = false;

        let response = create_sales_import(&db, request, "user", &cancel).await?;
        assert_eq!(response.status, STATUS_PENDING);
        assert_eq!(response.total_records, 1);
        assert_eq!(response.processed_records, 0);

        // No transactions until the pending import is processed
        assert!(
            transaction::get_transaction_by_number(&db, "SALE-IMP-001-1")
                .await?
                .is_none()
        );

        let processed = process_pending_import(&db, "IMP-001", &cancel).await?;
        assert_eq!(processed.status, STATUS_COMPLETED);
        assert_eq!(processed.processed_records, 1);
        assert!(
            transaction::get_transaction_by_number(&db, "SALE-IMP-001-1")
                .await?
                .is_some()
        );

        Ok(())
    }

    #[tokio::test]
    async fn test_process_pending_rejects_wrong_state() -> Result<()> {
        let (db, warehouse) = setup_with_warehouse().await?;
        create_test_item(&db, "ABC123", 4.5).await?;
        let cancel = CancellationToken::new();

        let result = process_pending_import(&db, "NOPE", &cancel).await;
        assert!(matches!(result.unwrap_err(), Error::ImportNotFound { .. }));

        let csv = "Date,Barcode,Quantity\n2025-11-10,ABC123,1\n";
        run_test_import(&db, warehouse.id, "IMP-001", csv).await?;

        // Already completed, not pending
        let result = process_pending_import(&db, "IMP-001", &cancel).await;
        assert!(matches!(result.unwrap_err(), Error::Config { message: _ }));

        Ok(())
    }

    #[tokio::test]
    async fn test_cancellation_abandons_remaining_rows() -> Result<()> {
        let (db, warehouse) = setup_with_warehouse().await?;
        create_test_item(&db, "ABC123", 4.5).await?;

        let csv = "Date,Barcode,Quantity\n\
                   2025-11-10,ABC123,1\n\
                   2025-11-10,ABC123-b,1\n";
        let mut request = test_import_request(warehouse.id, "IMP-001", csv);
        request.auto_process = false;
        let cancel = CancellationToken::new();
        create_sales_import(&db, request, "user", &cancel).await?;

        cancel.cancel();
        let response = process_pending_import(&db, "IMP-001", &cancel).await?;

        // No rows were reached; the tally-so-far finalizes the import
        assert_eq!(response.processed_records, 0);
        assert_eq!(response.status, STATUS_FAILED);

        let import = get_import_by_number(&db, "IMP-001").await?.unwrap();
        let rows = get_import_items(&db, import.id).await?;
        assert!(rows.iter().all(|row| !row.is_processed && !row.has_error));
        assert!(
            transaction::get_transaction_by_number(&db, "SALE-IMP-001-1")
                .await?
                .is_none()
        );

        Ok(())
    }

    #[tokio::test]
    async fn test_reverse_completed_import() -> Result<()> {
        let (db, warehouse) = setup_with_warehouse().await?;
        let coffee = create_test_item(&db, "ABC123", 4.5).await?;
        stock::set_stock_level(&db, coffee.id, warehouse.id, 10).await?;

        let csv = "Date,Barcode,Quantity\n\
                   2025-11-10,ABC123,2\n\
                   2025-11-10,UNKNOWN,1\n";
        run_test_import(&db, warehouse.id, "IMP-001", csv).await?;

        let reversed = reverse_import(&db, "IMP-001", "bad upload", "auditor").await?;
        assert!(reversed.is_reversed);
        assert_eq!(reversed.reversed_by.as_deref(), Some("auditor"));
        assert_eq!(reversed.reversal_reason.as_deref(), Some("bad upload"));
        // Statistics are untouched by a reversal
        assert_eq!(reversed.processed_records, 1);

        // One offsetting IN entry per processed row; the errored row gets none
        let offset = transaction::get_transaction_by_number(&db, "RSALE-IMP-001-1")
            .await?
            .unwrap();
        assert_eq!(offset.transaction_type, transaction::TYPE_IN);
        assert_eq!(offset.reason, transaction::REASON_SALE_REVERSAL);
        assert_eq!(offset.quantity, 2);
        assert!(
            transaction::get_transaction_by_number(&db, "RSALE-IMP-001-2")
                .await?
                .is_none()
        );

        // A second reversal is refused
        let result = reverse_import(&db, "IMP-001", "again", "auditor").await;
        assert!(matches!(
            result.unwrap_err(),
            Error::ImportNotReversible { .. }
        ));

        Ok(())
    }

    #[tokio::test]
    async fn test_reverse_requires_completed_status() -> Result<()> {
        let (db, warehouse) = setup_with_warehouse().await?;
        create_test_item(&db, "ABC123", 4.5).await?;

        let csv = "Date,Barcode,Quantity\n2025-11-10,ABC123,1\n";
        let mut request = test_import_request(warehouse.id, "IMP-001", csv);
        request.auto_process = false;
        create_sales_import(&db, request, "user", &CancellationToken::new()).await?;

        let result = reverse_import(&db, "IMP-001", "nope", "auditor").await;
        assert!(matches!(
            result.unwrap_err(),
            Error::ImportNotReversible { .. }
        ));

        let result = reverse_import(&db, "MISSING", "nope", "auditor").await;
        assert!(matches!(result.unwrap_err(), Error::ImportNotFound { .. }));

        Ok(())
    }

    #[tokio::test]
    async fn test_reverse_requires_reason() -> Result<()> {
        let (db, warehouse) = setup_with_warehouse().await?;
        create_test_item(&db, "ABC123", 4.5).await?;

        let csv = "Date,Barcode,Quantity\n2025-11-10,ABC123,1\n";
        run_test_import(&db, warehouse.id, "IMP-001", csv).await?;

        let result = reverse_import(&db, "IMP-001", "   ", "auditor").await;
        assert!(matches!(result.unwrap_err(), Error::Config { message: _ }));

        let long_reason = "x".repeat(501);
        let result = reverse_import(&db, "IMP-001", &long_reason, "auditor").await;
        assert!(matches!(result.unwrap_err(), Error::Config { message: _ }));

        Ok(())
    }

    #[tokio::test]
    async fn test_update_status_rejects_unknown_status() -> Result<()> {
        let (db, warehouse) = setup_with_warehouse().await?;

        let csv = "Date,Barcode,Quantity\n";
        let mut request = test_import_request(warehouse.id, "IMP-001", csv);
        request.auto_process = false;
        create_sales_import(&db, request, "user", &CancellationToken::new()).await?;

        let import = get_import_by_number(&db, "IMP-001").await?.unwrap();
        let result = update_status(&db, import, "CANCELLED").await;
        assert!(matches!(result.unwrap_err(), Error::Config { message: _ }));

        Ok(())
    }

    #[tokio::test]
    async fn test_update_statistics_rejects_negative_counters() -> Result<()> {
        let (db, warehouse) = setup_with_warehouse().await?;

        let mut request = test_import_request(warehouse.id, "IMP-001", "Date,Barcode,Quantity\n");
        request.auto_process = false;
        create_sales_import(&db, request, "user", &CancellationToken::new()).await?;

        let import = get_import_by_number(&db, "IMP-001").await?.unwrap();
        let result = update_statistics(&db, import, -1, 0, 0, 0, None).await;
        assert!(matches!(result.unwrap_err(), Error::Config { message: _ }));

        Ok(())
    }
}
