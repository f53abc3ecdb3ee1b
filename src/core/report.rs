//! Import reporting - The summary/detail split over processed imports.
//!
//! The create response deliberately carries only aggregate counters; the
//! per-row error detail lives here so callers can inspect failures after
//! the fact without bloating the immediate response.

use crate::{
    core::import,
    entities::{SalesImport, sales_import},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, prelude::*};

/// Aggregate view of one import, mirroring what the create response shows
/// plus the reversal flag.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct ImportSummary {
    /// Human-friendly import identifier
    pub import_number: String,
    /// Lifecycle status
    pub status: String,
    /// Original CSV file name
    pub file_name: String,
    /// Target warehouse
    pub warehouse_id: i64,
    /// Rows that parsed into line items
    pub total_records: i32,
    /// Rows posted to the ledger
    pub processed_records: i32,
    /// Rows that failed
    pub error_records: i32,
    /// Quantity over counted rows
    pub total_quantity: i32,
    /// Value over counted rows
    pub total_value: Option<f64>,
    /// Whether the import has been reversed
    pub is_reversed: bool,
}

/// One failed row, as shown in the error detail report.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct ImportRowError {
    /// 1-based CSV line number
    pub line_number: i32,
    /// Barcode from the POS row
    pub barcode: String,
    /// Recorded failure reason
    pub message: String,
}

/// Retrieves the aggregate summary for an import.
///
/// # Errors
/// Returns [`Error::ImportNotFound`] for an unknown import number.
pub async fn get_import_summary(
    db: &DatabaseConnection,
    import_number: &str,
) -> Result<ImportSummary> {
    let import = import::get_import_by_number(db, import_number)
        .await?
        .ok_or_else(|| Error::ImportNotFound {
            number: import_number.to_string(),
        })?;

    Ok(ImportSummary {
        import_number: import.import_number,
        status: import.status,
        file_name: import.file_name,
        warehouse_id: import.warehouse_id,
        total_records: import.total_records,
        processed_records: import.processed_records,
        error_records: import.error_records,
        total_quantity: import.total_quantity,
        total_value: import.total_value,
        is_reversed: import.is_reversed,
    })
}

/// Retrieves the per-row error detail for an import, in line order.
///
/// # Errors
/// Returns [`Error::ImportNotFound`] for an unknown import number.
pub async fn get_import_errors(
    db: &DatabaseConnection,
    import_number: &str,
) -> Result<Vec<ImportRowError>> {
    let import = import::get_import_by_number(db, import_number)
        .await?
        .ok_or_else(|| Error::ImportNotFound {
            number: import_number.to_string(),
        })?;

    let rows = import::get_import_items(db, import.id).await?;
    Ok(rows
        .into_iter()
        .filter(|row| row.has_error)
        .map(|row| ImportRowError {
            line_number: row.line_number,
            barcode: row.barcode,
            message: row.error_message.unwrap_or_default(),
        })
        .collect())
}

/// Lists all imports, newest first.
pub async fn list_imports(db: &DatabaseConnection) -> Result<Vec<sales_import::Model>> {
    SalesImport::find()
        .order_by_desc(sales_import::Column::CreatedAt)
        .all(db)
        .await
        .map_err(Into::into)
}
