//! Shared test utilities for stockflow.
//!
//! This module provides common helper functions for setting up test databases
//! and creating test entities with sensible defaults.

use crate::{
    core::{import, item, warehouse},
    entities,
    errors::Result,
};
use chrono::{DateTime, TimeZone, Utc};
use sea_orm::DatabaseConnection;
use tokio_util::sync::CancellationToken;

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// A fixed date inside the test sales period, for deterministic records.
pub fn test_date() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 11, 10, 0, 0, 0).unwrap()
}

/// Creates an active test warehouse with a name derived from its code.
pub async fn create_test_warehouse(
    db: &DatabaseConnection,
    code: &str,
) -> Result<entities::warehouse::Model> {
    warehouse::create_warehouse(db, code.to_string(), format!("{code} Warehouse"), true).await
}

/// Creates a test item with a name derived from its barcode.
pub async fn create_test_item(
    db: &DatabaseConnection,
    barcode: &str,
    cost: f64,
) -> Result<entities::item::Model> {
    item::create_item(db, barcode.to_string(), format!("Item {barcode}"), cost).await
}

/// Sets up a complete test environment with a warehouse.
/// Returns (db, warehouse) for common test scenarios.
pub async fn setup_with_warehouse() -> Result<(DatabaseConnection, entities::warehouse::Model)> {
    let db = setup_test_db().await?;
    let warehouse = create_test_warehouse(&db, "MAIN").await?;
    Ok((db, warehouse))
}

/// Builds a create-import request with sensible defaults around a CSV payload.
///
/// # Defaults
/// * `import_date` / period: the fixed [`test_date`]
/// * `file_name`: `"pos_sales.csv"`
/// * `notes`: None
/// * `auto_process`: true
pub fn test_import_request(
    warehouse_id: i64,
    import_number: &str,
    csv_data: &str,
) -> import::CreateSalesImportRequest {
    import::CreateSalesImportRequest {
        import_number: import_number.to_string(),
        import_date: test_date(),
        sales_period_from: test_date(),
        sales_period_to: test_date(),
        warehouse_id,
        file_name: "pos_sales.csv".to_string(),
        csv_data: csv_data.to_string(),
        notes: None,
        auto_process: true,
    }
}

/// Runs an auto-processed import end to end with a never-cancelled token.
pub async fn run_test_import(
    db: &DatabaseConnection,
    warehouse_id: i64,
    import_number: &str,
    csv_data: &str,
) -> Result<import::CreateSalesImportResponse> {
    let request = test_import_request(warehouse_id, import_number, csv_data);
    import::create_sales_import(db, request, "test_user", &CancellationToken::new()).await
}
