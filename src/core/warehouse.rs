//! Warehouse business logic - Handles all warehouse-related operations.
//!
//! Provides functions for creating, retrieving, and seeding warehouses.
//! All functions are async and return Result types for error handling.

use crate::{
    config::warehouses::WarehouseConfig,
    entities::{Warehouse, warehouse},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, prelude::*};
use tracing::info;

/// Retrieves all active warehouses, ordered alphabetically by code.
pub async fn get_active_warehouses(db: &DatabaseConnection) -> Result<Vec<warehouse::Model>> {
    Warehouse::find()
        .filter(warehouse::Column::IsActive.eq(true))
        .order_by_asc(warehouse::Column::Code)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Finds a warehouse by its unique ID.
pub async fn get_warehouse_by_id(
    db: &DatabaseConnection,
    warehouse_id: i64,
) -> Result<Option<warehouse::Model>> {
    Warehouse::find_by_id(warehouse_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Finds a warehouse by its user-facing code.
///
/// This function is used by the CLI, where warehouses are referenced by code
/// rather than by database ID.
pub async fn get_warehouse_by_code(
    db: &DatabaseConnection,
    code: &str,
) -> Result<Option<warehouse::Model>> {
    Warehouse::find()
        .filter(warehouse::Column::Code.eq(code))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Creates a new warehouse with the specified parameters, performing input validation.
///
/// # Errors
/// Returns an error if:
/// - The code or name is empty or whitespace-only
/// - The database insert operation fails (e.g., duplicate code)
pub async fn create_warehouse(
    db: &DatabaseConnection,
    code: String,
    name: String,
    is_active: bool,
) -> Result<warehouse::Model> {
    if code.trim().is_empty() {
        return Err(Error::Config {
            message: "Warehouse code cannot be empty".to_string(),
        });
    }
    if name.trim().is_empty() {
        return Err(Error::Config {
            message: "Warehouse name cannot be empty".to_string(),
        });
    }

    let warehouse = warehouse::ActiveModel {
        code: Set(code.trim().to_string()),
        name: Set(name.trim().to_string()),
        is_active: Set(is_active),
        ..Default::default()
    };

    warehouse.insert(db).await.map_err(Into::into)
}

/// Seeds warehouses from the configuration file, skipping codes that already exist.
///
/// Called on startup so a fresh database gets the configured warehouses
/// without clobbering anything on subsequent runs.
pub async fn seed_initial_warehouses(
    db: &DatabaseConnection,
    configs: &[WarehouseConfig],
) -> Result<()> {
    for config in configs {
        if get_warehouse_by_code(db, &config.code).await?.is_some() {
            continue;
        }
        create_warehouse(db, config.code.clone(), config.name.clone(), config.is_active).await?;
        info!("Seeded warehouse {} ({})", config.code, config.name);
    }
    Ok(())
}
