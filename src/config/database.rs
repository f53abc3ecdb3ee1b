//! Database configuration module for stockflow.
//!
//! This module handles `SQLite` database connection and table creation using `SeaORM`.
//! It provides functions for establishing database connections and creating all necessary tables
//! based on the entity definitions. The module uses `SeaORM`'s `Schema::create_table_from_entity`
//! method to automatically generate SQL statements from the entity models, ensuring that the
//! database schema matches the Rust struct definitions without requiring manual SQL.

use crate::entities::{
    InventoryTransaction, Item, SalesImport, SalesImportItem, StockLevel, Warehouse,
};
use crate::errors::Result;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Schema};

/// Gets the database URL from environment variable or returns default `SQLite` path.
///
/// This function looks for `DATABASE_URL` in the environment and falls back to
/// a default local `SQLite` file if not found.
pub fn get_database_url() -> String {
    std::env::var("DATABASE_URL")
        .unwrap_or_else(|_| "sqlite://data/stockflow.sqlite?mode=rwc".to_string())
}

/// Establishes a connection to the `SQLite` database using the `DATABASE_URL` environment variable.
///
/// Falls back to a default local `SQLite` file if no environment variable is set.
/// This function handles connection errors and provides a clean interface for database access
/// throughout the application.
pub async fn create_connection() -> Result<DatabaseConnection> {
    Database::connect(get_database_url())
        .await
        .map_err(Into::into)
}

/// Creates all necessary database tables using `SeaORM`'s schema generation from entity definitions.
///
/// This function uses the `DeriveEntityModel` macros to automatically generate proper SQL
/// statements for table creation. Tables are created with `IF NOT EXISTS` so startup is
/// idempotent against an existing database file.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    let mut warehouse_table = schema.create_table_from_entity(Warehouse);
    let mut item_table = schema.create_table_from_entity(Item);
    let mut stock_level_table = schema.create_table_from_entity(StockLevel);
    let mut sales_import_table = schema.create_table_from_entity(SalesImport);
    let mut sales_import_item_table = schema.create_table_from_entity(SalesImportItem);
    let mut transaction_table = schema.create_table_from_entity(InventoryTransaction);

    db.execute(builder.build(warehouse_table.if_not_exists()))
        .await?;
    db.execute(builder.build(item_table.if_not_exists())).await?;
    db.execute(builder.build(stock_level_table.if_not_exists()))
        .await?;
    db.execute(builder.build(sales_import_table.if_not_exists()))
        .await?;
    db.execute(builder.build(sales_import_item_table.if_not_exists()))
        .await?;
    db.execute(builder.build(transaction_table.if_not_exists()))
        .await?;

    Ok(())
}
