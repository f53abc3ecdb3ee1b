//! Unified error types for the stockflow crate.
//!
//! Fatal, request-level failures (missing warehouse, duplicate import number,
//! structurally unparseable CSV) surface as variants of [`Error`]. Row-level
//! failures inside an import never become an [`Error`]; they are recorded on
//! the offending row and absorbed into the import statistics.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Warehouse {warehouse} not found")]
    WarehouseNotFound { warehouse: String },

    #[error("Sales import {number} not found")]
    ImportNotFound { number: String },

    #[error("Import with number {number} already exists")]
    DuplicateImport { number: String },

    #[error("Invalid CSV format: {message}")]
    InvalidCsv { message: String },

    #[error("Invalid quantity: {quantity}")]
    InvalidQuantity { quantity: i32 },

    #[error("Invalid amount: {amount}")]
    InvalidAmount { amount: f64 },

    #[error("Import cannot be reversed: {message}")]
    ImportNotReversible { message: String },

    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
