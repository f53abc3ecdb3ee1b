//! Core business logic - framework-agnostic import, matching, posting, and
//! reporting operations.
//!
//! Everything in here takes an explicit database connection (and, where
//! processing is involved, an explicit actor and cancellation token) rather
//! than relying on ambient context.

/// CSV record decoding for POS export payloads
pub mod csv;
/// Sales import orchestration: create, process, reverse
pub mod import;
/// Item catalog operations and bulk barcode matching
pub mod item;
/// Import summary/detail reporting
pub mod report;
/// Stock level reads and upserts
pub mod stock;
/// Inventory ledger transaction posting
pub mod transaction;
/// Warehouse operations and config seeding
pub mod warehouse;
