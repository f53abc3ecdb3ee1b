/// Database configuration and connection management
pub mod database;

/// Warehouse seed configuration loading from config.toml
pub mod warehouses;
