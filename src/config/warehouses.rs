//! Warehouse configuration loading from config.toml
//!
//! This module provides functionality to load initial warehouse configurations
//! from a TOML configuration file. The warehouses defined in config.toml are
//! used to seed the database on first run or when warehouses are missing.

use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::Path;

/// Configuration structure representing the entire config.toml file
#[derive(Debug, Deserialize)]
pub struct Config {
    /// List of warehouse configurations to seed
    #[serde(default)]
    pub warehouses: Vec<WarehouseConfig>,
}

/// Configuration for a single warehouse
#[derive(Debug, Deserialize, Clone)]
pub struct WarehouseConfig {
    /// Short unique code for the warehouse (e.g., "MAIN")
    pub code: String,
    /// Human-readable warehouse name
    pub name: String,
    /// Whether the warehouse accepts new imports
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

/// Loads warehouse configuration from a TOML file
///
/// # Errors
/// Returns an error if:
/// - The file cannot be read
/// - The TOML syntax is invalid
/// - Required fields are missing
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config> {
    let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| Error::Config {
        message: format!("Failed to read config file: {e}"),
    })?;

    toml::from_str(&contents).map_err(|e| Error::Config {
        message: format!("Failed to parse config.toml: {e}"),
    })
}

/// Loads warehouse configuration from the default location (./config.toml).
///
/// A missing file is not an error; it yields an empty warehouse list so the
/// application can start against an already-seeded database.
pub fn load_default_config() -> Result<Config> {
    if !Path::new("config.toml").exists() {
        return Ok(Config { warehouses: Vec::new() });
    }
    load_config("config.toml")
}
