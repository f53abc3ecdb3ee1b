//! Sales import entity - A batch upload of POS sales data for one warehouse
//! and sales period.
//!
//! The import tracks lifecycle status (`PENDING` -> `PROCESSING` ->
//! `COMPLETED`/`FAILED`) and aggregate statistics over its rows. Statistics
//! are recomputed after parsing and again after row processing; completed
//! imports can later be reversed, which flips `is_reversed` and records who
//! reversed them and why.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Sales import database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "sales_imports")]
pub struct Model {
    /// Unique identifier for the import
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Human-friendly import identifier (e.g., "IMP-20251111-001")
    #[sea_orm(unique)]
    pub import_number: String,
    /// Date the import was processed in the system
    pub import_date: DateTimeUtc,
    /// Start of the sales period covered by this import
    pub sales_period_from: DateTimeUtc,
    /// End of the sales period covered by this import
    pub sales_period_to: DateTimeUtc,
    /// Warehouse where the sales occurred
    pub warehouse_id: i64,
    /// Original CSV filename from the POS system
    pub file_name: String,
    /// Free-text notes attached to the import
    pub notes: Option<String>,
    /// Lifecycle status: `"PENDING"`, `"PROCESSING"`, `"COMPLETED"`, `"FAILED"`
    pub status: String,
    /// Total number of parsed rows in the import
    pub total_records: i32,
    /// Number of rows successfully processed
    pub processed_records: i32,
    /// Number of rows that failed processing
    pub error_records: i32,
    /// Total quantity sold across counted rows
    pub total_quantity: i32,
    /// Total sales value across counted rows (when unit prices are present)
    pub total_value: Option<f64>,
    /// User who created/processed the import
    pub processed_by: Option<String>,
    /// Error message if the import failed outright
    pub error_message: Option<String>,
    /// Whether this import has been reversed
    pub is_reversed: bool,
    /// When the import was reversed
    pub reversed_date: Option<DateTimeUtc>,
    /// User who reversed the import
    pub reversed_by: Option<String>,
    /// Reason given for the reversal
    pub reversal_reason: Option<String>,
    /// When the import record was created
    pub created_at: DateTimeUtc,
}

/// Defines relationships between SalesImport and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One import has many line items
    #[sea_orm(has_many = "super::sales_import_item::Entity")]
    Items,
    /// Each import belongs to one warehouse
    #[sea_orm(
        belongs_to = "super::warehouse::Entity",
        from = "Column::WarehouseId",
        to = "super::warehouse::Column::Id"
    )]
    Warehouse,
}

impl Related<super::sales_import_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Items.def()
    }
}

impl Related<super::warehouse::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Warehouse.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
