//! Sales import item entity - One parsed CSV row within a sales import.
//!
//! Each row records its own match/post outcome: either `is_processed` with
//! the matched item and created transaction ids, or `has_error` with an
//! error message. A row is mutated exactly once to record its outcome.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Sales import item database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "sales_import_items")]
pub struct Model {
    /// Unique identifier for the row
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Parent sales import
    pub sales_import_id: i64,
    /// 1-based line number in the CSV file, unique within the import
    pub line_number: i32,
    /// Date of sale from the POS system
    pub sale_date: DateTimeUtc,
    /// Item barcode from the POS system (primary matching field)
    pub barcode: String,
    /// Item name from the POS system, for reference only
    pub item_name: Option<String>,
    /// Quantity sold in this row
    pub quantity_sold: i32,
    /// Unit price from the POS system, informational only
    pub unit_price: Option<f64>,
    /// Total sale amount (quantity_sold * unit_price)
    pub total_amount: Option<f64>,
    /// Matched inventory item, populated after a successful barcode match
    pub item_id: Option<i64>,
    /// Created inventory transaction, populated after posting
    pub inventory_transaction_id: Option<i64>,
    /// Whether this row has been successfully processed
    pub is_processed: bool,
    /// Whether processing this row hit an error
    pub has_error: bool,
    /// Error message if processing failed
    pub error_message: Option<String>,
}

/// Defines relationships between SalesImportItem and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each row belongs to one sales import
    #[sea_orm(
        belongs_to = "super::sales_import::Entity",
        from = "Column::SalesImportId",
        to = "super::sales_import::Column::Id"
    )]
    SalesImport,
    /// Each row optionally references its matched item
    #[sea_orm(
        belongs_to = "super::item::Entity",
        from = "Column::ItemId",
        to = "super::item::Column::Id"
    )]
    Item,
}

impl Related<super::sales_import::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SalesImport.def()
    }
}

impl Related<super::item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Item.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
