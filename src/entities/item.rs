//! Item entity - Represents a catalog item that POS sale rows are matched
//! against by barcode.
//!
//! The `cost` field is the unit cost snapshotted onto inventory transactions
//! when a sale is posted. Barcode matching is case-insensitive; the stored
//! barcode keeps its original casing.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Item database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "items")]
pub struct Model {
    /// Unique identifier for the item
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Item barcode as printed on the product (primary matching field)
    #[sea_orm(unique)]
    pub barcode: String,
    /// Human-readable item name
    pub name: String,
    /// Unit cost used for transaction cost snapshots
    pub cost: f64,
    /// Soft delete flag - deleted items are excluded from barcode matching
    pub is_deleted: bool,
}

/// Defines relationships between Item and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One item has many stock levels (one per warehouse)
    #[sea_orm(has_many = "super::stock_level::Entity")]
    StockLevels,
    /// One item has many inventory transactions
    #[sea_orm(has_many = "super::inventory_transaction::Entity")]
    InventoryTransactions,
}

impl Related<super::stock_level::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::StockLevels.def()
    }
}

impl Related<super::inventory_transaction::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::InventoryTransactions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
