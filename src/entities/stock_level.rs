//! Stock level entity - Current on-hand quantity of an item at a warehouse.
//!
//! Stock levels are read (not locked) when sales are posted; the ledger of
//! inventory transactions is the authoritative movement history.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Stock level database model; one row per (item, warehouse) pair
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "stock_levels")]
pub struct Model {
    /// Unique identifier for the stock level record
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Item this stock level belongs to
    pub item_id: i64,
    /// Warehouse holding the stock
    pub warehouse_id: i64,
    /// Current physical quantity on hand
    pub quantity_on_hand: i32,
}

/// Defines relationships between StockLevel and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each stock level belongs to one item
    #[sea_orm(
        belongs_to = "super::item::Entity",
        from = "Column::ItemId",
        to = "super::item::Column::Id"
    )]
    Item,
    /// Each stock level belongs to one warehouse
    #[sea_orm(
        belongs_to = "super::warehouse::Entity",
        from = "Column::WarehouseId",
        to = "super::warehouse::Column::Id"
    )]
    Warehouse,
}

impl Related<super::item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Item.def()
    }
}

impl Related<super::warehouse::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Warehouse.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
