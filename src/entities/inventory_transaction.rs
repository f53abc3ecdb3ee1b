//! Inventory transaction entity - An immutable ledger entry recording a
//! stock quantity change and its reason.
//!
//! Transactions are created once and never updated or deleted. `quantity_before`
//! snapshots the stock level read at posting time; `quantity_after` is derived
//! from it by direction and may go negative for `OUT` movements (POS sales are
//! historical fact and are posted even when they reveal a stock discrepancy).

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Inventory transaction database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "inventory_transactions")]
pub struct Model {
    /// Unique identifier for the transaction
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Human-friendly transaction identifier (e.g., "SALE-IMP-001-3")
    #[sea_orm(unique)]
    pub transaction_number: String,
    /// Item affected by the movement
    pub item_id: i64,
    /// Warehouse where the movement occurred
    pub warehouse_id: i64,
    /// Movement direction: `"IN"`, `"OUT"`, `"ADJUSTMENT"`, `"TRANSFER"`
    pub transaction_type: String,
    /// Reason code for the movement (e.g., `"POS_SALE"`)
    pub reason: String,
    /// Quantity moved; always positive, direction comes from the type
    pub quantity: i32,
    /// Stock on hand before the movement, as read at posting time
    pub quantity_before: i32,
    /// Stock on hand implied after the movement
    pub quantity_after: i32,
    /// Unit cost snapshot used for the financial impact
    pub unit_cost: f64,
    /// Absolute financial impact (quantity * unit_cost)
    pub total_cost: f64,
    /// Date the movement occurred (the sale date for POS sales)
    pub transaction_date: DateTimeUtc,
    /// Source document reference (import number, line)
    pub reference: Option<String>,
    /// Additional free-text details
    pub notes: Option<String>,
    /// User who performed the movement
    pub performed_by: Option<String>,
    /// Whether the transaction is approved (POS sales auto-approve)
    pub is_approved: bool,
}

/// Defines relationships between InventoryTransaction and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each transaction belongs to one item
    #[sea_orm(
        belongs_to = "super::item::Entity",
        from = "Column::ItemId",
        to = "super::item::Column::Id"
    )]
    Item,
    /// Each transaction belongs to one warehouse
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
