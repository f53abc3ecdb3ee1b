//! Warehouse entity - Represents a store or warehouse location that sales
//! imports and inventory transactions are recorded against.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Warehouse database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "warehouses")]
pub struct Model {
    /// Unique identifier for the warehouse
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Short user-facing code (e.g., "MAIN", "STORE-02")
    #[sea_orm(unique)]
    pub code: String,
    /// Human-readable warehouse name
    pub name: String,
    /// Inactive warehouses cannot receive new imports
    pub is_active: bool,
}

/// Defines relationships between Warehouse and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One warehouse has many stock levels
    #[sea_orm(has_many = "super::stock_level::Entity")]
    StockLevels,
    /// One warehouse has many sales imports
    #[sea_orm(has_many = "super::sales_import::Entity")]
    SalesImports,
}

impl Related<super::stock_level::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::StockLevels.def()
    }
}

impl Related<super::sales_import::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SalesImports.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
