//! Stock level business logic - Reads and establishes on-hand quantities.
//!
//! The import pipeline only reads stock here; sales posting never writes a
//! stock level. On-hand counts are established out of band (receiving is not
//! part of this crate's import flow) via [`set_stock_level`].

use crate::{
    entities::{StockLevel, stock_level},
    errors::{Error, Result},
};
use sea_orm::{Set, prelude::*};

/// Finds the stock level for an item at a warehouse, returning None when no
/// stock record exists yet.
pub async fn get_stock_level(
    db: &DatabaseConnection,
    item_id: i64,
    warehouse_id: i64,
) -> Result<Option<stock_level::Model>> {
    StockLevel::find()
        .filter(stock_level::Column::ItemId.eq(item_id))
        .filter(stock_level::Column::WarehouseId.eq(warehouse_id))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Sets the absolute on-hand quantity for an item at a warehouse, creating
/// the stock record when none exists.
///
/// # Errors
/// Returns [`Error::InvalidQuantity`] for negative quantities.
pub async fn set_stock_level(
    db: &DatabaseConnection,
    item_id: i64,
    warehouse_id: i64,
    quantity_on_hand: i32,
) -> Result<stock_level::Model> {
    if quantity_on_hand < 0 {
        return Err(Error::InvalidQuantity {
            quantity: quantity_on_hand,
        });
    }

    match get_stock_level(db, item_id, warehouse_id).await? {
        Some(existing) => {
            let mut active: stock_level::ActiveModel = existing.into();
            active.quantity_on_hand = Set(quantity_on_hand);
            active.update(db).await.map_err(Into::into)
        }
        None => {
            let stock = stock_level::ActiveModel {
                item_id: Set(item_id),
                warehouse_id: Set(warehouse_id),
                quantity_on_hand: Set(quantity_on_hand),
                ..Default::default()
            };
            stock.insert(db).await.map_err(Into::into)
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;

    #[tokio::test]
    async fn test_set_stock_level_rejects_negative() -> Result<()> {
        let db = setup_test_db().await?;
        let result = set_stock_level(&db, 1, 1, -5).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::InvalidQuantity { quantity: -5 }
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_set_stock_level_creates_then_updates() -> Result<()> {
        let (db, warehouse) = setup_with_warehouse().await?;
        let item = create_test_item(&db, "ABC123", 4.5).await?;

        assert!(get_stock_level(&db, item.id, warehouse.id).await?.is_none());

        let created = set_stock_level(&db, item.id, warehouse.id, 10).await?;
        assert_eq!(created.quantity_on_hand, 10);

        let updated = set_stock_level(&db, item.id, warehouse.id, 3).await?;
        assert_eq!(updated.id, created.id);
        assert_eq!(updated.quantity_on_hand, 3);

        let read = get_stock_level(&db, item.id, warehouse.id).await?.unwrap();
        assert_eq!(read.quantity_on_hand, 3);

        Ok(())
    }

    #[tokio::test]
    async fn test_stock_levels_are_per_warehouse() -> Result<()> {
        let db = setup_test_db().await?;
        let main = create_test_warehouse(&db, "MAIN").await?;
        let store = create_test_warehouse(&db, "STORE-02").await?;
        let item = create_test_item(&db, "ABC123", 4.5).await?;

        set_stock_level(&db, item.id, main.id, 10).await?;
        set_stock_level(&db, item.id, store.id, 2).await?;

        assert_eq!(
            get_stock_level(&db, item.id, main.id).await?.unwrap().quantity_on_hand,
            10
        );
        assert_eq!(
            get_stock_level(&db, item.id, store.id).await?.unwrap().quantity_on_hand,
            2
        );

        Ok(())
    }
}
