use chrono::{Duration, NaiveDate};
use surrealdb::{RecordId, Surreal, engine::remote::ws::Client};

use crate::consts::policy::SHELF_LIFE_DAYS;
use crate::consts::tables::INVENTORY_TABLE;
use crate::errors::{Error, Result};
use crate::models::inventory::InventoryItem;

/// Expiration stamped on a fresh inventory row.
pub fn shelf_life_expiry(drawn_on: NaiveDate) -> NaiveDate {
    drawn_on + Duration::days(SHELF_LIFE_DAYS)
}

/// Ledger arithmetic for a withdrawal. Fails on non-positive requests
/// and on requests exceeding stock, reporting what is available.
pub fn take_from_stock(stock: i64, requested: i64, blood_type: &str) -> Result<i64> {
    if requested <= 0 {
        return Err(Error::NonPositiveQuantity);
    }
    if requested > stock {
        return Err(Error::InsufficientStock {
            blood_type: blood_type.to_string(),
            available: stock,
        });
    }
    Ok(stock - requested)
}

pub async fn find_item(
    sdb: &Surreal<Client>,
    blood_bank_id: &RecordId,
    blood_type: &str,
) -> Result<Option<InventoryItem>> {
    let found: Vec<InventoryItem> = sdb
        .query("SELECT * FROM type::table($table) WHERE blood_bank_id = $blood_bank_id AND blood_type = $blood_type;")
        .bind(("table", INVENTORY_TABLE))
        .bind(("blood_bank_id", blood_bank_id.clone()))
        .bind(("blood_type", blood_type.to_string()))
        .await?
        .take(0)?;
    Ok(found.into_iter().next())
}

pub async fn list_for_bank(
    sdb: &Surreal<Client>,
    blood_bank_id: &RecordId,
) -> Result<Vec<InventoryItem>> {
    let items: Vec<InventoryItem> = sdb
        .query("SELECT * FROM type::table($table) WHERE blood_bank_id = $blood_bank_id;")
        .bind(("table", INVENTORY_TABLE))
        .bind(("blood_bank_id", blood_bank_id.clone()))
        .await?
        .take(0)?;
    Ok(items)
}

/// Statement the completion transaction appends to grow stock. The row
/// is created with a fresh shelf life when the pair has no entry yet.
pub fn deposit_statement(existing: bool) -> &'static str {
    if existing {
        "UPDATE $item SET quantity += $units;"
    } else {
        "CREATE type::table($inventory_table) CONTENT $new_item;"
    }
}

/// Withdraw units for consumption. Returns the remaining quantity.
pub async fn consume(
    sdb: &Surreal<Client>,
    blood_bank_id: &RecordId,
    blood_type: &str,
    units: i64,
) -> Result<i64> {
    let item = find_item(sdb, blood_bank_id, blood_type)
        .await?
        .ok_or_else(|| {
            Error::BadRequest(format!("No inventory found for blood type {blood_type}"))
        })?;

    let remaining = take_from_stock(item.quantity, units, blood_type)?;

    let _: Vec<InventoryItem> = sdb
        .query("UPDATE $item SET quantity = $remaining;")
        .bind(("item", item.id.clone()))
        .bind(("remaining", remaining))
        .await?
        .take(0)?;

    Ok(remaining)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_take_leaves_difference() {
        assert_eq!(take_from_stock(10, 3, "A+").expect("take failed"), 7);
        assert_eq!(take_from_stock(3, 3, "A+").expect("take failed"), 0);
    }

    #[test]
    fn test_take_rejects_non_positive() {
        assert!(matches!(
            take_from_stock(10, 0, "A+"),
            Err(Error::NonPositiveQuantity)
        ));
        assert!(matches!(
            take_from_stock(10, -2, "A+"),
            Err(Error::NonPositiveQuantity)
        ));
    }

    #[test]
    fn test_take_reports_available_on_shortage() {
        match take_from_stock(2, 5, "B-") {
            Err(Error::InsufficientStock {
                blood_type,
                available,
            }) => {
                assert_eq!(blood_type, "B-");
                assert_eq!(available, 2);
            }
            other => panic!("expected insufficient stock, got {other:?}"),
        }
    }

    #[test]
    fn test_shelf_life_is_42_days() {
        let drawn: NaiveDate = "2026-01-01".parse().unwrap();
        assert_eq!(shelf_life_expiry(drawn), "2026-02-12".parse().unwrap());
    }
}
