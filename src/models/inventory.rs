use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

/// Unit count of one blood type at one blood bank.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InventoryItem {
    pub id: RecordId,
    pub blood_bank_id: RecordId,
    pub blood_type: String, // ! e.g `AB+`
    pub quantity: i64,
    pub expiration_date: NaiveDate,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateInventoryItem {
    pub blood_bank_id: RecordId,
    pub blood_type: String,
    pub quantity: i64,
    pub expiration_date: NaiveDate,
}
