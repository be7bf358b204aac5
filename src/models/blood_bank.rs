use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BloodBank {
    pub id: RecordId,
    pub name: String, // ! & (len = 200)
    pub latitude: f64,
    pub longitude: f64,
    pub phone_number: String,
    pub email: String,
    pub start_hour: String, // ! e.g `08:00`
    pub close_hour: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateBloodBank {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub phone_number: String,
    pub email: String,
    pub start_hour: String,
    pub close_hour: String,
}

/// Follow edge between a donor and a bank.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BankFollow {
    pub id: RecordId,
    pub donor_id: RecordId,
    pub blood_bank_id: RecordId,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateBankFollow {
    pub donor_id: RecordId,
    pub blood_bank_id: RecordId,
}
