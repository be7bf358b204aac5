use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

/// Immutable record written once, when an Open appointment completes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BloodDonation {
    pub id: RecordId,
    pub donor_id: RecordId,
    pub blood_bank_id: RecordId,
    pub appointment_id: RecordId,
    pub donation_date: NaiveDate,
    pub donation_type: String,
    pub quantity_donated: i64, // whole-blood units
    pub donor_blood_pulse: f64,
    pub donor_temperature: f64,
    pub blood_pressure: String, // ! e.g `120/80`
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateBloodDonation {
    pub donor_id: RecordId,
    pub blood_bank_id: RecordId,
    pub appointment_id: RecordId,
    pub donation_date: NaiveDate,
    pub donation_type: String,
    pub quantity_donated: i64,
    pub donor_blood_pulse: f64,
    pub donor_temperature: f64,
    pub blood_pressure: String,
}
