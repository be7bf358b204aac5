use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub id: RecordId,
    pub blood_bank_id: RecordId,
    pub title: String,       // ! & (len = 200)
    pub description: String, // ! & (len = 1000)
    pub event_date: NaiveDate,
    pub event_time: NaiveTime,
    pub location: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateEvent {
    pub blood_bank_id: RecordId,
    pub title: String,
    pub description: String,
    pub event_date: NaiveDate,
    pub event_time: NaiveTime,
    pub location: String,
}
