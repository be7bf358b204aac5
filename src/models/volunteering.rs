use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Volunteering {
    pub id: RecordId,
    pub donor_id: RecordId,
    pub applied_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateVolunteering {
    pub donor_id: RecordId,
    pub applied_at: DateTime<Utc>,
}
