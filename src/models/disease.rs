use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Disease {
    pub id: RecordId,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateDisease {
    pub name: String,
}

/// Link between a donor and a condition reported at booking time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DonorDisease {
    pub id: RecordId,
    pub donor_id: RecordId,
    pub disease_id: RecordId,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateDonorDisease {
    pub donor_id: RecordId,
    pub disease_id: RecordId,
}
