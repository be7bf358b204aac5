use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

/// Emailed 5-digit code, stored hashed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailVerification {
    pub id: RecordId,
    pub email: String,
    pub code_hash: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateEmailVerification {
    pub email: String,
    pub code_hash: String,
    pub created_at: DateTime<Utc>,
}
