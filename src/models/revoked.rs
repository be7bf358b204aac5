use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

/// Sign-out revocation list, keyed by JWT id. Consulted on every
/// authenticated request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RevokedToken {
    pub id: RecordId,
    pub jti: String, // ! unique
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateRevokedToken {
    pub jti: String,
}
