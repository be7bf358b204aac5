use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Faq {
    pub id: RecordId,
    pub question: String, // ! & (len = 500)
    pub answer: String,   // ! & (len = 1000)
    pub created_by: RecordId,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateFaq {
    pub question: String,
    pub answer: String,
    pub created_by: RecordId,
}
