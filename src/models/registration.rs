use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RequestStatus {
    Pending,
    Approved,
    Rejected,
}

/// Manager/organization onboarding request, reviewed by an admin.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistrationRequest {
    pub id: RecordId,
    pub manager_name: String,
    pub manager_email: String,
    pub manager_position: String,
    pub organization_name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub contact_info: String,
    pub start_hour: String,
    pub close_hour: String,
    pub request_status: RequestStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateRegistrationRequest {
    pub manager_name: String,
    pub manager_email: String,
    pub manager_position: String,
    pub organization_name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub contact_info: String,
    pub start_hour: String,
    pub close_hour: String,
    pub request_status: RequestStatus,
}
