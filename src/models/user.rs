use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    Donor,
    Admin,
    Manager,
    Staff,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Donor => "Donor",
            Role::Admin => "Admin",
            Role::Manager => "Manager",
            Role::Staff => "Staff",
        }
    }
}

/// Role-specific attributes, tagged on the stored record. One `users`
/// table with a discriminator instead of four disjoint tables.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "role")]
pub enum RoleProfile {
    Donor {
        weight: f64,
        id_number: String,
        blood_group: String,
        #[serde(default)]
        ranking_points: i64,
    },
    Admin,
    Manager {
        blood_bank_id: RecordId,
    },
    Staff {
        blood_bank_id: RecordId,
        title: String,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Principal {
    pub id: RecordId,
    pub username: Option<String>,
    pub email: String, // ! unique & (len = 200)
    pub password_hash: String,
    pub phone_number: Option<String>,
    pub gender: Option<String>,
    pub profile_image: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    #[serde(flatten)]
    pub profile: RoleProfile,
}

impl Principal {
    pub fn role(&self) -> Role {
        match self.profile {
            RoleProfile::Donor { .. } => Role::Donor,
            RoleProfile::Admin => Role::Admin,
            RoleProfile::Manager { .. } => Role::Manager,
            RoleProfile::Staff { .. } => Role::Staff,
        }
    }

    /// The bank a manager or staff member acts for.
    pub fn blood_bank(&self) -> Option<&RecordId> {
        match &self.profile {
            RoleProfile::Manager { blood_bank_id } => Some(blood_bank_id),
            RoleProfile::Staff { blood_bank_id, .. } => Some(blood_bank_id),
            _ => None,
        }
    }

    pub fn blood_group(&self) -> Option<&str> {
        match &self.profile {
            RoleProfile::Donor { blood_group, .. } => Some(blood_group),
            _ => None,
        }
    }
}

/// Insert shape for the `users` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePrincipal {
    pub username: Option<String>,
    pub email: String,
    pub password_hash: String,
    pub phone_number: Option<String>,
    pub gender: Option<String>,
    pub profile_image: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    #[serde(flatten)]
    pub profile: RoleProfile,
}
