pub mod tables {
    pub const USER_TABLE: &str = "users";
    pub const BLOOD_BANK_TABLE: &str = "blood_banks";
    pub const APPOINTMENT_TABLE: &str = "appointments";
    pub const DONATION_TABLE: &str = "blood_donations";
    pub const INVENTORY_TABLE: &str = "blood_inventory";
    pub const BLOOD_NEED_TABLE: &str = "blood_needs";
    pub const EVENT_TABLE: &str = "events";
    pub const DISEASE_TABLE: &str = "diseases";
    pub const DONOR_DISEASE_TABLE: &str = "donor_diseases";
    pub const FOLLOW_TABLE: &str = "bank_follows";
    pub const FAQ_TABLE: &str = "faqs";
    pub const VOLUNTEERING_TABLE: &str = "volunteering";
    pub const REGISTRATION_REQUEST_TABLE: &str = "registration_requests";
    pub const EMAIL_VERIFICATION_TABLE: &str = "email_verifications";
    pub const REVOKED_TOKEN_TABLE: &str = "revoked_tokens";
}

pub mod policy {
    /// Whole blood keeps for 42 days from the day it is drawn.
    pub const SHELF_LIFE_DAYS: i64 = 42;
    /// Minimum gap between two whole-blood donations by the same donor.
    pub const DONATION_INTERVAL_DAYS: i64 = 56;
    /// Window used by the dashboard activity counters.
    pub const DASHBOARD_WINDOW_DAYS: i64 = 30;

    pub const TOKEN_ISSUER: &str = "bloodline";
    pub const TOKEN_TTL_HOURS: i64 = 24;
}
