pub mod appointment;
pub mod blood_bank;
pub mod blood_need;
pub mod disease;
pub mod donation;
pub mod event;
pub mod faq;
pub mod inventory;
pub mod registration;
pub mod revoked;
pub mod user;
pub mod verification;
pub mod volunteering;
