use chrono::Utc;
use surrealdb::{RecordId, Surreal, engine::remote::ws::Client};

use crate::consts::tables::{APPOINTMENT_TABLE, DONATION_TABLE, INVENTORY_TABLE};
use crate::errors::{Error, Result};
use crate::models::appointment::{Appointment, AppointmentStatus};
use crate::models::donation::{BloodDonation, CreateBloodDonation};
use crate::models::inventory::CreateInventoryItem;
use crate::models::user::{Principal, RoleProfile};
use crate::workflow::inventory;

/// Legality of a status change. Pending → Open, Open → Complete,
/// Open → Canceled; everything else is a conflict naming the current
/// status.
pub fn check_transition(current: AppointmentStatus, target: AppointmentStatus) -> Result<()> {
    let allowed = matches!(
        (current, target),
        (AppointmentStatus::Pending, AppointmentStatus::Open)
            | (AppointmentStatus::Open, AppointmentStatus::Complete)
            | (AppointmentStatus::Open, AppointmentStatus::Canceled)
    );
    if allowed {
        Ok(())
    } else {
        Err(Error::InvalidTransition {
            attempted: transition_verb(target),
            current: current.to_string(),
        })
    }
}

fn transition_verb(target: AppointmentStatus) -> &'static str {
    match target {
        AppointmentStatus::Pending => "made pending",
        AppointmentStatus::Open => "opened",
        AppointmentStatus::Complete => "completed",
        AppointmentStatus::Canceled => "canceled",
    }
}

/// Look up an appointment inside the acting staff member's bank. Records
/// of other banks are invisible to the transition operations.
pub async fn find_bank_scoped(
    sdb: &Surreal<Client>,
    blood_bank_id: &RecordId,
    appointment_key: &str,
) -> Result<Appointment> {
    let id = RecordId::from_table_key(APPOINTMENT_TABLE, appointment_key);
    let appointment: Option<Appointment> = sdb.select(id).await?;
    match appointment {
        Some(a) if &a.blood_bank_id == blood_bank_id => Ok(a),
        _ => Err(Error::NotFound),
    }
}

async fn set_status(
    sdb: &Surreal<Client>,
    appointment: &Appointment,
    target: AppointmentStatus,
) -> Result<Appointment> {
    check_transition(appointment.status, target)?;

    let updated: Vec<Appointment> = sdb
        .query("UPDATE $appointment SET status = $status;")
        .bind(("appointment", appointment.id.clone()))
        .bind(("status", target))
        .await?
        .take(0)?;
    updated.into_iter().next().ok_or(Error::Internal)
}

pub async fn open(
    sdb: &Surreal<Client>,
    blood_bank_id: &RecordId,
    appointment_key: &str,
) -> Result<Appointment> {
    let appointment = find_bank_scoped(sdb, blood_bank_id, appointment_key).await?;
    set_status(sdb, &appointment, AppointmentStatus::Open).await
}

pub async fn cancel(
    sdb: &Surreal<Client>,
    blood_bank_id: &RecordId,
    appointment_key: &str,
) -> Result<Appointment> {
    let appointment = find_bank_scoped(sdb, blood_bank_id, appointment_key).await?;
    set_status(sdb, &appointment, AppointmentStatus::Canceled).await
}

/// Vitals and measured draw entered by staff at the chair.
#[derive(Debug, Clone)]
pub struct CompletionIntake {
    pub blood_type: String,
    pub quantity_donated: i64,
    pub donor_blood_pulse: f64,
    pub donor_temperature: f64,
    pub blood_pressure: String,
}

/// The one transition with side effects: records the donation, grows the
/// bank's inventory (creating the row with a fresh shelf life when the
/// type is new to the bank), and corrects the donor's blood group when
/// the measured type differs from the one on file. Issued as a single
/// transaction.
pub async fn complete(
    sdb: &Surreal<Client>,
    blood_bank_id: &RecordId,
    appointment_key: &str,
    intake: CompletionIntake,
) -> Result<BloodDonation> {
    let appointment = find_bank_scoped(sdb, blood_bank_id, appointment_key).await?;
    check_transition(appointment.status, AppointmentStatus::Complete)?;

    let donor: Principal = sdb
        .select(appointment.donor_id.clone())
        .await?
        .ok_or(Error::NotFound)?;
    let needs_correction = match &donor.profile {
        RoleProfile::Donor { blood_group, .. } => blood_group != &intake.blood_type,
        _ => return Err(Error::Unauthorized),
    };

    let today = Utc::now().date_naive();
    let donation = CreateBloodDonation {
        donor_id: appointment.donor_id.clone(),
        blood_bank_id: blood_bank_id.clone(),
        appointment_id: appointment.id.clone(),
        donation_date: today,
        donation_type: appointment.donation_type.clone(),
        quantity_donated: intake.quantity_donated,
        donor_blood_pulse: intake.donor_blood_pulse,
        donor_temperature: intake.donor_temperature,
        blood_pressure: intake.blood_pressure.clone(),
    };

    let existing_item = inventory::find_item(sdb, blood_bank_id, &intake.blood_type).await?;

    let mut statements = vec![
        "BEGIN TRANSACTION;",
        "UPDATE $appointment SET status = $status, quantity_donated = $units;",
        "CREATE type::table($donation_table) CONTENT $donation;",
        inventory::deposit_statement(existing_item.is_some()),
    ];
    if needs_correction {
        statements.push("UPDATE $donor SET blood_group = $blood_type;");
    }
    statements.push("COMMIT TRANSACTION;");

    let mut query = sdb
        .query(statements.join("\n"))
        .bind(("appointment", appointment.id.clone()))
        .bind(("status", AppointmentStatus::Complete))
        .bind(("units", intake.quantity_donated))
        .bind(("donation_table", DONATION_TABLE))
        .bind(("donation", donation));
    query = match existing_item {
        Some(item) => query.bind(("item", item.id)),
        None => query.bind(("inventory_table", INVENTORY_TABLE)).bind((
            "new_item",
            CreateInventoryItem {
                blood_bank_id: blood_bank_id.clone(),
                blood_type: intake.blood_type.clone(),
                quantity: intake.quantity_donated,
                expiration_date: inventory::shelf_life_expiry(today),
            },
        )),
    };
    if needs_correction {
        query = query
            .bind(("donor", appointment.donor_id.clone()))
            .bind(("blood_type", intake.blood_type.clone()));
    }

    let created: Vec<BloodDonation> = query.await?.take(1)?;
    created.into_iter().next().ok_or(Error::Internal)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pending_can_only_open() {
        assert!(check_transition(AppointmentStatus::Pending, AppointmentStatus::Open).is_ok());
        assert!(check_transition(AppointmentStatus::Pending, AppointmentStatus::Complete).is_err());
        assert!(check_transition(AppointmentStatus::Pending, AppointmentStatus::Canceled).is_err());
    }

    #[test]
    fn test_open_can_complete_or_cancel() {
        assert!(check_transition(AppointmentStatus::Open, AppointmentStatus::Complete).is_ok());
        assert!(check_transition(AppointmentStatus::Open, AppointmentStatus::Canceled).is_ok());
        assert!(check_transition(AppointmentStatus::Open, AppointmentStatus::Open).is_err());
    }

    #[test]
    fn test_terminal_states_are_final() {
        for terminal in [AppointmentStatus::Complete, AppointmentStatus::Canceled] {
            for target in [
                AppointmentStatus::Pending,
                AppointmentStatus::Open,
                AppointmentStatus::Complete,
                AppointmentStatus::Canceled,
            ] {
                assert!(check_transition(terminal, target).is_err());
            }
        }
    }

    #[test]
    fn test_conflict_names_current_status() {
        match check_transition(AppointmentStatus::Pending, AppointmentStatus::Canceled) {
            Err(Error::InvalidTransition { attempted, current }) => {
                assert_eq!(attempted, "canceled");
                assert_eq!(current, "Pending");
            }
            other => panic!("expected transition conflict, got {other:?}"),
        }
    }
}
