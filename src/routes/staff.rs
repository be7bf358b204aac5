use axum::{
    Extension, Json, Router,
    extract::{Path, State},
    http::StatusCode,
    middleware,
    routing::{get, post},
};
use chrono::{Datelike, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;
use validator::Validate;

use crate::{
    consts::tables::{
        APPOINTMENT_TABLE, BLOOD_NEED_TABLE, DONATION_TABLE, EVENT_TABLE, VOLUNTEERING_TABLE,
    },
    errors::{Error, Result},
    middleware::{Session, auth_jwt_middleware},
    models::{
        appointment::{Appointment, AppointmentStatus},
        blood_bank::BloodBank,
        blood_need::{BloodNeed, CreateBloodNeed},
        donation::BloodDonation,
        event::{CreateEvent, Event},
        inventory::InventoryItem,
        user::{Principal, Role},
        volunteering::Volunteering,
    },
    routes::MsgResponse,
    state::AppState,
    utils::{
        validated_form::ValidatedJson,
        validator::validate_blood_group,
    },
    workflow::{directory, inventory, lifecycle},
};

pub fn router(config: AppState) -> Router<AppState> {
    Router::new()
        .route("/inventory", get(list_inventory))
        .route("/inventory/take", post(take_inventory))
        .route("/appointments/today", post(todays_appointments))
        .route("/appointments/{key}/open", post(open_appointment))
        .route("/appointments/{key}/cancel", post(cancel_appointment))
        .route("/appointments/{key}/complete", post(complete_appointment))
        .route("/donors", get(list_donors))
        .route("/volunteers", get(list_volunteers))
        .route("/events", get(list_events).post(create_event))
        .route("/events/{key}", axum::routing::delete(delete_event))
        .route("/blood-needs", post(create_blood_need))
        .layer(middleware::from_fn_with_state(
            config.clone(),
            auth_jwt_middleware,
        ))
        .with_state(config)
}

/// Staff act only within their own bank; every handler resolves the
/// bank once and scopes all queries to it.
async fn require_staff(state: &AppState, session: &Session) -> Result<(Principal, RecordId)> {
    let staff = directory::require(&state.sdb, &session.principal_id, Role::Staff).await?;
    let bank = staff.blood_bank().cloned().ok_or(Error::Unauthorized)?;
    Ok((staff, bank))
}

pub async fn list_inventory(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> Result<Json<Vec<InventoryItem>>> {
    let (_, bank) = require_staff(&state, &session).await?;
    let items = inventory::list_for_bank(&state.sdb, &bank).await?;
    Ok(Json(items))
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct TakeInventoryRequest {
    #[validate(custom(function = "validate_blood_group"))]
    pub blood_type: String,
    pub quantity: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct TakeInventoryResponse {
    pub message: String,
    pub remaining_quantity: i64,
}

pub async fn take_inventory(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    ValidatedJson(input): ValidatedJson<TakeInventoryRequest>,
) -> Result<Json<TakeInventoryResponse>> {
    let (_, bank) = require_staff(&state, &session).await?;

    let remaining =
        inventory::consume(&state.sdb, &bank, &input.blood_type, input.quantity).await?;

    Ok(Json(TakeInventoryResponse {
        message: format!(
            "{} unit(s) of {} taken from inventory",
            input.quantity, input.blood_type
        ),
        remaining_quantity: remaining,
    }))
}

#[derive(Debug, Clone, Deserialize)]
pub struct TodaysAppointmentsRequest {
    pub status: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct StaffAppointmentResponse {
    #[serde(flatten)]
    pub appointment: Appointment,
    pub donor_name: Option<String>,
    pub donor_email: String,
}

pub async fn todays_appointments(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Json(input): Json<TodaysAppointmentsRequest>,
) -> Result<Json<Vec<StaffAppointmentResponse>>> {
    let (_, bank) = require_staff(&state, &session).await?;

    let status = match input.status.as_str() {
        "Pending" => AppointmentStatus::Pending,
        "Open" => AppointmentStatus::Open,
        _ => return Err(Error::BadRequest("Wrong status input".to_string())),
    };

    let appointments: Vec<Appointment> = state
        .sdb
        .query("SELECT * FROM type::table($table) WHERE blood_bank_id = $blood_bank_id AND appointment_date = $today AND status = $status ORDER BY appointment_time;")
        .bind(("table", APPOINTMENT_TABLE))
        .bind(("blood_bank_id", bank))
        .bind(("today", Utc::now().date_naive()))
        .bind(("status", status))
        .await?
        .take(0)?;

    let mut out = Vec::with_capacity(appointments.len());
    for appointment in appointments {
        let donor: Option<Principal> = state.sdb.select(appointment.donor_id.clone()).await?;
        let (donor_name, donor_email) = match donor {
            Some(d) => (d.username, d.email),
            None => (None, String::new()),
        };
        out.push(StaffAppointmentResponse {
            appointment,
            donor_name,
            donor_email,
        });
    }
    Ok(Json(out))
}

pub async fn open_appointment(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(key): Path<String>,
) -> Result<Json<Appointment>> {
    let (_, bank) = require_staff(&state, &session).await?;
    let appointment = lifecycle::open(&state.sdb, &bank, &key).await?;
    Ok(Json(appointment))
}

pub async fn cancel_appointment(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(key): Path<String>,
) -> Result<Json<Appointment>> {
    let (_, bank) = require_staff(&state, &session).await?;
    let appointment = lifecycle::cancel(&state.sdb, &bank, &key).await?;
    Ok(Json(appointment))
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CompleteAppointmentRequest {
    #[validate(custom(function = "validate_blood_group"))]
    pub blood_type: String,
    #[validate(range(min = 1))]
    pub quantity_donated: i64,
    #[validate(range(min = 20.0, max = 250.0))]
    pub donor_blood_pulse: f64,
    #[validate(range(min = 30.0, max = 45.0))]
    pub donor_temperature: f64,
    #[validate(length(min = 3, max = 10))]
    pub blood_pressure: String,
}

pub async fn complete_appointment(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(key): Path<String>,
    ValidatedJson(input): ValidatedJson<CompleteAppointmentRequest>,
) -> Result<Json<BloodDonation>> {
    let (_, bank) = require_staff(&state, &session).await?;

    let donation = lifecycle::complete(
        &state.sdb,
        &bank,
        &key,
        lifecycle::CompletionIntake {
            blood_type: input.blood_type,
            quantity_donated: input.quantity_donated,
            donor_blood_pulse: input.donor_blood_pulse,
            donor_temperature: input.donor_temperature,
            blood_pressure: input.blood_pressure,
        },
    )
    .await?;

    Ok(Json(donation))
}

fn age_on(date_of_birth: NaiveDate, today: NaiveDate) -> i32 {
    let mut age = today.year() - date_of_birth.year();
    if (today.month(), today.day()) < (date_of_birth.month(), date_of_birth.day()) {
        age -= 1;
    }
    age
}

#[derive(Debug, Clone, Serialize)]
pub struct BankDonorResponse {
    pub id: String,
    pub username: Option<String>,
    pub email: String,
    pub blood_group: Option<String>,
    pub age: Option<i32>,
    pub last_donation_date: NaiveDate,
}

/// Donors who have donated at this bank, newest donation first.
pub async fn list_donors(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> Result<Json<Vec<BankDonorResponse>>> {
    let (_, bank) = require_staff(&state, &session).await?;

    let donations: Vec<BloodDonation> = state
        .sdb
        .query("SELECT * FROM type::table($table) WHERE blood_bank_id = $blood_bank_id ORDER BY donation_date DESC;")
        .bind(("table", DONATION_TABLE))
        .bind(("blood_bank_id", bank))
        .await?
        .take(0)?;

    let today = Utc::now().date_naive();
    let mut seen = Vec::new();
    let mut out = Vec::new();
    for donation in donations {
        if seen.contains(&donation.donor_id) {
            continue;
        }
        seen.push(donation.donor_id.clone());
        let donor: Option<Principal> = state.sdb.select(donation.donor_id.clone()).await?;
        let Some(donor) = donor else {
            continue;
        };
        out.push(BankDonorResponse {
            id: donor.id.to_string(),
            username: donor.username.clone(),
            email: donor.email.clone(),
            blood_group: donor.blood_group().map(str::to_string),
            age: donor.date_of_birth.map(|dob| age_on(dob, today)),
            last_donation_date: donation.donation_date,
        });
    }
    Ok(Json(out))
}

#[derive(Debug, Clone, Serialize)]
pub struct VolunteerResponse {
    pub id: String,
    pub username: Option<String>,
    pub email: String,
    pub phone_number: Option<String>,
    pub applied_at: chrono::DateTime<Utc>,
}

pub async fn list_volunteers(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> Result<Json<Vec<VolunteerResponse>>> {
    require_staff(&state, &session).await?;

    let applications: Vec<Volunteering> = state
        .sdb
        .query("SELECT * FROM type::table($table) ORDER BY applied_at DESC;")
        .bind(("table", VOLUNTEERING_TABLE))
        .await?
        .take(0)?;

    let mut out = Vec::with_capacity(applications.len());
    for application in applications {
        let donor: Option<Principal> = state.sdb.select(application.donor_id.clone()).await?;
        let Some(donor) = donor else {
            continue;
        };
        out.push(VolunteerResponse {
            id: donor.id.to_string(),
            username: donor.username,
            email: donor.email,
            phone_number: donor.phone_number,
            applied_at: application.applied_at,
        });
    }
    Ok(Json(out))
}

/// Past events are purged on read instead of by a scheduler.
pub async fn list_events(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> Result<Json<Vec<Event>>> {
    let (_, bank) = require_staff(&state, &session).await?;

    let events: Vec<Event> = state
        .sdb
        .query("SELECT * FROM type::table($table) WHERE blood_bank_id = $blood_bank_id ORDER BY event_date, event_time;")
        .bind(("table", EVENT_TABLE))
        .bind(("blood_bank_id", bank))
        .await?
        .take(0)?;

    let today = Utc::now().date_naive();
    let mut live = Vec::new();
    for event in events {
        if event.event_date < today {
            let _: Option<Event> = state.sdb.delete(event.id).await?;
        } else {
            live.push(event);
        }
    }
    Ok(Json(live))
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateEventRequest {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[validate(length(min = 1, max = 1000))]
    pub description: String,
    pub event_date: NaiveDate,
    pub event_time: NaiveTime,
    #[validate(length(min = 1, max = 200))]
    pub location: String,
}

pub async fn create_event(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    ValidatedJson(input): ValidatedJson<CreateEventRequest>,
) -> Result<(StatusCode, Json<Event>)> {
    let (_, bank) = require_staff(&state, &session).await?;

    let event: Option<Event> = state
        .sdb
        .create(EVENT_TABLE)
        .content(CreateEvent {
            blood_bank_id: bank,
            title: input.title,
            description: input.description,
            event_date: input.event_date,
            event_time: input.event_time,
            location: input.location,
        })
        .await?;
    let event = event.ok_or(Error::Internal)?;

    Ok((StatusCode::CREATED, Json(event)))
}

pub async fn delete_event(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(key): Path<String>,
) -> Result<(StatusCode, Json<MsgResponse>)> {
    let (_, bank) = require_staff(&state, &session).await?;

    let id = RecordId::from_table_key(EVENT_TABLE, &key);
    let event: Option<Event> = state.sdb.select(id.clone()).await?;
    match event {
        Some(e) if e.blood_bank_id == bank => {
            let _: Option<Event> = state.sdb.delete(id).await?;
            Ok((StatusCode::OK, Json(MsgResponse::new("Event deleted"))))
        }
        _ => Err(Error::NotFound),
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateBloodNeedRequest {
    #[validate(custom(function = "validate_blood_group"))]
    pub blood_type: String,
    #[validate(range(min = 0.5, max = 1000.0))]
    pub units: f64,
    #[validate(length(min = 1, max = 200))]
    pub location: String,
    pub expire_date: NaiveDate,
    pub expire_time: NaiveTime,
}

pub async fn create_blood_need(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    ValidatedJson(input): ValidatedJson<CreateBloodNeedRequest>,
) -> Result<(StatusCode, Json<BloodNeed>)> {
    let (_, bank) = require_staff(&state, &session).await?;

    let bank_row: Option<BloodBank> = state.sdb.select(bank.clone()).await?;
    let hospital = bank_row.map(|b| b.name).ok_or(Error::NotFound)?;

    let need: Option<BloodNeed> = state
        .sdb
        .create(BLOOD_NEED_TABLE)
        .content(CreateBloodNeed {
            blood_bank_id: bank,
            blood_type: input.blood_type,
            units: input.units,
            location: input.location,
            hospital,
            expire_date: input.expire_date,
            expire_time: input.expire_time,
            created_at: Utc::now(),
        })
        .await?;
    let need = need.ok_or(Error::Internal)?;

    Ok((StatusCode::CREATED, Json(need)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn age_counts_completed_years_only() {
        let dob: NaiveDate = "2000-06-15".parse().unwrap();
        assert_eq!(age_on(dob, "2026-06-14".parse().unwrap()), 25);
        assert_eq!(age_on(dob, "2026-06-15".parse().unwrap()), 26);
    }
}
