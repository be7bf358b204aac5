use std::collections::HashMap;

use axum::{
    Extension, Json, Router,
    extract::{Path, State},
    http::StatusCode,
    middleware,
    routing::{delete, get, post},
};
use chrono::{Duration, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;
use validator::Validate;

use crate::{
    consts::{
        policy::DONATION_INTERVAL_DAYS,
        tables::{
            APPOINTMENT_TABLE, BLOOD_BANK_TABLE, BLOOD_NEED_TABLE, DISEASE_TABLE, DONATION_TABLE,
            DONOR_DISEASE_TABLE, EVENT_TABLE, FAQ_TABLE, FOLLOW_TABLE, USER_TABLE,
            VOLUNTEERING_TABLE,
        },
    },
    errors::{Error, Result},
    middleware::{Session, auth_jwt_middleware},
    models::{
        appointment::{Appointment, AppointmentStatus, CreateAppointment},
        blood_bank::{BankFollow, BloodBank, CreateBankFollow},
        blood_need::BloodNeed,
        disease::{CreateDisease, CreateDonorDisease, Disease, DonorDisease},
        donation::BloodDonation,
        event::Event,
        faq::Faq,
        user::{CreatePrincipal, Principal, Role, RoleProfile},
        volunteering::{CreateVolunteering, Volunteering},
    },
    routes::MsgResponse,
    state::AppState,
    utils::{
        pwd,
        validated_form::ValidatedJson,
        validator::{validate_blood_group, validate_password},
    },
    workflow::directory,
};

pub fn router(config: AppState) -> Router<AppState> {
    let unprotected = |config: AppState| -> Router<AppState> {
        Router::new()
            .route("/register", post(register))
            .with_state(config)
    };
    let protected = |config: AppState| -> Router<AppState> {
        Router::new()
            .route("/blood-banks", get(list_blood_banks))
            .route("/blood-banks/{key}/follow", post(follow_bank))
            .route("/blood-banks/{key}/follow", delete(unfollow_bank))
            .route("/followed-banks", get(followed_banks))
            .route("/appointments", post(create_appointment))
            .route(
                "/appointments/pending",
                get(pending_appointment).delete(cancel_pending_appointment),
            )
            .route("/events", get(upcoming_events))
            .route("/blood-needs", get(matching_blood_needs))
            .route("/donations", get(donation_history))
            .route("/volunteering/toggle", post(toggle_volunteering))
            .route("/volunteering/status", get(volunteering_status))
            .route("/faqs", get(list_faqs))
            .layer(middleware::from_fn_with_state(
                config.clone(),
                auth_jwt_middleware,
            ))
            .with_state(config)
    };
    Router::new()
        .merge(unprotected(config.clone()))
        .merge(protected(config.clone()))
        .with_state(config)
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RegisterDonorRequest {
    #[validate(length(min = 1, max = 200))]
    pub username: String,
    #[validate(email)]
    pub email: String,
    #[validate(custom(function = "validate_password"))]
    pub password: String,
    pub phone_number: Option<String>,
    pub gender: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    #[validate(range(min = 30.0, max = 400.0))]
    pub weight: f64,
    #[validate(length(min = 1, max = 50))]
    pub id_number: String,
    #[validate(custom(function = "validate_blood_group"))]
    pub blood_group: String,
}

pub async fn register(
    State(state): State<AppState>,
    ValidatedJson(input): ValidatedJson<RegisterDonorRequest>,
) -> Result<(StatusCode, Json<MsgResponse>)> {
    directory::ensure_email_free(&state.sdb, &input.email).await?;

    let password_hash = pwd::hash(input.password.as_bytes())?;
    let _: Option<Principal> = state
        .sdb
        .create(USER_TABLE)
        .content(CreatePrincipal {
            username: Some(input.username),
            email: input.email,
            password_hash,
            phone_number: input.phone_number,
            gender: input.gender,
            profile_image: None,
            date_of_birth: input.date_of_birth,
            profile: RoleProfile::Donor {
                weight: input.weight,
                id_number: input.id_number,
                blood_group: input.blood_group,
                ranking_points: 0,
            },
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(MsgResponse::new("Account created successfully")),
    ))
}

pub async fn list_blood_banks(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> Result<Json<Vec<BloodBank>>> {
    directory::require(&state.sdb, &session.principal_id, Role::Donor).await?;
    let banks: Vec<BloodBank> = state.sdb.select(BLOOD_BANK_TABLE).await?;
    Ok(Json(banks))
}

async fn find_follow(
    state: &AppState,
    donor_id: &RecordId,
    blood_bank_id: &RecordId,
) -> Result<Option<BankFollow>> {
    let found: Vec<BankFollow> = state
        .sdb
        .query("SELECT * FROM type::table($table) WHERE donor_id = $donor_id AND blood_bank_id = $blood_bank_id;")
        .bind(("table", FOLLOW_TABLE))
        .bind(("donor_id", donor_id.clone()))
        .bind(("blood_bank_id", blood_bank_id.clone()))
        .await?
        .take(0)?;
    Ok(found.into_iter().next())
}

pub async fn follow_bank(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(key): Path<String>,
) -> Result<(StatusCode, Json<MsgResponse>)> {
    let donor = directory::require(&state.sdb, &session.principal_id, Role::Donor).await?;

    let bank_id = RecordId::from_table_key(BLOOD_BANK_TABLE, &key);
    let bank: Option<BloodBank> = state.sdb.select(bank_id.clone()).await?;
    if bank.is_none() {
        return Err(Error::NotFound);
    }

    if find_follow(&state, &donor.id, &bank_id).await?.is_some() {
        return Err(Error::BadRequest(
            "Already following this blood bank".to_string(),
        ));
    }

    let _: Option<BankFollow> = state
        .sdb
        .create(FOLLOW_TABLE)
        .content(CreateBankFollow {
            donor_id: donor.id,
            blood_bank_id: bank_id,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(MsgResponse::new("Blood bank followed")),
    ))
}

pub async fn unfollow_bank(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(key): Path<String>,
) -> Result<(StatusCode, Json<MsgResponse>)> {
    let donor = directory::require(&state.sdb, &session.principal_id, Role::Donor).await?;

    let bank_id = RecordId::from_table_key(BLOOD_BANK_TABLE, &key);
    let follow = find_follow(&state, &donor.id, &bank_id)
        .await?
        .ok_or_else(|| Error::BadRequest("Not following this blood bank".to_string()))?;

    let _: Option<BankFollow> = state.sdb.delete(follow.id).await?;

    Ok((
        StatusCode::OK,
        Json(MsgResponse::new("Blood bank unfollowed")),
    ))
}

async fn followed_bank_ids(state: &AppState, donor_id: &RecordId) -> Result<Vec<RecordId>> {
    let follows: Vec<BankFollow> = state
        .sdb
        .query("SELECT * FROM type::table($table) WHERE donor_id = $donor_id;")
        .bind(("table", FOLLOW_TABLE))
        .bind(("donor_id", donor_id.clone()))
        .await?
        .take(0)?;
    Ok(follows.into_iter().map(|f| f.blood_bank_id).collect())
}

async fn banks_by_id(state: &AppState, ids: Vec<RecordId>) -> Result<HashMap<String, BloodBank>> {
    if ids.is_empty() {
        return Ok(HashMap::new());
    }
    let banks: Vec<BloodBank> = state
        .sdb
        .query("SELECT * FROM type::table($table) WHERE id IN $ids;")
        .bind(("table", BLOOD_BANK_TABLE))
        .bind(("ids", ids))
        .await?
        .take(0)?;
    Ok(banks.into_iter().map(|b| (b.id.to_string(), b)).collect())
}

pub async fn followed_banks(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> Result<Json<Vec<BloodBank>>> {
    let donor = directory::require(&state.sdb, &session.principal_id, Role::Donor).await?;
    let ids = followed_bank_ids(&state, &donor.id).await?;
    let banks = banks_by_id(&state, ids).await?;
    Ok(Json(banks.into_values().collect()))
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateAppointmentRequest {
    pub blood_bank_id: String,
    pub appointment_date: NaiveDate,
    pub appointment_time: NaiveTime,
    #[validate(length(min = 1, max = 100))]
    pub donation_type: String,
    #[serde(default)]
    pub diseases: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AppointmentResponse {
    #[serde(flatten)]
    pub appointment: Appointment,
    pub associated_diseases: Vec<String>,
}

async fn find_pending(state: &AppState, donor_id: &RecordId) -> Result<Vec<Appointment>> {
    let pending: Vec<Appointment> = state
        .sdb
        .query("SELECT * FROM type::table($table) WHERE donor_id = $donor_id AND status = $status;")
        .bind(("table", APPOINTMENT_TABLE))
        .bind(("donor_id", donor_id.clone()))
        .bind(("status", AppointmentStatus::Pending))
        .await?
        .take(0)?;
    Ok(pending)
}

pub async fn create_appointment(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    ValidatedJson(input): ValidatedJson<CreateAppointmentRequest>,
) -> Result<(StatusCode, Json<AppointmentResponse>)> {
    let donor = directory::require(&state.sdb, &session.principal_id, Role::Donor).await?;

    if !find_pending(&state, &donor.id).await?.is_empty() {
        return Err(Error::PendingAppointmentExists);
    }

    let bank_id = RecordId::from_table_key(BLOOD_BANK_TABLE, &input.blood_bank_id);
    let bank: Option<BloodBank> = state.sdb.select(bank_id.clone()).await?;
    if bank.is_none() {
        return Err(Error::NotFound);
    }

    let appointment: Option<Appointment> = state
        .sdb
        .create(APPOINTMENT_TABLE)
        .content(CreateAppointment {
            donor_id: donor.id.clone(),
            blood_bank_id: bank_id,
            appointment_date: input.appointment_date,
            appointment_time: input.appointment_time,
            status: AppointmentStatus::Pending,
            donation_type: input.donation_type,
        })
        .await?;
    let appointment = appointment.ok_or(Error::Internal)?;

    let mut associated_diseases = Vec::with_capacity(input.diseases.len());
    for name in input.diseases {
        let name = name.trim().to_string();
        if name.is_empty() {
            continue;
        }
        let disease = find_or_create_disease(&state, &name).await?;
        link_donor_disease(&state, &donor.id, &disease.id).await?;
        associated_diseases.push(disease.name);
    }

    Ok((
        StatusCode::CREATED,
        Json(AppointmentResponse {
            appointment,
            associated_diseases,
        }),
    ))
}

async fn find_or_create_disease(state: &AppState, name: &str) -> Result<Disease> {
    let found: Vec<Disease> = state
        .sdb
        .query("SELECT * FROM type::table($table) WHERE string::lowercase(name) = string::lowercase($name);")
        .bind(("table", DISEASE_TABLE))
        .bind(("name", name.to_string()))
        .await?
        .take(0)?;
    if let Some(disease) = found.into_iter().next() {
        return Ok(disease);
    }
    let created: Option<Disease> = state
        .sdb
        .create(DISEASE_TABLE)
        .content(CreateDisease {
            name: name.to_string(),
        })
        .await?;
    created.ok_or(Error::Internal)
}

async fn link_donor_disease(
    state: &AppState,
    donor_id: &RecordId,
    disease_id: &RecordId,
) -> Result<()> {
    let existing: Vec<DonorDisease> = state
        .sdb
        .query("SELECT * FROM type::table($table) WHERE donor_id = $donor_id AND disease_id = $disease_id;")
        .bind(("table", DONOR_DISEASE_TABLE))
        .bind(("donor_id", donor_id.clone()))
        .bind(("disease_id", disease_id.clone()))
        .await?
        .take(0)?;
    if existing.is_empty() {
        let _: Option<DonorDisease> = state
            .sdb
            .create(DONOR_DISEASE_TABLE)
            .content(CreateDonorDisease {
                donor_id: donor_id.clone(),
                disease_id: disease_id.clone(),
            })
            .await?;
    }
    Ok(())
}

#[derive(Debug, Clone, Serialize)]
pub struct PendingAppointmentResponse {
    #[serde(flatten)]
    pub appointment: Appointment,
    pub blood_bank_name: String,
}

/// The one appointment a donor may hold. Past-dated rows that were never
/// opened are dropped here rather than by a background job.
pub async fn pending_appointment(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> Result<Json<Option<PendingAppointmentResponse>>> {
    let donor = directory::require(&state.sdb, &session.principal_id, Role::Donor).await?;

    let today = Utc::now().date_naive();
    let mut live = None;
    for appointment in find_pending(&state, &donor.id).await? {
        if appointment.appointment_date < today {
            let _: Option<Appointment> = state.sdb.delete(appointment.id).await?;
        } else {
            live = Some(appointment);
        }
    }

    let Some(appointment) = live else {
        return Ok(Json(None));
    };
    let bank: Option<BloodBank> = state.sdb.select(appointment.blood_bank_id.clone()).await?;
    let blood_bank_name = bank.map(|b| b.name).unwrap_or_default();
    Ok(Json(Some(PendingAppointmentResponse {
        appointment,
        blood_bank_name,
    })))
}

pub async fn cancel_pending_appointment(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> Result<(StatusCode, Json<MsgResponse>)> {
    let donor = directory::require(&state.sdb, &session.principal_id, Role::Donor).await?;

    let pending = find_pending(&state, &donor.id).await?;
    if pending.is_empty() {
        return Err(Error::NotFound);
    }

    let _: Vec<DonorDisease> = state
        .sdb
        .query("DELETE FROM type::table($table) WHERE donor_id = $donor_id RETURN BEFORE;")
        .bind(("table", DONOR_DISEASE_TABLE))
        .bind(("donor_id", donor.id))
        .await?
        .take(0)?;
    for appointment in pending {
        let _: Option<Appointment> = state.sdb.delete(appointment.id).await?;
    }

    Ok((
        StatusCode::OK,
        Json(MsgResponse::new("Appointment canceled")),
    ))
}

#[derive(Debug, Clone, Serialize)]
pub struct EventResponse {
    #[serde(flatten)]
    pub event: Event,
    pub blood_bank_name: String,
}

pub async fn upcoming_events(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> Result<Json<Vec<EventResponse>>> {
    let donor = directory::require(&state.sdb, &session.principal_id, Role::Donor).await?;

    let bank_ids = followed_bank_ids(&state, &donor.id).await?;
    if bank_ids.is_empty() {
        return Ok(Json(Vec::new()));
    }

    let events: Vec<Event> = state
        .sdb
        .query("SELECT * FROM type::table($table) WHERE blood_bank_id IN $ids AND event_date >= $today ORDER BY event_date, event_time;")
        .bind(("table", EVENT_TABLE))
        .bind(("ids", bank_ids.clone()))
        .bind(("today", Utc::now().date_naive()))
        .await?
        .take(0)?;

    let banks = banks_by_id(&state, bank_ids).await?;
    let events = events
        .into_iter()
        .map(|event| {
            let blood_bank_name = banks
                .get(&event.blood_bank_id.to_string())
                .map(|b| b.name.clone())
                .unwrap_or_default();
            EventResponse {
                event,
                blood_bank_name,
            }
        })
        .collect();
    Ok(Json(events))
}

#[derive(Debug, Clone, Serialize)]
pub struct BloodNeedResponse {
    #[serde(flatten)]
    pub need: BloodNeed,
    pub blood_bank_name: String,
}

/// Active needs at followed banks that this donor's blood can serve.
/// Expired needs anywhere are purged on the way through.
pub async fn matching_blood_needs(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> Result<Json<Vec<BloodNeedResponse>>> {
    let donor = directory::require(&state.sdb, &session.principal_id, Role::Donor).await?;
    let blood_group = donor.blood_group().ok_or(Error::Unauthorized)?.to_string();

    let now = Utc::now();
    let all: Vec<BloodNeed> = state.sdb.select(BLOOD_NEED_TABLE).await?;
    let mut live = Vec::new();
    for need in all {
        if need.is_expired(now) {
            let _: Option<BloodNeed> = state.sdb.delete(need.id).await?;
        } else {
            live.push(need);
        }
    }

    let bank_ids = followed_bank_ids(&state, &donor.id).await?;
    let recipients = directory::compatible_recipients(&blood_group);
    let mut matching: Vec<BloodNeed> = live
        .into_iter()
        .filter(|need| {
            bank_ids.contains(&need.blood_bank_id)
                && recipients.contains(&need.blood_type.as_str())
        })
        .collect();
    matching.sort_by(|a, b| {
        (a.expire_date, a.expire_time).cmp(&(b.expire_date, b.expire_time))
    });

    let banks = banks_by_id(&state, bank_ids).await?;
    let needs = matching
        .into_iter()
        .map(|need| {
            let blood_bank_name = banks
                .get(&need.blood_bank_id.to_string())
                .map(|b| b.name.clone())
                .unwrap_or_default();
            BloodNeedResponse {
                need,
                blood_bank_name,
            }
        })
        .collect();
    Ok(Json(needs))
}

#[derive(Debug, Clone, Serialize)]
pub struct DonationHistoryResponse {
    pub donations: Vec<BloodDonation>,
    pub next_eligible_date: Option<NaiveDate>,
}

pub async fn donation_history(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> Result<Json<DonationHistoryResponse>> {
    let donor = directory::require(&state.sdb, &session.principal_id, Role::Donor).await?;

    let donations: Vec<BloodDonation> = state
        .sdb
        .query("SELECT * FROM type::table($table) WHERE donor_id = $donor_id ORDER BY donation_date DESC;")
        .bind(("table", DONATION_TABLE))
        .bind(("donor_id", donor.id))
        .await?
        .take(0)?;

    let next_eligible_date = donations
        .first()
        .map(|d| d.donation_date + Duration::days(DONATION_INTERVAL_DAYS));

    Ok(Json(DonationHistoryResponse {
        donations,
        next_eligible_date,
    }))
}

async fn find_volunteering(state: &AppState, donor_id: &RecordId) -> Result<Option<Volunteering>> {
    let found: Vec<Volunteering> = state
        .sdb
        .query("SELECT * FROM type::table($table) WHERE donor_id = $donor_id;")
        .bind(("table", VOLUNTEERING_TABLE))
        .bind(("donor_id", donor_id.clone()))
        .await?
        .take(0)?;
    Ok(found.into_iter().next())
}

pub async fn toggle_volunteering(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> Result<(StatusCode, Json<MsgResponse>)> {
    let donor = directory::require(&state.sdb, &session.principal_id, Role::Donor).await?;

    match find_volunteering(&state, &donor.id).await? {
        Some(existing) => {
            let _: Option<Volunteering> = state.sdb.delete(existing.id).await?;
            Ok((
                StatusCode::OK,
                Json(MsgResponse::new("Volunteering application withdrawn")),
            ))
        }
        None => {
            let _: Option<Volunteering> = state
                .sdb
                .create(VOLUNTEERING_TABLE)
                .content(CreateVolunteering {
                    donor_id: donor.id,
                    applied_at: Utc::now(),
                })
                .await?;
            Ok((
                StatusCode::CREATED,
                Json(MsgResponse::new("Volunteering application submitted")),
            ))
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct VolunteeringStatusResponse {
    pub volunteering: bool,
}

pub async fn volunteering_status(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> Result<Json<VolunteeringStatusResponse>> {
    let donor = directory::require(&state.sdb, &session.principal_id, Role::Donor).await?;
    let volunteering = find_volunteering(&state, &donor.id).await?.is_some();
    Ok(Json(VolunteeringStatusResponse { volunteering }))
}

pub async fn list_faqs(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> Result<Json<Vec<Faq>>> {
    directory::resolve(&state.sdb, &session.principal_id).await?;
    let faqs: Vec<Faq> = state.sdb.select(FAQ_TABLE).await?;
    Ok(Json(faqs))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_eligible_is_56_days_after_last_donation() {
        let last: NaiveDate = "2026-01-01".parse().unwrap();
        assert_eq!(
            last + Duration::days(DONATION_INTERVAL_DAYS),
            "2026-02-26".parse::<NaiveDate>().unwrap()
        );
    }
}
