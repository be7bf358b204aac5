use axum::{
    Extension, Json, Router,
    extract::{Path, State},
    http::StatusCode,
    middleware,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;
use validator::Validate;

use crate::{
    consts::tables::{REGISTRATION_REQUEST_TABLE, USER_TABLE},
    errors::{Error, Result},
    middleware::{Session, auth_jwt_middleware},
    models::{
        blood_bank::BloodBank,
        registration::{CreateRegistrationRequest, RegistrationRequest, RequestStatus},
        user::{CreatePrincipal, Principal, Role, RoleProfile},
    },
    routes::MsgResponse,
    state::AppState,
    utils::{pwd, validated_form::ValidatedJson, verification::generate_numeric_password},
    workflow::directory,
};

pub fn router(config: AppState) -> Router<AppState> {
    let unprotected = |config: AppState| -> Router<AppState> {
        Router::new()
            .route("/registration-requests", post(submit_registration_request))
            .with_state(config)
    };
    let protected = |config: AppState| -> Router<AppState> {
        Router::new()
            .route("/staff", get(list_staff).post(create_staff))
            .route("/staff/{key}", axum::routing::delete(delete_staff))
            .route("/contact", get(get_contact).put(update_contact))
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

async fn require_manager(state: &AppState, session: &Session) -> Result<(Principal, RecordId)> {
    let manager = directory::require(&state.sdb, &session.principal_id, Role::Manager).await?;
    let bank = manager.blood_bank().cloned().ok_or(Error::Unauthorized)?;
    Ok((manager, bank))
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RegistrationRequestInput {
    #[validate(length(min = 1, max = 200))]
    pub manager_name: String,
    #[validate(email)]
    pub manager_email: String,
    #[validate(length(min = 1, max = 100))]
    pub manager_position: String,
    #[validate(length(min = 1, max = 200))]
    pub organization_name: String,
    pub latitude: f64,
    pub longitude: f64,
    #[validate(length(min = 1, max = 200))]
    pub contact_info: String,
    pub start_hour: String,
    pub close_hour: String,
}

/// Public onboarding form. The request sits Pending until an admin
/// reviews it.
pub async fn submit_registration_request(
    State(state): State<AppState>,
    ValidatedJson(input): ValidatedJson<RegistrationRequestInput>,
) -> Result<(StatusCode, Json<MsgResponse>)> {
    directory::ensure_email_free(&state.sdb, &input.manager_email).await?;

    let open: Vec<RegistrationRequest> = state
        .sdb
        .query("SELECT * FROM type::table($table) WHERE manager_email = $email AND request_status = $status;")
        .bind(("table", REGISTRATION_REQUEST_TABLE))
        .bind(("email", input.manager_email.clone()))
        .bind(("status", RequestStatus::Pending))
        .await?
        .take(0)?;
    if !open.is_empty() {
        return Err(Error::BadRequest(
            "A registration request for this email is already pending".to_string(),
        ));
    }

    let _: Option<RegistrationRequest> = state
        .sdb
        .create(REGISTRATION_REQUEST_TABLE)
        .content(CreateRegistrationRequest {
            manager_name: input.manager_name,
            manager_email: input.manager_email,
            manager_position: input.manager_position,
            organization_name: input.organization_name,
            latitude: input.latitude,
            longitude: input.longitude,
            contact_info: input.contact_info,
            start_hour: input.start_hour,
            close_hour: input.close_hour,
            request_status: RequestStatus::Pending,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(MsgResponse::new("Registration request submitted")),
    ))
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateStaffRequest {
    #[validate(length(min = 1, max = 200))]
    pub username: String,
    #[validate(email)]
    pub email: String,
    pub phone_number: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub title: String,
}

/// The new staff member's password is generated here and delivered by
/// mail; the mail goes out before the row is written so a dead SMTP
/// relay cannot strand an account nobody can log into.
pub async fn create_staff(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    ValidatedJson(input): ValidatedJson<CreateStaffRequest>,
) -> Result<(StatusCode, Json<MsgResponse>)> {
    let (_, bank) = require_manager(&state, &session).await?;
    directory::ensure_email_free(&state.sdb, &input.email).await?;

    let password = generate_numeric_password();
    state
        .mailer
        .send(
            "Your Staff Account",
            &[input.email.clone()],
            &format!(
                "An account has been created for you.\nEmail: {}\nPassword: {password}",
                input.email
            ),
        )
        .await?;

    let password_hash = pwd::hash(password.as_bytes())?;
    let _: Option<Principal> = state
        .sdb
        .create(USER_TABLE)
        .content(CreatePrincipal {
            username: Some(input.username),
            email: input.email,
            password_hash,
            phone_number: input.phone_number,
            gender: None,
            profile_image: None,
            date_of_birth: None,
            profile: RoleProfile::Staff {
                blood_bank_id: bank,
                title: input.title,
            },
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(MsgResponse::new("Staff account created")),
    ))
}

#[derive(Debug, Clone, Serialize)]
pub struct StaffMemberResponse {
    pub id: String,
    pub username: Option<String>,
    pub email: String,
    pub phone_number: Option<String>,
    pub title: String,
}

pub async fn list_staff(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> Result<Json<Vec<StaffMemberResponse>>> {
    let (_, bank) = require_manager(&state, &session).await?;

    let staff: Vec<Principal> = state
        .sdb
        .query("SELECT * FROM type::table($table) WHERE role = 'Staff' AND blood_bank_id = $blood_bank_id;")
        .bind(("table", USER_TABLE))
        .bind(("blood_bank_id", bank))
        .await?
        .take(0)?;

    let members = staff
        .into_iter()
        .filter_map(|member| match &member.profile {
            RoleProfile::Staff { title, .. } => Some(StaffMemberResponse {
                id: member.id.to_string(),
                username: member.username.clone(),
                email: member.email.clone(),
                phone_number: member.phone_number.clone(),
                title: title.clone(),
            }),
            _ => None,
        })
        .collect();
    Ok(Json(members))
}

pub async fn delete_staff(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(key): Path<String>,
) -> Result<(StatusCode, Json<MsgResponse>)> {
    let (_, bank) = require_manager(&state, &session).await?;

    let id = RecordId::from_table_key(USER_TABLE, &key);
    let member: Option<Principal> = state.sdb.select(id.clone()).await?;
    match member {
        Some(m) if m.role() == Role::Staff && m.blood_bank() == Some(&bank) => {
            let _: Option<Principal> = state.sdb.delete(id).await?;
            Ok((
                StatusCode::OK,
                Json(MsgResponse::new("Staff account deleted")),
            ))
        }
        _ => Err(Error::NotFound),
    }
}

pub async fn get_contact(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> Result<Json<BloodBank>> {
    let (_, bank) = require_manager(&state, &session).await?;
    let bank: Option<BloodBank> = state.sdb.select(bank).await?;
    Ok(Json(bank.ok_or(Error::NotFound)?))
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateContactRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub phone_number: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    pub start_hour: Option<String>,
    pub close_hour: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
struct ContactPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    latitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    longitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    phone_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    start_hour: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    close_hour: Option<String>,
}

pub async fn update_contact(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    ValidatedJson(input): ValidatedJson<UpdateContactRequest>,
) -> Result<Json<BloodBank>> {
    let (_, bank) = require_manager(&state, &session).await?;

    let updated: Option<BloodBank> = state
        .sdb
        .update(bank)
        .merge(ContactPatch {
            name: input.name,
            latitude: input.latitude,
            longitude: input.longitude,
            phone_number: input.phone_number,
            email: input.email,
            start_hour: input.start_hour,
            close_hour: input.close_hour,
        })
        .await?;

    Ok(Json(updated.ok_or(Error::NotFound)?))
}
