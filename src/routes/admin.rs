use axum::{
    Extension, Json, Router,
    extract::{Path, State},
    http::StatusCode,
    middleware,
    routing::{get, post},
};
use serde::Deserialize;
use surrealdb::RecordId;
use validator::Validate;

use crate::{
    consts::tables::{BLOOD_BANK_TABLE, FAQ_TABLE, REGISTRATION_REQUEST_TABLE, USER_TABLE},
    errors::{Error, Result},
    middleware::{Session, auth_jwt_middleware},
    models::{
        blood_bank::{BloodBank, CreateBloodBank},
        faq::{CreateFaq, Faq},
        registration::{RegistrationRequest, RequestStatus},
        user::{CreatePrincipal, Principal, Role, RoleProfile},
    },
    routes::MsgResponse,
    state::AppState,
    utils::{pwd, validated_form::ValidatedJson, verification::generate_numeric_password},
    workflow::directory,
};

pub fn router(config: AppState) -> Router<AppState> {
    Router::new()
        .route("/registration-requests", get(pending_registration_requests))
        .route(
            "/registration-requests/{key}/review",
            post(review_registration_request),
        )
        .route("/faqs", post(create_faq))
        .route("/faqs/{key}", axum::routing::delete(delete_faq))
        .layer(middleware::from_fn_with_state(
            config.clone(),
            auth_jwt_middleware,
        ))
        .with_state(config)
}

pub async fn pending_registration_requests(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> Result<Json<Vec<RegistrationRequest>>> {
    directory::require(&state.sdb, &session.principal_id, Role::Admin).await?;

    let requests: Vec<RegistrationRequest> = state
        .sdb
        .query("SELECT * FROM type::table($table) WHERE request_status = $status;")
        .bind(("table", REGISTRATION_REQUEST_TABLE))
        .bind(("status", RequestStatus::Pending))
        .await?
        .take(0)?;
    Ok(Json(requests))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum ReviewAction {
    Accept,
    Reject,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReviewRequest {
    pub action: ReviewAction,
}

/// Accepting a request creates the blood bank and its manager account
/// in one pass and mails the generated password. Rejection only flips
/// the status and notifies the applicant.
pub async fn review_registration_request(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(key): Path<String>,
    Json(input): Json<ReviewRequest>,
) -> Result<(StatusCode, Json<MsgResponse>)> {
    directory::require(&state.sdb, &session.principal_id, Role::Admin).await?;

    let id = RecordId::from_table_key(REGISTRATION_REQUEST_TABLE, &key);
    let request: Option<RegistrationRequest> = state.sdb.select(id.clone()).await?;
    let request = request.ok_or(Error::NotFound)?;
    if request.request_status != RequestStatus::Pending {
        return Err(Error::BadRequest(
            "Registration request already reviewed".to_string(),
        ));
    }

    match input.action {
        ReviewAction::Accept => {
            directory::ensure_email_free(&state.sdb, &request.manager_email).await?;

            let password = generate_numeric_password();
            state
                .mailer
                .send(
                    "Registration Approved",
                    &[request.manager_email.clone()],
                    &format!(
                        "Your registration for {} has been approved.\nEmail: {}\nPassword: {password}",
                        request.organization_name, request.manager_email
                    ),
                )
                .await?;

            let bank: Option<BloodBank> = state
                .sdb
                .create(BLOOD_BANK_TABLE)
                .content(CreateBloodBank {
                    name: request.organization_name.clone(),
                    latitude: request.latitude,
                    longitude: request.longitude,
                    phone_number: request.contact_info.clone(),
                    email: request.manager_email.clone(),
                    start_hour: request.start_hour.clone(),
                    close_hour: request.close_hour.clone(),
                })
                .await?;
            let bank = bank.ok_or(Error::Internal)?;

            let password_hash = pwd::hash(password.as_bytes())?;
            let _: Option<Principal> = state
                .sdb
                .create(USER_TABLE)
                .content(CreatePrincipal {
                    username: Some(request.manager_name.clone()),
                    email: request.manager_email.clone(),
                    password_hash,
                    phone_number: Some(request.contact_info.clone()),
                    gender: None,
                    profile_image: None,
                    date_of_birth: None,
                    profile: RoleProfile::Manager {
                        blood_bank_id: bank.id,
                    },
                })
                .await?;

            set_request_status(&state, &id, RequestStatus::Approved).await?;
            Ok((
                StatusCode::OK,
                Json(MsgResponse::new("Registration request approved")),
            ))
        }
        ReviewAction::Reject => {
            state
                .mailer
                .send(
                    "Registration Rejected",
                    &[request.manager_email.clone()],
                    &format!(
                        "Your registration for {} has been rejected.",
                        request.organization_name
                    ),
                )
                .await?;

            set_request_status(&state, &id, RequestStatus::Rejected).await?;
            Ok((
                StatusCode::OK,
                Json(MsgResponse::new("Registration request rejected")),
            ))
        }
    }
}

async fn set_request_status(
    state: &AppState,
    id: &RecordId,
    status: RequestStatus,
) -> Result<()> {
    let _: Vec<RegistrationRequest> = state
        .sdb
        .query("UPDATE $request SET request_status = $status;")
        .bind(("request", id.clone()))
        .bind(("status", status))
        .await?
        .take(0)?;
    Ok(())
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateFaqRequest {
    #[validate(length(min = 1, max = 500))]
    pub question: String,
    #[validate(length(min = 1, max = 1000))]
    pub answer: String,
}

pub async fn create_faq(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    ValidatedJson(input): ValidatedJson<CreateFaqRequest>,
) -> Result<(StatusCode, Json<Faq>)> {
    let admin = directory::require(&state.sdb, &session.principal_id, Role::Admin).await?;

    let faq: Option<Faq> = state
        .sdb
        .create(FAQ_TABLE)
        .content(CreateFaq {
            question: input.question,
            answer: input.answer,
            created_by: admin.id,
        })
        .await?;
    let faq = faq.ok_or(Error::Internal)?;

    Ok((StatusCode::CREATED, Json(faq)))
}

pub async fn delete_faq(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(key): Path<String>,
) -> Result<(StatusCode, Json<MsgResponse>)> {
    directory::require(&state.sdb, &session.principal_id, Role::Admin).await?;

    let id = RecordId::from_table_key(FAQ_TABLE, &key);
    let faq: Option<Faq> = state.sdb.select(id.clone()).await?;
    if faq.is_none() {
        return Err(Error::NotFound);
    }
    let _: Option<Faq> = state.sdb.delete(id).await?;

    Ok((StatusCode::OK, Json(MsgResponse::new("FAQ deleted"))))
}
