use std::{sync::Arc, time::Duration as StdDuration};

use axum::{
    Extension, Json, Router,
    extract::State,
    http::StatusCode,
    middleware,
    routing::{get, post, put},
};
use chrono::{Duration, NaiveDate, Utc};
use serde::Serialize;
use tower_governor::{GovernorLayer, governor::GovernorConfigBuilder, key_extractor::SmartIpKeyExtractor};
use validator::Validate;

use crate::{
    consts::{
        policy::DASHBOARD_WINDOW_DAYS,
        tables::{
            BLOOD_NEED_TABLE, DONATION_TABLE, EMAIL_VERIFICATION_TABLE, EVENT_TABLE,
            REVOKED_TOKEN_TABLE,
        },
    },
    errors::{Error, Result},
    middleware::{Session, auth_jwt_middleware},
    models::{
        revoked::{CreateRevokedToken, RevokedToken},
        user::{Principal, RoleProfile},
        verification::{CreateEmailVerification, EmailVerification},
    },
    routes::MsgResponse,
    state::AppState,
    utils::{
        jwt::{Claims, encode_jwt},
        pwd,
        validated_form::ValidatedJson,
        validator::validate_password,
        verification::{generate_verification_code, hash_code},
    },
    workflow::directory,
};

pub fn router(config: AppState) -> Router<AppState> {
    let governor_conf = Arc::new(
        GovernorConfigBuilder::default()
            .per_second(3600)
            .burst_size(3)
            .key_extractor(SmartIpKeyExtractor)
            .finish()
            .expect("governor configuration is static"),
    );
    let governor_limiter = governor_conf.limiter().clone();
    let interval = StdDuration::from_secs(60);
    // a separate background task to clean up
    std::thread::spawn(move || {
        loop {
            std::thread::sleep(interval);
            tracing::info!("rate limiting storage size: {}", governor_limiter.len());
            governor_limiter.retain_recent();
        }
    });

    let unprotected = |config: AppState| -> Router<AppState> {
        Router::new()
            .route("/login", post(login))
            .route(
                "/send-verification-code",
                post(send_verification_code).layer(GovernorLayer {
                    config: governor_conf,
                }),
            )
            .route("/verify-code", post(verify_code))
            .route("/update-password", post(update_password))
            .with_state(config)
    };
    let protected = |config: AppState| -> Router<AppState> {
        Router::new()
            .route("/logout", post(logout))
            .route("/profile", get(get_profile).put(update_profile))
            .route("/change-password", put(change_password))
            .route("/dashboard", get(dashboard))
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

#[derive(Debug, Clone, serde::Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email)]
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginResponse {
    access_token: String,
    user_type: &'static str,
    user_name: String,
}

pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(input): ValidatedJson<LoginRequest>,
) -> Result<Json<LoginResponse>> {
    let principal = directory::find_by_email(&state.sdb, &input.email)
        .await?
        .ok_or(Error::InvalidLoginDetails)?;

    if !pwd::validate(input.password.as_bytes(), &principal.password_hash)? {
        return Err(Error::InvalidLoginDetails);
    }

    let claims = Claims::new(principal.id.to_string());
    let access_token = encode_jwt(&claims, &state.config.jwt_secret)?;

    Ok(Json(LoginResponse {
        access_token,
        user_type: principal.role().as_str(),
        user_name: principal.username.clone().unwrap_or_default(),
    }))
}

pub async fn logout(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> Result<(StatusCode, Json<MsgResponse>)> {
    let revoked: Vec<RevokedToken> = state
        .sdb
        .query("SELECT * FROM type::table($table) WHERE jti = $jti;")
        .bind(("table", REVOKED_TOKEN_TABLE))
        .bind(("jti", session.jti.clone()))
        .await?
        .take(0)?;
    if !revoked.is_empty() {
        return Err(Error::BadRequest("Token already revoked".to_string()));
    }

    let _: Option<RevokedToken> = state
        .sdb
        .create(REVOKED_TOKEN_TABLE)
        .content(CreateRevokedToken { jti: session.jti })
        .await?;

    Ok((
        StatusCode::OK,
        Json(MsgResponse::new("Successfully logged out")),
    ))
}

#[derive(Debug, Clone, serde::Deserialize, Validate)]
pub struct SendVerificationCodeRequest {
    #[validate(email)]
    pub email: String,
    #[serde(default)]
    pub new_account: bool,
}

pub async fn send_verification_code(
    State(state): State<AppState>,
    ValidatedJson(input): ValidatedJson<SendVerificationCodeRequest>,
) -> Result<(StatusCode, Json<MsgResponse>)> {
    let existing = directory::find_by_email(&state.sdb, &input.email).await?;
    if input.new_account && existing.is_some() {
        return Err(Error::EmailExist(input.email));
    }
    if !input.new_account && existing.is_none() {
        return Err(Error::NotFound);
    }

    let (code, code_hash) = generate_verification_code();
    let _: Option<EmailVerification> = state
        .sdb
        .create(EMAIL_VERIFICATION_TABLE)
        .content(CreateEmailVerification {
            email: input.email.clone(),
            code_hash,
            created_at: Utc::now(),
        })
        .await?;

    state
        .mailer
        .send(
            "Your Verification Code",
            &[input.email],
            &format!("Your verification code is: {code}"),
        )
        .await?;

    Ok((
        StatusCode::OK,
        Json(MsgResponse::new("Verification code sent successfully")),
    ))
}

#[derive(Debug, Clone, serde::Deserialize, Validate)]
pub struct VerifyCodeRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(equal = 5))]
    pub code: String,
}

pub async fn verify_code(
    State(state): State<AppState>,
    ValidatedJson(input): ValidatedJson<VerifyCodeRequest>,
) -> Result<(StatusCode, Json<MsgResponse>)> {
    let found: Vec<EmailVerification> = state
        .sdb
        .query("SELECT * FROM type::table($table) WHERE email = $email AND code_hash = $code_hash;")
        .bind(("table", EMAIL_VERIFICATION_TABLE))
        .bind(("email", input.email.clone()))
        .bind(("code_hash", hash_code(&input.code)))
        .await?
        .take(0)?;

    let Some(verification) = found.into_iter().next() else {
        return Err(Error::BadRequest("Invalid or expired code".to_string()));
    };

    let _: Option<EmailVerification> = state.sdb.delete(verification.id).await?;

    Ok((
        StatusCode::OK,
        Json(MsgResponse::new("Verification successful")),
    ))
}

#[derive(Debug, Clone, serde::Deserialize, Validate)]
pub struct UpdatePasswordRequest {
    #[validate(email)]
    pub email: String,
    #[validate(custom(function = "validate_password"))]
    pub new_password: String,
}

/// Final step of the code-verified reset flow.
pub async fn update_password(
    State(state): State<AppState>,
    ValidatedJson(input): ValidatedJson<UpdatePasswordRequest>,
) -> Result<(StatusCode, Json<MsgResponse>)> {
    let principal = directory::find_by_email(&state.sdb, &input.email)
        .await?
        .ok_or(Error::NotFound)?;

    let password_hash = pwd::hash(input.new_password.as_bytes())?;
    let _: Vec<Principal> = state
        .sdb
        .query("UPDATE $principal SET password_hash = $password_hash;")
        .bind(("principal", principal.id))
        .bind(("password_hash", password_hash))
        .await?
        .take(0)?;

    Ok((
        StatusCode::OK,
        Json(MsgResponse::new("Password updated successfully")),
    ))
}

#[derive(Debug, Clone, Serialize)]
pub struct ProfileResponse {
    id: String,
    username: Option<String>,
    email: String,
    phone_number: Option<String>,
    gender: Option<String>,
    profile_image: Option<String>,
    date_of_birth: Option<NaiveDate>,
    user_type: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    weight: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    id_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    blood_group: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    ranking_points: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    blood_bank_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    title: Option<String>,
}

impl From<Principal> for ProfileResponse {
    fn from(principal: Principal) -> Self {
        let user_type = principal.role().as_str();
        let mut profile = ProfileResponse {
            id: principal.id.to_string(),
            username: principal.username,
            email: principal.email,
            phone_number: principal.phone_number,
            gender: principal.gender,
            profile_image: principal.profile_image,
            date_of_birth: principal.date_of_birth,
            user_type,
            weight: None,
            id_number: None,
            blood_group: None,
            ranking_points: None,
            blood_bank_id: None,
            title: None,
        };
        match principal.profile {
            RoleProfile::Donor {
                weight,
                id_number,
                blood_group,
                ranking_points,
            } => {
                profile.weight = Some(weight);
                profile.id_number = Some(id_number);
                profile.blood_group = Some(blood_group);
                profile.ranking_points = Some(ranking_points);
            }
            RoleProfile::Admin => {}
            RoleProfile::Manager { blood_bank_id } => {
                profile.blood_bank_id = Some(blood_bank_id.to_string());
            }
            RoleProfile::Staff {
                blood_bank_id,
                title,
            } => {
                profile.blood_bank_id = Some(blood_bank_id.to_string());
                profile.title = Some(title);
            }
        }
        profile
    }
}

pub async fn get_profile(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> Result<Json<ProfileResponse>> {
    let principal = directory::resolve(&state.sdb, &session.principal_id).await?;
    Ok(Json(principal.into()))
}

#[derive(Debug, Clone, serde::Deserialize, Validate)]
pub struct UpdateProfileRequest {
    pub username: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    pub phone_number: Option<String>,
    pub gender: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
struct ProfilePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    phone_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    gender: Option<String>,
}

pub async fn update_profile(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    ValidatedJson(input): ValidatedJson<UpdateProfileRequest>,
) -> Result<(StatusCode, Json<MsgResponse>)> {
    let principal = directory::resolve(&state.sdb, &session.principal_id).await?;

    if let Some(email) = &input.email {
        directory::ensure_email_free(&state.sdb, email).await?;
    }

    let _: Option<Principal> = state
        .sdb
        .update(principal.id)
        .merge(ProfilePatch {
            username: input.username,
            email: input.email,
            phone_number: input.phone_number,
            gender: input.gender,
        })
        .await?;

    Ok((
        StatusCode::OK,
        Json(MsgResponse::new("Profile updated successfully")),
    ))
}

#[derive(Debug, Clone, serde::Deserialize, Validate)]
pub struct ChangePasswordRequest {
    pub old_password: String,
    #[validate(custom(function = "validate_password"))]
    pub new_password: String,
}

pub async fn change_password(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    ValidatedJson(input): ValidatedJson<ChangePasswordRequest>,
) -> Result<(StatusCode, Json<MsgResponse>)> {
    let principal = directory::resolve(&state.sdb, &session.principal_id).await?;

    if !pwd::validate(input.old_password.as_bytes(), &principal.password_hash)? {
        return Err(Error::BadRequest("Old password is incorrect".to_string()));
    }

    let password_hash = pwd::hash(input.new_password.as_bytes())?;
    let _: Vec<Principal> = state
        .sdb
        .query("UPDATE $principal SET password_hash = $password_hash;")
        .bind(("principal", principal.id))
        .bind(("password_hash", password_hash))
        .await?
        .take(0)?;

    Ok((
        StatusCode::OK,
        Json(MsgResponse::new("Password updated successfully")),
    ))
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardResponse {
    donations_count: i64,
    events_count: i64,
    blood_needs_count: i64,
}

#[derive(Debug, serde::Deserialize)]
struct CountRow {
    count: i64,
}

async fn count_since<T: Serialize + Send + Sync + 'static>(
    state: &AppState,
    table: &'static str,
    field: &'static str,
    since: T,
    blood_bank_id: Option<surrealdb::RecordId>,
) -> Result<i64> {
    let mut query = match &blood_bank_id {
        Some(_) => state.sdb.query(format!(
            "SELECT count() AS count FROM type::table($table) WHERE blood_bank_id = $blood_bank_id AND {field} >= $since GROUP ALL;"
        )),
        None => state.sdb.query(format!(
            "SELECT count() AS count FROM type::table($table) WHERE {field} >= $since GROUP ALL;"
        )),
    };
    query = query.bind(("table", table)).bind(("since", since));
    if let Some(bank) = blood_bank_id {
        query = query.bind(("blood_bank_id", bank));
    }
    let rows: Vec<CountRow> = query.await?.take(0)?;
    Ok(rows.into_iter().next().map(|r| r.count).unwrap_or(0))
}

/// Activity counters for the last 30 days. Bank-scoped for managers and
/// staff, global for admins; donors have no dashboard.
pub async fn dashboard(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> Result<Json<DashboardResponse>> {
    let principal = directory::resolve(&state.sdb, &session.principal_id).await?;

    let bank = match &principal.profile {
        RoleProfile::Donor { .. } => return Err(Error::Unauthorized),
        RoleProfile::Admin => None,
        RoleProfile::Manager { blood_bank_id } => Some(blood_bank_id.clone()),
        RoleProfile::Staff { blood_bank_id, .. } => Some(blood_bank_id.clone()),
    };

    let since_date = (Utc::now() - Duration::days(DASHBOARD_WINDOW_DAYS)).date_naive();
    let since_stamp = Utc::now() - Duration::days(DASHBOARD_WINDOW_DAYS);

    let donations_count = count_since(
        &state,
        DONATION_TABLE,
        "donation_date",
        since_date,
        bank.clone(),
    )
    .await?;
    let events_count =
        count_since(&state, EVENT_TABLE, "event_date", since_date, bank.clone()).await?;
    let blood_needs_count =
        count_since(&state, BLOOD_NEED_TABLE, "created_at", since_stamp, bank).await?;

    Ok(Json(DashboardResponse {
        donations_count,
        events_count,
        blood_needs_count,
    }))
}
