use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::consts::tables::REVOKED_TOKEN_TABLE;
use crate::errors::{Error, Result as RResult};
use crate::models::revoked::RevokedToken;
use crate::state::AppState;
use crate::utils::jwt::decode_jwt;

/// Authenticated request identity, inserted as a request extension.
#[derive(Debug, Clone)]
pub struct Session {
    pub principal_id: String,
    pub jti: String,
}

pub async fn auth_jwt_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<impl IntoResponse, Response> {
    let (mut parts, body) = request.into_parts();
    let session = check_auth_parts(&state, &parts)
        .await
        .map_err(IntoResponse::into_response)?;

    parts.extensions.insert(session);

    Ok(next.run(Request::from_parts(parts, body)).await)
}

async fn check_auth_parts(state: &AppState, parts: &Parts) -> RResult<Session> {
    let header_value = parts
        .headers
        .get(AUTHORIZATION)
        .ok_or(Error::MissingToken)?
        .to_str()
        .map_err(|_| Error::InvalidToken)?;

    let mut pieces = header_value.trim().splitn(2, ' ');

    let scheme = pieces.next().ok_or(Error::MissingToken)?;
    let token = pieces.next().ok_or(Error::MissingToken)?;

    if scheme != "Bearer" {
        tracing::warn!("Invalid auth scheme: {scheme}");
        return Err(Error::InvalidScheme);
    }

    let data = decode_jwt(token, &state.config.jwt_secret)?;

    let revoked: Vec<RevokedToken> = state
        .sdb
        .query("SELECT * FROM type::table($table) WHERE jti = $jti;")
        .bind(("table", REVOKED_TOKEN_TABLE))
        .bind(("jti", data.claims.jti.clone()))
        .await?
        .take(0)?;
    if !revoked.is_empty() {
        return Err(Error::TokenRevoked);
    }

    Ok(Session {
        principal_id: data.claims.sub,
        jti: data.claims.jti,
    })
}
