use axum::Router;
use serde::Serialize;

use crate::state::AppState;

pub mod admin;
pub mod auth;
pub mod donor;
pub mod manager;
pub mod staff;

/// Plain confirmation payload shared by the write endpoints.
#[derive(Debug, Clone, Serialize)]
pub struct MsgResponse {
    pub msg: String,
}

impl MsgResponse {
    pub fn new(msg: impl Into<String>) -> Self {
        Self { msg: msg.into() }
    }
}

pub fn app_router(state: AppState) -> Router {
    Router::new()
        .nest("/auth", auth::router(state.clone()))
        .nest("/donor", donor::router(state.clone()))
        .nest("/staff", staff::router(state.clone()))
        .nest("/manager", manager::router(state.clone()))
        .nest("/admin", admin::router(state.clone()))
        .with_state(state)
}
