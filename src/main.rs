use tracing::info;
use tracing_subscriber::FmtSubscriber;

use crate::{
    config::Config,
    consts::tables::USER_TABLE,
    errors::Result,
    models::user::{CreatePrincipal, Principal, RoleProfile},
    routes::app_router,
    state::AppState,
    workflow::directory,
};

pub mod config;
pub mod consts;
pub mod errors;
pub mod mailer;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod state;
pub mod utils;
pub mod workflow;

#[tokio::main]
async fn main() -> Result<()> {
    tracing::subscriber::set_global_default(FmtSubscriber::default())
        .map_err(|_| errors::Error::Internal)?;

    let config = Config::load();
    let port = config.port;
    let state = AppState::init(config).await?;

    bootstrap_admin(&state).await?;

    info!("Starting server");

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}")).await?;
    info!("Serving at http://{}", listener.local_addr()?);
    axum::serve(listener, app_router(state)).await?;

    Ok(())
}

/// Seed the administrator account from the environment when it does not
/// exist yet. Without it nobody can review registration requests.
async fn bootstrap_admin(state: &AppState) -> Result<()> {
    let (Some(email), Some(password)) = (
        state.config.admin_email.clone(),
        state.config.admin_password.clone(),
    ) else {
        return Ok(());
    };

    if directory::find_by_email(&state.sdb, &email).await?.is_some() {
        return Ok(());
    }

    let password_hash = utils::pwd::hash(password.as_bytes())?;
    let _: Option<Principal> = state
        .sdb
        .create(USER_TABLE)
        .content(CreatePrincipal {
            username: Some("admin".to_string()),
            email,
            password_hash,
            phone_number: None,
            gender: None,
            profile_image: None,
            date_of_birth: None,
            profile: RoleProfile::Admin,
        })
        .await?;
    info!("Administrator account created");
    Ok(())
}
