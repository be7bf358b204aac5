use std::{env, fmt::Display, str::FromStr};

use tracing::{info, warn};

/// Runtime configuration, read once at startup from the environment.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub db_addr: String,
    pub db_user: String,
    pub db_pass: String,
    pub db_namespace: String,
    pub db_name: String,
    pub jwt_secret: String,
    pub smtp_host: String,
    pub smtp_username: String,
    pub smtp_password: String,
    pub mail_sender: String,
    pub admin_email: Option<String>,
    pub admin_password: Option<String>,
}

impl Config {
    pub fn load() -> Self {
        Self {
            port: try_load("PORT", "3587"),
            db_addr: try_load("DATABASE_ADDR", "localhost:8000"),
            db_user: try_load("DATABASE_USER", "root"),
            db_pass: try_load("DATABASE_PASS", "root"),
            db_namespace: try_load("DATABASE_NAMESPACE", "bloodline"),
            db_name: try_load("DATABASE_NAME", "bloodline"),
            jwt_secret: must_load("JWT_SECRET"),
            smtp_host: try_load("SMTP_HOST", "smtp.gmail.com"),
            smtp_username: try_load("SMTP_USERNAME", ""),
            smtp_password: try_load("SMTP_PASSWORD", ""),
            mail_sender: try_load("MAIL_SENDER", "noreply@bloodline.local"),
            admin_email: env::var("ADMIN_EMAIL").ok(),
            admin_password: env::var("ADMIN_PASSWORD").ok(),
        }
    }
}

fn try_load<T: FromStr>(key: &str, default: &str) -> T
where
    T::Err: Display,
{
    env::var(key)
        .unwrap_or_else(|_| {
            info!("{key} not set, using default: {default}");
            default.to_string()
        })
        .parse()
        .map_err(|e| {
            warn!("Invalid {key} value: {e}");
        })
        .expect("Environment misconfigured!")
}

fn must_load(key: &str) -> String {
    env::var(key)
        .map_err(|_| {
            warn!("Required environment variable {key} is not set");
        })
        .expect("Environment misconfigured!")
}
