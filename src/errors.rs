use argon2::password_hash::Error as ArError;
use axum::{http::StatusCode, response::IntoResponse};
use jsonwebtoken::errors::Error as JWError;
use surrealdb::Error as SError;

use thiserror::Error;
use tracing::error;

pub type Result<T> = core::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Argon 2 Error: {0}")]
    Argon2Error(#[from] ArError),

    #[error("Json web token Error: {0}")]
    JwtError(#[from] JWError),

    #[error("SurrealDb Error: {0}")]
    SurrealError(#[from] SError),

    #[error("Io Error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Smtp Error: {0}")]
    SmtpError(#[from] lettre::transport::smtp::Error),

    #[error("Mail Error: {0}")]
    MailError(#[from] lettre::error::Error),

    #[error("Address Error: {0}")]
    AddressError(#[from] lettre::address::AddressError),

    #[error("Validator Error: {0}")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("Json Rejection Error: {0}")]
    AxumJsonRejection(#[from] axum::extract::rejection::JsonRejection),

    #[error("Wrong email or password")]
    InvalidLoginDetails,

    #[error("Email {0} already in use")]
    EmailExist(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("Not Found")]
    NotFound,

    #[error("Unauthorized access")]
    Unauthorized,

    #[error("Appointment cannot be {attempted}. Current status: {current}")]
    InvalidTransition {
        attempted: &'static str,
        current: String,
    },

    #[error("Insufficient units of {blood_type} available: {available}")]
    InsufficientStock { blood_type: String, available: i64 },

    #[error("Quantity must be a positive number")]
    NonPositiveQuantity,

    #[error("You already have a pending appointment")]
    PendingAppointmentExists,

    #[error("Internal Error")]
    Internal,

    // ! Auth
    #[error("Missing authorization token")]
    MissingToken,
    #[error("Invalid authorization token")]
    InvalidToken,
    #[error("Invalid authorization scheme")]
    InvalidScheme,
    #[error("Token has been revoked")]
    TokenRevoked,
}

impl IntoResponse for Error {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            Error::Argon2Error(error) => {
                error!("Argon 2 Error:{:#?}", error);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal Error".to_string(),
                )
            }
            Error::JwtError(error) => {
                error!("JWT Error:{:#?}", error);
                (
                    StatusCode::UNAUTHORIZED,
                    "Invalid authorization token".to_string(),
                )
            }
            Error::SurrealError(error) => {
                error!("Surreal Error:{:#?}", error);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal Error".to_string(),
                )
            }
            Error::IoError(error) => {
                error!("Io Error:{:#?}", error);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal Error".to_string(),
                )
            }
            Error::SmtpError(error) => {
                error!("Smtp Error:{:#?}", error);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Failed to send email".to_string(),
                )
            }
            Error::MailError(error) => {
                error!("Mail Error:{:#?}", error);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Failed to send email".to_string(),
                )
            }
            Error::AddressError(error) => {
                error!("Address Error:{:#?}", error);
                (StatusCode::BAD_REQUEST, "Invalid email address".to_string())
            }
            Error::ValidationError(error) => {
                let message = format!("Input validation error: [{}]", error).replace('\n', ", ");
                error!("Validation Error:{:#?}", error);
                (StatusCode::BAD_REQUEST, message)
            }
            Error::AxumJsonRejection(error) => {
                error!("Axum Json Rejection Error:{:#?}", error);
                (StatusCode::BAD_REQUEST, error.to_string())
            }
            Error::InvalidLoginDetails => (
                StatusCode::UNAUTHORIZED,
                "Wrong email or password".to_string(),
            ),
            Error::EmailExist(email) => (
                StatusCode::CONFLICT,
                format!("Email {} already in use", email),
            ),
            Error::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
            Error::NotFound => (StatusCode::NOT_FOUND, "Not Found".to_string()),
            Error::Unauthorized => (StatusCode::FORBIDDEN, "Unauthorized access".to_string()),
            Error::InvalidTransition { attempted, current } => (
                StatusCode::BAD_REQUEST,
                format!(
                    "Appointment cannot be {}. Current status: {}",
                    attempted, current
                ),
            ),
            Error::InsufficientStock {
                blood_type,
                available,
            } => (
                StatusCode::BAD_REQUEST,
                format!(
                    "Insufficient units of {} available: {}",
                    blood_type, available
                ),
            ),
            Error::NonPositiveQuantity => (
                StatusCode::BAD_REQUEST,
                "Quantity must be a positive number".to_string(),
            ),
            Error::PendingAppointmentExists => (
                StatusCode::BAD_REQUEST,
                "You already have a pending appointment".to_string(),
            ),
            Error::Internal => {
                error!("Internal error with no source attached");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal Error".to_string(),
                )
            }
            Error::MissingToken => (
                StatusCode::UNAUTHORIZED,
                "Missing authorization token".to_string(),
            ),
            Error::InvalidToken => (
                StatusCode::UNAUTHORIZED,
                "Invalid authorization token".to_string(),
            ),
            Error::InvalidScheme => (
                StatusCode::UNAUTHORIZED,
                "Invalid authorization scheme".to_string(),
            ),
            Error::TokenRevoked => (
                StatusCode::UNAUTHORIZED,
                "Token has been revoked".to_string(),
            ),
        };
        (status, message).into_response()
    }
}
