use actix_web::{http::header, http::StatusCode, HttpResponse, ResponseError};
use sqlx::migrate::MigrateError;
use sqlx::Error as SqlxError;
use thiserror::Error;

use crate::{backend::BackendError, config::ConfigError};

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] SqlxError),

    #[error("Migration error: {0}")]
    MigrationError(#[from] MigrateError),

    #[error("Template error: {0}")]
    TemplateError(#[from] tera::Error),

    #[error("Backend error: {0}")]
    BackendError(#[from] BackendError),

    #[error("Configuration error: {0}")]
    ConfigError(#[from] ConfigError),

    #[error("Password error: {0}")]
    PasswordError(String),

    #[error("Identity error: {0}")]
    IdentityError(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Conflict(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Not found")]
    NotFound,

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Unauthorized => StatusCode::SEE_OTHER,
            AppError::NotFound | AppError::BackendError(BackendError::NotFound(_)) => {
                StatusCode::NOT_FOUND
            }
            AppError::BackendError(_) => StatusCode::BAD_GATEWAY,
            AppError::DatabaseError(_)
            | AppError::MigrationError(_)
            | AppError::TemplateError(_)
            | AppError::ConfigError(_)
            | AppError::PasswordError(_)
            | AppError::IdentityError(_)
            | AppError::IoError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        match self {
            // Anonymous visitors are sent to the login form.
            AppError::Unauthorized => HttpResponse::SeeOther()
                .insert_header((header::LOCATION, "/login"))
                .finish(),
            AppError::BadRequest(_) | AppError::Conflict(_) => {
                HttpResponse::build(status).body(self.to_string())
            }
            AppError::NotFound | AppError::BackendError(BackendError::NotFound(_)) => {
                HttpResponse::NotFound().body("Not found")
            }
            AppError::BackendError(_) => {
                log::error!("{}", self);
                HttpResponse::BadGateway().body("The marketplace backend is unavailable")
            }
            _ => {
                log::error!("{}", self);
                HttpResponse::InternalServerError().body("Internal server error")
            }
        }
    }
}

impl From<AppError> for std::io::Error {
    fn from(err: AppError) -> Self {
        std::io::Error::other(err.to_string())
    }
}
