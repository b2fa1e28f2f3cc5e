use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde_json::json;

use crate::forms::FieldErrors;
use crate::ids::IdError;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Field-level failure. `form` echoes what was submitted so it can be corrected.
    #[error("Validation failed")]
    Validation {
        errors: FieldErrors,
        form: serde_json::Value,
    },

    #[error("{0}")]
    NotFound(String),

    #[error("Invalid category")]
    InvalidCategory,

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Identifier space for {0} is exhausted")]
    IdentifierExhausted(&'static str),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Storage error: {0}")]
    Storage(#[from] std::io::Error),
}

impl AppError {
    pub fn not_found<T: Into<String>>(msg: T) -> Self {
        AppError::NotFound(msg.into())
    }

    pub fn validation<T: serde::Serialize>(errors: FieldErrors, form: &T) -> Self {
        AppError::Validation {
            errors,
            form: serde_json::to_value(form).unwrap_or(serde_json::Value::Null),
        }
    }
}

impl From<IdError> for AppError {
    fn from(err: IdError) -> Self {
        match err {
            IdError::Exhausted(prefix) => AppError::IdentifierExhausted(prefix),
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation { .. } => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) | AppError::InvalidCategory => StatusCode::NOT_FOUND,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::IdentifierExhausted(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Database(_) | AppError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        let body = match self {
            AppError::Validation { errors, form } => json!({
                "error": self.to_string(),
                "errors": errors,
                "form": form,
            }),
            AppError::Database(e) => {
                log::error!("database error: {}", e);
                json!({ "error": "Internal server error" })
            }
            AppError::Storage(e) => {
                log::error!("upload storage error: {}", e);
                json!({ "error": "Internal server error" })
            }
            AppError::IdentifierExhausted(prefix) => {
                log::error!("no free {} identifiers left", prefix);
                json!({ "error": "Temporarily unable to allocate an identifier, try again later" })
            }
            _ => json!({ "error": self.to_string() }),
        };
        HttpResponse::build(status).json(body)
    }
}
