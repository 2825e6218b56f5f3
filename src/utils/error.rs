use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use tracing::error;

use crate::engine::EngineError;
use crate::store::StoreError;
use crate::utils::response::error as error_response;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Authentication error: {0}")]
    AuthError(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Capacity exceeded: {0}")]
    CapacityExceeded(String),

    #[error("Already registered: {0}")]
    AlreadyRegistered(String),

    #[error("Already in team: {0}")]
    AlreadyInTeam(String),

    #[error("State conflict: {0}")]
    StateConflict(String),

    #[error("Storage error")]
    StorageError(#[from] StoreError),

    #[error("Internal server error")]
    InternalServerError(String),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::AuthError(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::CapacityExceeded(_)
            | AppError::AlreadyRegistered(_)
            | AppError::AlreadyInTeam(_)
            | AppError::StateConflict(_) => StatusCode::CONFLICT,
            AppError::StorageError(_) | AppError::InternalServerError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            AppError::ValidationError(_) => "VALIDATION_ERROR",
            AppError::AuthError(_) => "AUTH_ERROR",
            AppError::Forbidden(_) => "FORBIDDEN",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::CapacityExceeded(_) => "CAPACITY_EXCEEDED",
            AppError::AlreadyRegistered(_) => "ALREADY_REGISTERED",
            AppError::AlreadyInTeam(_) => "ALREADY_IN_TEAM",
            AppError::StateConflict(_) => "STATE_CONFLICT",
            AppError::StorageError(_) => "STORAGE_ERROR",
            AppError::InternalServerError(_) => "INTERNAL_SERVER_ERROR",
        }
    }

    fn log(&self) {
        match self {
            AppError::StorageError(e) => {
                error!(error = ?e, "Storage error");
            }
            AppError::InternalServerError(msg) => {
                error!(message = %msg, "Internal server error");
            }
            other => {
                tracing::debug!(code = other.code(), error = %other, "Request rejected");
            }
        }
    }
}

impl From<EngineError> for AppError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::Validation(msg) => AppError::ValidationError(msg),
            EngineError::CapacityExceeded(msg) => AppError::CapacityExceeded(msg),
            EngineError::AlreadyRegistered(msg) => AppError::AlreadyRegistered(msg),
            EngineError::AlreadyInTeam(msg) => AppError::AlreadyInTeam(msg),
            EngineError::NotFound(msg) => AppError::NotFound(msg),
            EngineError::StateConflict(msg) => AppError::StateConflict(msg),
            EngineError::InvalidCredentials => {
                AppError::AuthError("Email or password is incorrect".to_string())
            }
            EngineError::Forbidden(msg) => AppError::Forbidden(msg),
            EngineError::Internal(msg) => AppError::InternalServerError(msg),
            EngineError::Store(e) => AppError::StorageError(e),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let code = self.code();

        self.log();

        // Storage faults keep their details server-side.
        let public_message = match &self {
            AppError::StorageError(_) => "A storage error occurred".to_string(),
            AppError::ValidationError(msg)
            | AppError::AuthError(msg)
            | AppError::Forbidden(msg)
            | AppError::NotFound(msg)
            | AppError::CapacityExceeded(msg)
            | AppError::AlreadyRegistered(msg)
            | AppError::AlreadyInTeam(msg)
            | AppError::StateConflict(msg)
            | AppError::InternalServerError(msg) => msg.clone(),
        };

        error_response(code, public_message, None, status)
    }
}
