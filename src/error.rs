// src/error.rs

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use workout_tracker_api::ErrorResponse;

use crate::auth::jwt::JwtError;
use crate::auth::password::PasswordError;
use crate::db::error::RepositoryError;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AppError {
    // === Session errors ===
    #[error("Required fields are empty")]
    RequiredFields,
    /// Unknown user and wrong password are deliberately the same error.
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("Missing refresh token")]
    MissingRefreshToken,
    /// Unknown, revoked, rotated or expired: callers cannot tell which.
    #[error("Invalid refresh token")]
    InvalidRefreshToken,
    #[error("Invalid access token")]
    InvalidToken,

    // === Registration / lookup ===
    #[error("Username already exists")]
    UsernameTaken,
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    // === Internal ===
    #[error("Configuration error: {0}")]
    Configuration(String),
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_code, message, internal_detail) = self.get_error_info();

        if let Some(ref detail) = internal_detail {
            tracing::error!(error_code, %status, detail, "Internal server error");
        }

        (status, Json(ErrorResponse::new(error_code, message))).into_response()
    }
}

impl AppError {
    /// Status, stable code, public message and (for 5xx) the detail to log.
    fn get_error_info(&self) -> (StatusCode, &'static str, String, Option<String>) {
        match self {
            // 400 Bad Request
            AppError::RequiredFields => (
                StatusCode::BAD_REQUEST,
                "REQUIRED_FIELDS",
                self.to_string(),
                None,
            ),
            AppError::InvalidInput(msg) => {
                (StatusCode::BAD_REQUEST, "INVALID_INPUT", msg.clone(), None)
            }

            // 401 Unauthorized
            AppError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                "INVALID_CREDENTIALS",
                self.to_string(),
                None,
            ),
            AppError::MissingRefreshToken => (
                StatusCode::UNAUTHORIZED,
                "MISSING_REFRESH_TOKEN",
                self.to_string(),
                None,
            ),
            AppError::InvalidRefreshToken => (
                StatusCode::UNAUTHORIZED,
                "INVALID_REFRESH_TOKEN",
                self.to_string(),
                None,
            ),
            AppError::InvalidToken => (
                StatusCode::UNAUTHORIZED,
                "INVALID_TOKEN",
                self.to_string(),
                None,
            ),

            // 404 Not Found
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone(), None),

            // 409 Conflict
            AppError::UsernameTaken => (
                StatusCode::CONFLICT,
                "USERNAME_TAKEN",
                self.to_string(),
                None,
            ),

            // 500 Internal Server Error
            AppError::Configuration(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "CONFIGURATION_ERROR",
                "The server is misconfigured".to_string(),
                Some(msg.clone()),
            ),
            AppError::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "An internal server error occurred".to_string(),
                Some(msg.clone()),
            ),
        }
    }

    // === Constructeurs helpers ===
    pub fn not_found(msg: impl Into<String>) -> Self {
        AppError::NotFound(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        AppError::Internal(msg.into())
    }

    pub fn invalid_input(msg: impl Into<String>) -> Self {
        AppError::InvalidInput(msg.into())
    }

    #[cfg(test)]
    pub fn status_code(&self) -> StatusCode {
        self.get_error_info().0
    }
}

// === Conversions from layer errors ===

impl From<RepositoryError> for AppError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::AlreadyRevoked(_) => AppError::InvalidRefreshToken,
            other => AppError::internal(other.to_string()),
        }
    }
}

impl From<JwtError> for AppError {
    fn from(err: JwtError) -> Self {
        match err {
            JwtError::MissingSecret => {
                AppError::Configuration("JWT signing secret is not configured".to_string())
            }
            JwtError::TtlOutOfRange => AppError::internal("Access token lifetime is out of range"),
            JwtError::GenerationFailed(e) => {
                AppError::internal(format!("Token generation failed: {e}"))
            }
            JwtError::InvalidToken => AppError::InvalidToken,
        }
    }
}

impl From<PasswordError> for AppError {
    fn from(err: PasswordError) -> Self {
        AppError::internal(err.to_string())
    }
}

impl From<axum::extract::rejection::JsonRejection> for AppError {
    fn from(err: axum::extract::rejection::JsonRejection) -> Self {
        AppError::invalid_input(format!("Invalid JSON: {err}"))
    }
}
