//! HTTP error responses.
//!
//! Every handler failure becomes an [`ApiError`], a status code paired with a
//! JSON body of the shape `{success: false, code, message}`. Persistence and
//! internal failures are logged here and reach the client only as a generic
//! message.
use crate::errors::AppError;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};

const GENERIC_FAILURE: &str = "internal server error";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub code: String,
    pub message: String,
}

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub body: ErrorResponse,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        (self.status, Json(self.body)).into_response()
    }
}

fn api_error(status: StatusCode, code: &str, message: &str) -> ApiError {
    ApiError {
        status,
        body: ErrorResponse {
            success: false,
            code: code.to_string(),
            message: message.to_string(),
        },
    }
}

pub fn api_validation_error(message: &str) -> ApiError {
    api_error(StatusCode::BAD_REQUEST, "invalid_input", message)
}

pub fn api_not_found(message: &str) -> ApiError {
    api_error(StatusCode::NOT_FOUND, "not_found", message)
}

pub fn api_unauthorized(message: &str) -> ApiError {
    api_error(StatusCode::UNAUTHORIZED, "unauthorized", message)
}

/// Logs `err` and answers with the generic 500 body.
pub fn api_internal(err: &dyn std::fmt::Display) -> ApiError {
    tracing::error!(error = %err, "request failed");
    api_error(StatusCode::INTERNAL_SERVER_ERROR, "internal", GENERIC_FAILURE)
}

impl From<AppError> for ApiError {
    fn from(error: AppError) -> Self {
        match &error {
            AppError::InvalidInput(message) => api_validation_error(message),
            AppError::NotFound(message) => api_not_found(message),
            AppError::AuthFailure(message) => api_unauthorized(message),
            AppError::Persistence(_) | AppError::Internal(_) => api_internal(&error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn app_errors_map_to_status_codes() {
        let invalid = ApiError::from(AppError::InvalidInput("month is required".to_string()));
        assert_eq!(invalid.status, StatusCode::BAD_REQUEST);
        assert_eq!(invalid.body.message, "month is required");
        assert!(!invalid.body.success);

        let missing = ApiError::from(AppError::NotFound("user 9 not found".to_string()));
        assert_eq!(missing.status, StatusCode::NOT_FOUND);

        let denied = ApiError::from(AppError::AuthFailure("invalid credentials".to_string()));
        assert_eq!(denied.status, StatusCode::UNAUTHORIZED);
        assert_eq!(denied.body.code, "unauthorized");
    }

    #[test]
    fn persistence_details_are_not_exposed() {
        let api = ApiError::from(AppError::Persistence("/srv/db.json: permission denied".to_string()));
        assert_eq!(api.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(api.body.message, GENERIC_FAILURE);
        assert!(!api.body.message.contains("db.json"));

        let internal = ApiError::from(AppError::Internal("boom".to_string()));
        assert_eq!(internal.body.code, "internal");
    }
}
