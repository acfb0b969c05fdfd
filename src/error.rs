use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;
use validator::ValidationErrors;

use crate::dao::storage::StorageError;

/// Errors that can occur in service layer operations.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Storage backend failed or rolled back the operation.
    #[error("storage unavailable")]
    Unavailable(#[source] StorageError),
    /// Application is running in degraded mode without storage.
    #[error("storage unavailable (degraded mode)")]
    Degraded,
    /// Missing or invalid credential.
    #[error("unauthenticated: {0}")]
    Unauthenticated(String),
    /// Verified caller lacks the required role.
    #[error("unauthorized: {0}")]
    Unauthorized(String),
    /// Invalid input provided by the client.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// Requested resource was not found.
    #[error("not found: {0}")]
    NotFound(String),
    /// The session does not accept enrollments at this time.
    #[error("enrollment for session {session_id} is not open right now")]
    EnrollmentClosed { session_id: i32 },
    /// A write was rejected by a uniqueness or referential rule.
    #[error("conflict: {0}")]
    Conflict(String),
    /// Operation is intentionally not available.
    #[error("not implemented: {0}")]
    NotImplemented(String),
    /// Operation exceeded its timeout limit.
    #[error("operation timed out")]
    Timeout,
}

impl From<StorageError> for ServiceError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::Conflict { message } => ServiceError::Conflict(message),
            err @ StorageError::Unavailable { .. } => ServiceError::Unavailable(err),
        }
    }
}

impl From<ValidationErrors> for ServiceError {
    fn from(err: ValidationErrors) -> Self {
        ServiceError::InvalidInput(format!("validation failed: {err}"))
    }
}

impl From<ValidationErrors> for AppError {
    fn from(err: ValidationErrors) -> Self {
        AppError::ValidationFailed(format!("validation failed: {err}"))
    }
}

/// Application-level errors that are converted to HTTP responses.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Unauthenticated(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    ValidationFailed(String),
    #[error("{0}")]
    EnrollmentClosed(String),
    #[error("{0}")]
    Conflict(String),
    /// Retryable: the store is unreachable, timed out or rolled back.
    #[error("{0}")]
    StoreUnavailable(String),
    #[error("{0}")]
    NotImplemented(String),
    #[error("{0}")]
    Internal(String),
}

impl AppError {
    /// Machine-readable discriminator sent as `kind`.
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::Unauthenticated(_) => "unauthenticated",
            AppError::Unauthorized(_) => "unauthorized",
            AppError::NotFound(_) => "not_found",
            AppError::ValidationFailed(_) => "validation_failed",
            AppError::EnrollmentClosed(_) => "enrollment_closed",
            AppError::Conflict(_) => "conflict",
            AppError::StoreUnavailable(_) => "store_unavailable",
            AppError::NotImplemented(_) => "not_implemented",
            AppError::Internal(_) => "internal",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            AppError::Unauthorized(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::ValidationFailed(_) | AppError::EnrollmentClosed(_) => {
                StatusCode::BAD_REQUEST
            }
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::NotImplemented(_) => StatusCode::NOT_IMPLEMENTED,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Unavailable(_) => {
                AppError::StoreUnavailable("storage unavailable, please retry".into())
            }
            ServiceError::Degraded => {
                AppError::StoreUnavailable("storage unavailable (degraded mode)".into())
            }
            ServiceError::Timeout => AppError::StoreUnavailable("operation timed out".into()),
            ServiceError::Unauthenticated(message) => AppError::Unauthenticated(message),
            ServiceError::Unauthorized(message) => AppError::Unauthorized(message),
            ServiceError::InvalidInput(message) => AppError::ValidationFailed(message),
            ServiceError::NotFound(message) => AppError::NotFound(message),
            err @ ServiceError::EnrollmentClosed { .. } => {
                AppError::EnrollmentClosed(err.to_string())
            }
            ServiceError::Conflict(message) => AppError::Conflict(message),
            ServiceError::NotImplemented(message) => AppError::NotImplemented(message),
        }
    }
}

/// JSON body of every error response.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    /// Machine-readable error kind, e.g. `enrollment_closed`.
    pub kind: String,
    /// Human-readable explanation.
    pub message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status();
        let payload = Json(ErrorBody {
            kind: self.kind().to_owned(),
            message: self.to_string(),
        });

        (status, payload).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closed_window_maps_to_bad_request_with_its_own_kind() {
        let err: AppError = ServiceError::EnrollmentClosed { session_id: 4 }.into();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.kind(), "enrollment_closed");
        assert!(err.to_string().contains("session 4"));
    }

    #[test]
    fn store_failures_are_retryable_503() {
        for err in [ServiceError::Degraded, ServiceError::Timeout] {
            let app: AppError = err.into();
            assert_eq!(app.status(), StatusCode::SERVICE_UNAVAILABLE);
            assert_eq!(app.kind(), "store_unavailable");
        }
    }

    #[test]
    fn storage_conflicts_stay_conflicts() {
        let err: ServiceError = StorageError::conflict("duplicate code").into();
        let app: AppError = err.into();
        assert_eq!(app.status(), StatusCode::CONFLICT);
        assert_eq!(app.to_string(), "duplicate code");
    }

    #[test]
    fn role_and_identity_failures_differ() {
        assert_eq!(
            AppError::from(ServiceError::Unauthenticated("x".into())).status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AppError::from(ServiceError::Unauthorized("x".into())).status(),
            StatusCode::FORBIDDEN
        );
    }
}
