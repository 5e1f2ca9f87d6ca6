//! API error handling

use axum::{
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::error;

use domain_claims::{ClaimError, ClaimErrorKind};

/// API error types
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),
}

/// Error response body
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    /// Machine-readable `error` field; one tag per status
    pub fn tag(&self) -> &'static str {
        match self {
            ApiError::NotFound(_) => "not_found",
            ApiError::BadRequest(_) => "bad_request",
            ApiError::Conflict(_) => "conflict",
            ApiError::Internal(_) => "internal_error",
            ApiError::ServiceUnavailable(_) => "service_unavailable",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let error = self.tag().to_string();
        let message = match self {
            ApiError::NotFound(msg)
            | ApiError::BadRequest(msg)
            | ApiError::Conflict(msg)
            | ApiError::Internal(msg)
            | ApiError::ServiceUnavailable(msg) => msg,
        };

        let body = ErrorResponse {
            error,
            message: Some(message),
        };

        (status, Json(body)).into_response()
    }
}

/// Classifies domain errors by variant; storage details never reach the client
impl From<ClaimError> for ApiError {
    fn from(err: ClaimError) -> Self {
        match err.kind() {
            ClaimErrorKind::Validation => ApiError::BadRequest(err.to_string()),
            ClaimErrorKind::NotFound => ApiError::NotFound(err.to_string()),
            ClaimErrorKind::Conflict => ApiError::Conflict(err.to_string()),
            ClaimErrorKind::Storage => {
                error!(error = %err, "Storage failure while handling request");
                ApiError::Internal("an internal error occurred".to_string())
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_kernel::ClaimId;
    use domain_claims::{ValidationError, ValidationField};

    #[test]
    fn test_claim_errors_map_to_statuses() {
        let cases: Vec<(ClaimError, StatusCode)> = vec![
            (
                ValidationError::new(ValidationField::Ndc, "invalid NDC format: must be numeric").into(),
                StatusCode::BAD_REQUEST,
            ),
            (ClaimError::PharmacyNotFound("9999999999".into()), StatusCode::NOT_FOUND),
            (ClaimError::ClaimNotFound(ClaimId::new()), StatusCode::NOT_FOUND),
            (ClaimError::AlreadyReversed(ClaimId::new()), StatusCode::CONFLICT),
            (ClaimError::storage("connection reset"), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (err, expected) in cases {
            assert_eq!(ApiError::from(err).status(), expected);
        }
    }

    #[test]
    fn test_every_bad_request_shares_one_tag() {
        let invalid: ApiError =
            ClaimError::from(ValidationError::new(ValidationField::Npi, "invalid NPI format")).into();
        let malformed = ApiError::BadRequest("EOF while parsing".into());

        for err in [invalid, malformed] {
            assert_eq!(err.status(), StatusCode::BAD_REQUEST);
            assert_eq!(err.tag(), "bad_request");
        }
    }

    #[test]
    fn test_storage_message_is_not_exposed() {
        let api: ApiError = ClaimError::storage("password authentication failed").into();
        assert!(!api.to_string().contains("password"));
    }
}
