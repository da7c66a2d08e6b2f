//! Unified API error handling
//!
//! This module provides a consistent error response format across all API endpoints.

use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::model::AnalysisOutcome;

/// Standard error response format
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Error type/code
    pub error: String,
    /// Human-readable error message
    pub message: String,
    /// Unique request ID for tracing
    pub request_id: String,
}

/// Unified API error type
///
/// All API endpoints should return `Result<T, ApiError>` for consistent error handling.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ApiError {
    /// Bad request / validation error (400)
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Credential missing (503)
    #[error("Service not configured: {0}")]
    NotConfigured(String),

    /// External service error (502)
    #[error("External service error: {0}")]
    ExternalService(String),
}

impl ApiError {
    /// Map outcomes that are failures of the request itself; the rest are 200s
    pub fn from_outcome(outcome: &AnalysisOutcome) -> Option<Self> {
        match outcome {
            AnalysisOutcome::InvalidRequest { message } => Some(ApiError::BadRequest(message.clone())),
            AnalysisOutcome::ConfigError { message } => Some(ApiError::NotConfigured(message.clone())),
            AnalysisOutcome::ApiError { detail, .. } => {
                Some(ApiError::ExternalService(detail.clone()))
            }
            _ => None,
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotConfigured(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::ExternalService(_) => StatusCode::BAD_GATEWAY,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        let error_type = match self {
            ApiError::BadRequest(_) => "bad_request",
            ApiError::NotConfigured(_) => "not_configured",
            ApiError::ExternalService(_) => "external_service_error",
        };

        tracing::error!(
            error_type = error_type,
            status = status.as_u16(),
            message = %self,
            "API error"
        );

        HttpResponse::build(status).json(ErrorResponse {
            error: error_type.to_string(),
            message: self.to_string(),
            request_id: Uuid::new_v4().to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::BlockReason;

    #[test]
    fn test_outcome_mapping() {
        let bad = ApiError::from_outcome(&AnalysisOutcome::InvalidRequest {
            message: "Enter a CVE ID first.".to_string(),
        })
        .unwrap();
        assert_eq!(bad.status_code(), StatusCode::BAD_REQUEST);

        let unconfigured = ApiError::from_outcome(&AnalysisOutcome::missing_credential()).unwrap();
        assert_eq!(unconfigured.status_code(), StatusCode::SERVICE_UNAVAILABLE);

        let upstream = ApiError::from_outcome(&AnalysisOutcome::api_error("timed out")).unwrap();
        assert_eq!(upstream.status_code(), StatusCode::BAD_GATEWAY);
        assert_eq!(upstream.to_string(), "External service error: timed out");

        assert!(ApiError::from_outcome(&AnalysisOutcome::blocked(BlockReason::Recitation)).is_none());
    }
}
