//! API error handling

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

use core_kernel::PortError;
use domain_dashboard::DashboardError;
use domain_reclamation::LifecycleError;

use crate::auth::AuthError;

/// API error types
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Invalid transition: {0}")]
    InvalidTransition(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid fields: {}", .0.join("; "))]
    InvalidFields(Vec<String>),

    #[error("Service unavailable: {0}")]
    Unavailable(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<String>>,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) | ApiError::Validation(_) | ApiError::InvalidFields(_) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::InvalidTransition(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_type(&self) -> &'static str {
        match self {
            ApiError::NotFound(_) => "not_found",
            ApiError::BadRequest(_) => "bad_request",
            ApiError::Unauthorized => "unauthorized",
            ApiError::Forbidden(_) => "forbidden",
            ApiError::Conflict(_) => "conflict",
            ApiError::InvalidTransition(_) => "invalid_transition",
            ApiError::Validation(_) | ApiError::InvalidFields(_) => "validation_error",
            ApiError::Unavailable(_) => "service_unavailable",
            ApiError::Internal(_) => "internal_error",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            ApiError::Unauthorized => "Unauthorized".to_string(),
            ApiError::InvalidFields(_) => "Request validation failed".to_string(),
            // Storage details stay in the logs
            ApiError::Internal(detail) => {
                error!(detail = %detail, "Internal error");
                "Internal server error".to_string()
            }
            ApiError::NotFound(msg)
            | ApiError::BadRequest(msg)
            | ApiError::Forbidden(msg)
            | ApiError::Conflict(msg)
            | ApiError::InvalidTransition(msg)
            | ApiError::Validation(msg)
            | ApiError::Unavailable(msg) => msg.clone(),
        };

        let error = self.error_type().to_string();
        let details = match self {
            ApiError::InvalidFields(fields) => Some(fields),
            _ => None,
        };
        let body = ErrorResponse {
            error,
            message,
            details,
        };

        (status, Json(body)).into_response()
    }
}

impl From<PortError> for ApiError {
    fn from(err: PortError) -> Self {
        match err {
            PortError::NotFound { .. } => ApiError::NotFound(err.to_string()),
            PortError::ConcurrentModification { .. } | PortError::Conflict { .. } => {
                ApiError::Conflict(err.to_string())
            }
            PortError::Validation { message, .. } => ApiError::Validation(message),
            PortError::Connection { .. } | PortError::Timeout { .. } => {
                ApiError::Unavailable(err.to_string())
            }
            PortError::Internal { .. } => ApiError::Internal(err.to_string()),
        }
    }
}

impl From<LifecycleError> for ApiError {
    fn from(err: LifecycleError) -> Self {
        match err {
            LifecycleError::NotFound(id) => {
                ApiError::NotFound(format!("Reclamation {} not found", id))
            }
            LifecycleError::InvalidTransition { .. } => {
                ApiError::InvalidTransition(err.to_string())
            }
            LifecycleError::ConcurrentModification { .. } => ApiError::Conflict(err.to_string()),
            LifecycleError::Validation(message) => ApiError::Validation(message),
            LifecycleError::Port(port) => ApiError::from(port),
        }
    }
}

impl From<DashboardError> for ApiError {
    fn from(err: DashboardError) -> Self {
        match err {
            DashboardError::Source(port) => ApiError::from(port),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidToken | AuthError::TokenExpired => ApiError::Unauthorized,
            AuthError::MissingPermission(permission) => {
                ApiError::Forbidden(format!("missing permission {}", permission))
            }
        }
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(err: validator::ValidationErrors) -> Self {
        let mut fields: Vec<String> = err
            .field_errors()
            .into_iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |e| match &e.message {
                    Some(message) => format!("{}: {}", field, message),
                    None => format!("{}: {}", field, e.code),
                })
            })
            .collect();
        fields.sort();
        ApiError::InvalidFields(fields)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain_reclamation::{ReclamationStatus, TransitionRejection};

    #[test]
    fn test_lifecycle_errors_map_to_http_statuses() {
        let cases = [
            (LifecycleError::NotFound("x".into()), StatusCode::NOT_FOUND),
            (
                LifecycleError::invalid_transition(
                    "x",
                    TransitionRejection::Terminal(ReclamationStatus::Closed),
                ),
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (
                LifecycleError::ConcurrentModification {
                    reclamation_id: "x".into(),
                    expected_version: 3,
                },
                StatusCode::CONFLICT,
            ),
            (LifecycleError::validation("title is blank"), StatusCode::BAD_REQUEST),
            (
                LifecycleError::Port(PortError::connection("refused")),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
        ];

        for (err, expected) in cases {
            assert_eq!(ApiError::from(err).status(), expected);
        }
    }

    #[test]
    fn test_field_errors_are_listed_in_details() {
        use validator::Validate;

        let request: crate::dto::reclamation::CreateReclamationRequest =
            serde_json::from_value(serde_json::json!({
                "client_id": uuid::Uuid::new_v4(),
                "title": "",
            }))
            .unwrap();
        let err = ApiError::from(request.validate().unwrap_err());

        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        match err {
            ApiError::InvalidFields(fields) => {
                assert_eq!(fields, vec!["title: length".to_string()])
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_auth_errors() {
        assert_eq!(ApiError::from(AuthError::TokenExpired).status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            ApiError::from(AuthError::MissingPermission("dashboard:read".into())).status(),
            StatusCode::FORBIDDEN
        );
    }
}
