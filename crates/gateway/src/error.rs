//! Error types for the gateway layer

use accounts_users::{FieldErrors, FormEcho, Notification, WorkflowError};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::json;
use thiserror::Error;
use tracing::error;
use utoipa::ToSchema;

/// Body of a rejected form submission
#[derive(Debug, Serialize, ToSchema)]
pub struct FailureBody {
    #[schema(value_type = Object)]
    pub errors: FieldErrors,
    pub messages: Vec<Notification>,
    #[schema(value_type = Object)]
    pub form: FormEcho,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

/// Gateway error types
#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("submitted form is invalid")]
    InvalidForm { errors: FieldErrors, form: FormEcho },

    #[error("{message}")]
    AuthenticationFailed { message: String, form: FormEcho },

    #[error("Access denied")]
    AccessDenied,

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Internal server error: {0}")]
    InternalError(String),
}

impl GatewayError {
    /// Map a workflow failure, keeping the submitted values for the response
    pub fn from_workflow(error: WorkflowError, form: FormEcho) -> Self {
        if let Some(errors) = error.field_errors() {
            return Self::InvalidForm { errors, form };
        }

        match error {
            WorkflowError::AuthenticationFailure => Self::AuthenticationFailed {
                message: error.to_string(),
                form,
            },
            WorkflowError::AccessDenied => Self::AccessDenied,
            WorkflowError::AccountNotFound => Self::NotFound("account".to_string()),
            other => Self::InternalError(other.to_string()),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            GatewayError::InvalidForm { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            GatewayError::AuthenticationFailed { .. } => StatusCode::UNAUTHORIZED,
            GatewayError::AccessDenied => StatusCode::FORBIDDEN,
            GatewayError::NotFound(_) => StatusCode::NOT_FOUND,
            GatewayError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<WorkflowError> for GatewayError {
    fn from(error: WorkflowError) -> Self {
        Self::from_workflow(error, FormEcho::new())
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        match self {
            GatewayError::InvalidForm { errors, form } => {
                let messages = errors
                    .iter()
                    .map(|(field, error)| Notification::error(format!("{field}: {error}")))
                    .collect();
                let body = FailureBody {
                    errors,
                    messages,
                    form,
                };
                (status, Json(body)).into_response()
            }
            GatewayError::AuthenticationFailed { message, form } => {
                let body = FailureBody {
                    errors: FieldErrors::new(),
                    messages: vec![Notification::error(message)],
                    form,
                };
                (status, Json(body)).into_response()
            }
            other => {
                if status.is_server_error() {
                    error!(error = %other, "request failed");
                }
                let body = json!({
                    "error": status.as_str(),
                    "message": other.to_string(),
                });
                (status, Json(body)).into_response()
            }
        }
    }
}

/// Result type for gateway operations
pub type GatewayResult<T> = Result<T, GatewayError>;
