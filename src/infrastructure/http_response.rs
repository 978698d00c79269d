// HTTP error responses
use crate::application::error::ServiceError;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

pub const UNAVAILABLE_MESSAGE: &str = "Database unavailable, try again later.";
pub const INTERNAL_MESSAGE: &str = "Internal server error";

/// A failed request, rendered as `{ "error": ... }` with the matching status.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
    details: Option<String>,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            details: None,
        }
    }

    pub fn unavailable() -> Self {
        Self::new(StatusCode::SERVICE_UNAVAILABLE, UNAVAILABLE_MESSAGE)
    }

    /// Like `From<ServiceError>`, but an internal failure also carries its
    /// cause back to the client.
    pub fn with_details(err: ServiceError) -> Self {
        let details = match &err {
            ServiceError::Internal(e) => Some(format!("{:#}", e)),
            _ => None,
        };
        Self {
            details,
            ..Self::from(err)
        }
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Validation(msg) => Self::new(StatusCode::BAD_REQUEST, msg),
            ServiceError::NotFound(msg) => Self::new(StatusCode::NOT_FOUND, msg),
            ServiceError::Internal(e) => {
                tracing::error!("Internal error: {:?}", e);
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_MESSAGE)
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = match self.details {
            Some(details) => json!({ "error": self.message, "details": details }),
            None => json!({ "error": self.message }),
        };
        (self.status, Json(body)).into_response()
    }
}
