//! Error responses for the HTTP API.

use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::{debug, error};

use crate::application_service::InterviewServiceError;
use crate::port::AuthError;

/// Every failure a handler can return. Rendered as
/// `{"errors": {"<key>": ["<message>"]}}`.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Service(#[from] InterviewServiceError),
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error("malformed request body: {0}")]
    Body(String),
    #[error("malformed query string: {0}")]
    Query(String),
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Body(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::Query(rejection.body_text())
    }
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::Auth(_) => StatusCode::UNAUTHORIZED,
            ApiError::Body(_) | ApiError::Query(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Service(e) => match e {
                InterviewServiceError::Unauthenticated => StatusCode::UNAUTHORIZED,
                InterviewServiceError::Forbidden(_) => StatusCode::FORBIDDEN,
                InterviewServiceError::NotFound(_) => StatusCode::NOT_FOUND,
                InterviewServiceError::Validation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
                InterviewServiceError::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }

    /// Key and message of the single entry in the `errors` object.
    fn entry(&self) -> (String, String) {
        match self {
            ApiError::Auth(e) => ("authorization".into(), e.to_string()),
            ApiError::Body(msg) => ("body".into(), msg.clone()),
            ApiError::Query(msg) => ("query".into(), msg.clone()),
            ApiError::Service(e) => match e {
                InterviewServiceError::Unauthenticated => {
                    ("authorization".into(), "authentication required".into())
                }
                InterviewServiceError::Forbidden(action) => {
                    ("authorization".into(), format!("only the author may {action}"))
                }
                InterviewServiceError::NotFound(resource) => {
                    ((*resource).to_string(), "not found".into())
                }
                InterviewServiceError::Validation { field, message } => {
                    ((*field).to_string(), message.clone())
                }
                InterviewServiceError::Repository(_) => {
                    ("server".into(), "internal error".into())
                }
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self, "request failed");
        } else {
            debug!(error = %self, %status, "request rejected");
        }

        let (key, message) = self.entry();
        (status, Json(json!({ "errors": { key: [message] } }))).into_response()
    }
}
