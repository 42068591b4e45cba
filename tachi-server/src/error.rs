//! HTTP error type

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::goals::GoalError;
use crate::import::error::{ImportError, StatusClass};

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Resource not found (404)
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Invalid request (400)
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Internal server error (500)
    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Common error: {0}")]
    Common(#[from] tachi_common::Error),
}

impl From<ImportError> for ApiError {
    fn from(err: ImportError) -> Self {
        match err.status {
            StatusClass::BadRequest => ApiError::BadRequest(err.message),
            StatusClass::Internal => ApiError::Internal(err.message),
        }
    }
}

impl From<GoalError> for ApiError {
    fn from(err: GoalError) -> Self {
        match err {
            GoalError::NotAPlayer { .. } => ApiError::BadRequest(err.to_string()),
            GoalError::EvaluationFailed { .. } => ApiError::Internal(err.to_string()),
            GoalError::Datastore(e) => ApiError::Common(e),
        }
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Common(tachi_common::Error::NotFound(_)) => StatusCode::NOT_FOUND,
            ApiError::Common(tachi_common::Error::InvalidInput(_)) => StatusCode::BAD_REQUEST,
            ApiError::Common(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let (error_code, message) = match self {
            ApiError::NotFound(msg) => ("NOT_FOUND", msg),
            ApiError::BadRequest(msg) => ("BAD_REQUEST", msg),
            ApiError::Internal(msg) => ("INTERNAL_ERROR", msg),
            ApiError::Common(tachi_common::Error::NotFound(msg)) => ("NOT_FOUND", msg),
            ApiError::Common(tachi_common::Error::InvalidInput(msg)) => ("BAD_REQUEST", msg),
            ApiError::Common(ref err) => ("COMMON_ERROR", err.to_string()),
        };

        let body = Json(json!({
            "error": {
                "code": error_code,
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
