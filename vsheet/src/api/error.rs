use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::error;
use vsheet_core::StoreError;

/// Errors returned by the HTTP handlers. Every variant renders as
/// `{"error": <message>}`.
#[derive(Debug)]
pub enum ApiError {
    NotFound,
    InvalidFormat,
    BadRequest(String),
    Internal(String),
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::InvalidFormat | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            ApiError::NotFound => "File not found",
            ApiError::InvalidFormat => "Invalid file format",
            ApiError::BadRequest(msg) | ApiError::Internal(msg) => msg.as_str(),
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(_) => ApiError::NotFound,
            StoreError::Corrupt { id, source } => {
                error!(id = %id, error = %source, "stored spreadsheet does not parse");
                ApiError::InvalidFormat
            }
            other => {
                error!(error = %other, "store operation failed");
                ApiError::Internal(other.to_string())
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(ErrorBody {
            error: self.message().to_string(),
        });
        (self.status(), body).into_response()
    }
}
