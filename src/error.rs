use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

/// Main application error type
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Authentication failed: {0}")]
    Unauthorized(String),

    #[error("Invalid input: {0}")]
    BadRequest(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    NotSharable(String),

    #[error("External service error: {0}")]
    ExternalService(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

/// Error response body. The `conflict` / `notSharable` flags let polling and
/// share clients branch on the failure kind without parsing the message.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conflict: Option<bool>,
    #[serde(rename = "notSharable", skip_serializing_if = "Option::is_none")]
    pub not_sharable: Option<bool>,
}

impl AppError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::NotSharable(_) => StatusCode::FORBIDDEN,
            Self::Database(_) | Self::ExternalService(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Convert to the error response body
    pub fn to_response(&self) -> ErrorResponse {
        ErrorResponse {
            error: self.to_string(),
            conflict: matches!(self, Self::Conflict(_)).then_some(true),
            not_sharable: matches!(self, Self::NotSharable(_)).then_some(true),
        }
    }
}

/// Implement IntoResponse for automatic conversion in handlers
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Log the error
        let status = self.status_code();
        tracing::error!(
            error = %self,
            status = %status.as_u16(),
            "Request failed"
        );

        let error_response = self.to_response();

        (status, Json(error_response)).into_response()
    }
}

/// Custom result type for the application
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conflict_response_carries_flag() {
        let err = AppError::Conflict("The scene was edited".to_string());
        assert_eq!(err.status_code(), StatusCode::CONFLICT);

        let body = err.to_response();
        assert_eq!(body.conflict, Some(true));
        assert_eq!(body.not_sharable, None);

        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["conflict"], true);
        assert!(json.get("notSharable").is_none());
    }

    #[test]
    fn test_not_sharable_response_carries_flag() {
        let err = AppError::NotSharable("This scene is no longer shared".to_string());
        assert_eq!(err.status_code(), StatusCode::FORBIDDEN);

        let json = serde_json::to_value(err.to_response()).unwrap();
        assert_eq!(json["notSharable"], true);
        assert!(json.get("conflict").is_none());
    }

    #[test]
    fn test_plain_errors_have_no_flags() {
        let err = AppError::NotFound("Session not found".to_string());
        let json = serde_json::to_value(err.to_response()).unwrap();
        assert!(json.get("conflict").is_none());
        assert!(json.get("notSharable").is_none());
    }
}
