// crates/backend-lib/src/error.rs

//! Central error type + Axum integration.
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// Application error types with error codes and context
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Email already registered")]
    DuplicateEmail,

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Invalid or expired session")]
    Unauthorized,

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Password must be at least {0} characters")]
    WeakPassword(usize),

    #[error("Invalid recovery token")]
    InvalidRecoveryToken,

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::InvalidCredentials | AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::InvalidInput(_)
            | AppError::WeakPassword(_)
            | AppError::InvalidRecoveryToken => StatusCode::BAD_REQUEST,
            AppError::DuplicateEmail | AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::RateLimitExceeded => StatusCode::TOO_MANY_REQUESTS,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::InvalidCredentials => "AUTH_001",
            AppError::Unauthorized => "AUTH_002",
            AppError::Forbidden(_) => "AUTH_003",
            AppError::InvalidRecoveryToken => "AUTH_004",
            AppError::DuplicateEmail => "USER_001",
            AppError::NotFound(_) => "NF_001",
            AppError::InvalidInput(_) => "VAL_001",
            AppError::WeakPassword(_) => "VAL_002",
            AppError::Conflict(_) => "CONFLICT_001",
            AppError::RateLimitExceeded => "RATE_001",
            AppError::Io(_) => "IO_001",
            AppError::Json(_) => "JSON_001",
            AppError::Internal(_) => "INT_001",
        }
    }

    /// Get a sanitized message suitable for production use
    pub fn sanitized_message(&self) -> String {
        match self {
            // The credential message is already generic and must stay
            // identical for unknown email and wrong password.
            AppError::InvalidCredentials => "Invalid email or password".to_string(),
            AppError::Unauthorized => "Invalid or expired session".to_string(),
            AppError::Forbidden(_) => "Forbidden".to_string(),
            AppError::DuplicateEmail => "Email already registered".to_string(),
            AppError::NotFound(_) => "Resource not found".to_string(),
            AppError::InvalidInput(_) => "Invalid input provided".to_string(),
            AppError::WeakPassword(min) => {
                format!("Password must be at least {min} characters")
            },
            AppError::InvalidRecoveryToken => "Invalid recovery token".to_string(),
            AppError::Conflict(_) => "Conflicting state".to_string(),
            AppError::RateLimitExceeded => {
                "Rate limit exceeded, please try again later".to_string()
            },
            AppError::Json(_) => "Invalid request format".to_string(),
            AppError::Io(_) | AppError::Internal(_) => {
                "An internal server error occurred".to_string()
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error_code = self.error_code();

        // Use detailed messages in development, sanitized in production
        let message = if cfg!(debug_assertions) {
            self.to_string()
        } else {
            self.sanitized_message()
        };

        // Create a JSON response with error details
        let body = serde_json::json!({
            "error": {
                "code": error_code,
                "message": message,
            }
        });

        (status, axum::Json(body)).into_response()
    }
}

impl From<String> for AppError {
    fn from(msg: String) -> Self {
        AppError::Internal(msg)
    }
}

impl From<&str> for AppError {
    fn from(msg: &str) -> Self {
        AppError::Internal(msg.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use axum::response::IntoResponse;
    use std::io::{Error as IoError, ErrorKind};

    #[test]
    fn test_app_error_display() {
        let cred_error = AppError::InvalidCredentials;
        assert_eq!(cred_error.to_string(), "Invalid email or password");

        let io_error = AppError::Io(IoError::new(ErrorKind::NotFound, "File not found"));
        assert!(io_error.to_string().contains("IO error"));

        let rate_limit_error = AppError::RateLimitExceeded;
        assert_eq!(rate_limit_error.to_string(), "Rate limit exceeded");
    }

    #[test]
    fn test_app_error_status_codes() {
        assert_eq!(
            AppError::InvalidCredentials.status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(AppError::Unauthorized.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(AppError::DuplicateEmail.status_code(), StatusCode::CONFLICT);
        assert_eq!(
            AppError::NotFound("test".to_string()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(AppError::WeakPassword(6).status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            AppError::RateLimitExceeded.status_code(),
            StatusCode::TOO_MANY_REQUESTS
        );
        assert_eq!(
            AppError::Internal("test".to_string()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_app_error_error_codes() {
        assert_eq!(AppError::InvalidCredentials.error_code(), "AUTH_001");
        assert_eq!(AppError::Unauthorized.error_code(), "AUTH_002");
        assert_eq!(AppError::DuplicateEmail.error_code(), "USER_001");
        assert_eq!(AppError::RateLimitExceeded.error_code(), "RATE_001");

        let json_err: serde_json::Error =
            serde_json::from_str::<serde_json::Value>("invalid json").unwrap_err();
        assert_eq!(AppError::Json(json_err).error_code(), "JSON_001");
    }

    #[test]
    fn test_credential_and_enumeration_messages_match() {
        // Wrong password and unknown email must be indistinguishable to
        // the caller, in both debug and sanitized forms.
        let err = AppError::InvalidCredentials;
        assert_eq!(err.to_string(), err.sanitized_message());
    }

    #[test]
    fn test_app_error_into_response() {
        let error = AppError::NotFound("Resource not found".to_string());
        let response = error.into_response();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_error_from_impls() {
        let io_err = IoError::new(ErrorKind::PermissionDenied, "Permission denied");
        let app_err: AppError = io_err.into();
        assert!(matches!(app_err, AppError::Io(_)));

        let json_err: serde_json::Error =
            serde_json::from_str::<serde_json::Value>("invalid json").unwrap_err();
        let app_err: AppError = json_err.into();
        assert!(matches!(app_err, AppError::Json(_)));

        let string_err = "String error".to_string();
        let app_err: AppError = string_err.into();
        assert!(matches!(app_err, AppError::Internal(_)));
    }

    #[tokio::test]
    async fn test_error_serialization() {
        let json_err: serde_json::Error =
            serde_json::from_str::<serde_json::Value>("invalid json").unwrap_err();
        let app_error = AppError::Json(json_err);
        let response = app_error.into_response();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let response_headers = response.headers();
        assert!(response_headers
            .get("content-type")
            .unwrap()
            .to_str()
            .unwrap()
            .contains("application/json"));
    }
}
