// Authentication error types

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

/// Authentication error types
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Username is already taken (unique constraint on `users.username`)
    #[error("Username already exists")]
    DuplicateUsername,

    #[error("User doesn't exist")]
    UnknownUser,

    #[error("Incorrect username or password")]
    BadCredentials,

    #[error("Invalid token")]
    TokenInvalid,

    #[error("Token has expired")]
    TokenExpired,

    #[error("Missing authentication token")]
    MissingToken,

    /// Protected resource access failed for any token or identity reason
    #[error("Unauthorized")]
    Unauthorized,

    /// Transport or database level failure
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Password hashing error: {0}")]
    PasswordHashError(String),

    #[error("Token generation error: {0}")]
    TokenGenerationError(String),
}

impl AuthError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AuthError::UnknownUser
            | AuthError::BadCredentials
            | AuthError::TokenInvalid
            | AuthError::TokenExpired
            | AuthError::MissingToken
            | AuthError::Unauthorized => StatusCode::UNAUTHORIZED,
            // Duplicate usernames are reported like any other registration failure
            AuthError::DuplicateUsername
            | AuthError::StoreUnavailable(_)
            | AuthError::PasswordHashError(_)
            | AuthError::TokenGenerationError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message that is safe to send to clients (no store or hashing detail)
    pub fn error_message(&self) -> String {
        match self {
            AuthError::ValidationError(msg) => msg.clone(),
            AuthError::UnknownUser | AuthError::BadCredentials => self.to_string(),
            AuthError::TokenInvalid
            | AuthError::TokenExpired
            | AuthError::MissingToken
            | AuthError::Unauthorized => "Unauthorized".to_string(),
            AuthError::DuplicateUsername
            | AuthError::StoreUnavailable(_)
            | AuthError::PasswordHashError(_)
            | AuthError::TokenGenerationError(_) => "Internal server error".to_string(),
        }
    }

    /// Collapse any token failure into `Unauthorized` for protected resources
    pub fn into_unauthorized(self) -> Self {
        match self {
            AuthError::TokenInvalid | AuthError::TokenExpired | AuthError::MissingToken => {
                warn!("Rejected bearer token: {}", self);
                AuthError::Unauthorized
            }
            AuthError::StoreUnavailable(ref msg) => {
                error!("Identity lookup failed: {}", msg);
                AuthError::Unauthorized
            }
            other => other,
        }
    }

    /// Emit the log line for this error at a level matching its severity
    pub(crate) fn log(&self) {
        match self {
            AuthError::StoreUnavailable(msg) => error!("Database error in auth: {}", msg),
            AuthError::PasswordHashError(msg) => error!("Password hashing error: {}", msg),
            AuthError::TokenGenerationError(msg) => error!("Token generation error: {}", msg),
            AuthError::DuplicateUsername => warn!("Registration rejected: username already exists"),
            AuthError::UnknownUser => warn!("Login attempt for unknown user"),
            AuthError::BadCredentials => warn!("Login attempt with incorrect password"),
            AuthError::TokenInvalid => warn!("Invalid token attempt"),
            AuthError::TokenExpired => warn!("Expired token attempt"),
            AuthError::MissingToken => warn!("Missing token in request"),
            AuthError::Unauthorized | AuthError::ValidationError(_) => {}
        }
    }
}

impl From<sqlx::Error> for AuthError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.is_unique_violation() {
                return AuthError::DuplicateUsername;
            }
        }
        AuthError::StoreUnavailable(err.to_string())
    }
}

impl From<validator::ValidationErrors> for AuthError {
    fn from(errors: validator::ValidationErrors) -> Self {
        AuthError::ValidationError(errors.to_string())
    }
}

/// Unreadable or incomplete request bodies are reported like failed validation
impl From<JsonRejection> for AuthError {
    fn from(rejection: JsonRejection) -> Self {
        AuthError::ValidationError(rejection.body_text())
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        self.log();
        let body = Json(json!({
            "message": self.error_message(),
        }));

        (self.status_code(), body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_failures_are_distinguished() {
        assert_eq!(AuthError::UnknownUser.error_message(), "User doesn't exist");
        assert_eq!(
            AuthError::BadCredentials.error_message(),
            "Incorrect username or password"
        );
        assert_eq!(AuthError::UnknownUser.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(AuthError::BadCredentials.status_code(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_store_detail_is_not_leaked() {
        let err = AuthError::StoreUnavailable("connection refused to 10.0.0.3:5432".to_string());
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!err.error_message().contains("10.0.0.3"));
    }

    #[test]
    fn test_token_failures_collapse_to_unauthorized() {
        for err in [AuthError::TokenInvalid, AuthError::TokenExpired, AuthError::MissingToken] {
            assert!(matches!(err.into_unauthorized(), AuthError::Unauthorized));
        }
        assert!(matches!(
            AuthError::StoreUnavailable("down".to_string()).into_unauthorized(),
            AuthError::Unauthorized
        ));
    }
}
