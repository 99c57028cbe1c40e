// Error handling for HTTP handlers
// Maps an AuthError plus the failing operation onto a `{message}` response

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use crate::auth::{models::MessageResponse, AuthError};

/// Main error type for the user routes.
///
/// Server-side failures (status 500) are reported with the operation's
/// generic failure message, e.g. "Registration failed"; the detail only
/// goes to the log. Client errors keep their own message.
#[derive(Debug)]
pub struct ApiError {
    error: AuthError,
    failure_message: &'static str,
}

impl ApiError {
    pub fn new(error: AuthError, failure_message: &'static str) -> Self {
        Self {
            error,
            failure_message,
        }
    }

    pub fn status_code(&self) -> StatusCode {
        self.error.status_code()
    }

    /// Message sent to the client
    pub fn message(&self) -> String {
        if self.status_code().is_server_error() {
            self.failure_message.to_string()
        } else {
            self.error.error_message()
        }
    }
}

/// Attach an operation's failure message to an auth result
pub trait FailureContext<T> {
    fn or_fail_with(self, failure_message: &'static str) -> Result<T, ApiError>;
}

impl<T> FailureContext<T> for Result<T, AuthError> {
    fn or_fail_with(self, failure_message: &'static str) -> Result<T, ApiError> {
        self.map_err(|error| ApiError::new(error, failure_message))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        self.error.log();
        let status = self.status_code();
        (status, Json(MessageResponse::new(self.message()))).into_response()
    }
}
