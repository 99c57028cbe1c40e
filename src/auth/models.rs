// Authentication data models and DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Stored credential row
#[derive(Clone, FromRow)]
pub struct Credential {
    pub id: i32,
    pub username: String,
    pub password_hash: String,
}

// Hand-written so the hash never reaches a log line
impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("id", &self.id)
            .field("username", &self.username)
            .field("password_hash", &"<redacted>")
            .finish()
    }
}

/// Public identity (excludes password_hash)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct UserResponse {
    pub id: i32,
    pub username: String,
}

impl From<Credential> for UserResponse {
    fn from(credential: Credential) -> Self {
        Self {
            id: credential.id,
            username: credential.username,
        }
    }
}

/// Server-side cookie session.
///
/// `id` is only ever handed to the client in the session cookie; the store
/// keeps a SHA-256 digest of it.
#[derive(Debug, Clone)]
pub struct Session {
    pub id: Uuid,
    pub user_id: i32,
    pub expires_at: DateTime<Utc>,
}

/// Register / login request body
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CredentialsRequest {
    #[validate(length(min = 1, max = 255, message = "Username must be 1 to 255 characters"))]
    pub username: String,
    pub password: String,
}

/// Successful login response
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LoginResponse {
    pub token: String,
    pub user: UserResponse,
}

/// Protected profile response
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ProfileResponse {
    pub message: String,
    pub user: UserResponse,
}

/// Plain `{message}` body used for acknowledgments and failures
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
