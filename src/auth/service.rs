// Authentication service - business logic layer

use crate::auth::{
    clock::Clock,
    error::AuthError,
    models::{LoginResponse, Session, UserResponse},
    password::PasswordService,
    repository::{CredentialStore, SessionStore},
    token::{TokenService, TokenValidator},
};
use chrono::Duration;
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

/// Lifetime of a server-side cookie session
pub const SESSION_TTL_SECONDS: i64 = 120;

/// Result of a successful login: the bearer token response plus the cookie session
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub response: LoginResponse,
    pub session: Session,
}

/// Authentication service coordinating all auth operations
pub struct AuthService {
    users: Arc<dyn CredentialStore>,
    sessions: Arc<dyn SessionStore>,
    passwords: PasswordService,
    tokens: TokenService,
    clock: Arc<dyn Clock>,
}

impl AuthService {
    pub fn new(
        users: Arc<dyn CredentialStore>,
        sessions: Arc<dyn SessionStore>,
        passwords: PasswordService,
        tokens: TokenService,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            users,
            sessions,
            passwords,
            tokens,
            clock,
        }
    }

    /// Register a new user. Does not log the user in.
    pub async fn register(&self, username: &str, password: &str) -> Result<UserResponse, AuthError> {
        let password_hash = self.passwords.hash_blocking(password.to_string()).await?;
        let credential = self.users.create(username, &password_hash).await?;

        info!("Registered user {} with id {}", credential.username, credential.id);
        Ok(credential.into())
    }

    /// Login a user, issuing a bearer token and opening a cookie session
    pub async fn login(&self, username: &str, password: &str) -> Result<LoginOutcome, AuthError> {
        let credential = self
            .users
            .find_by_username(username)
            .await?
            .ok_or(AuthError::UnknownUser)?;

        let matches = self
            .passwords
            .verify_blocking(password.to_string(), credential.password_hash.clone())
            .await?;
        if !matches {
            return Err(AuthError::BadCredentials);
        }

        let user = UserResponse::from(credential);
        let token = self.tokens.issue(&user)?;
        let session = self
            .sessions
            .create(user.id, self.clock.now() + Duration::seconds(SESSION_TTL_SECONDS))
            .await?;

        info!("User {} logged in", user.username);
        Ok(LoginOutcome {
            response: LoginResponse { token, user },
            session,
        })
    }

    /// End the cookie session, if there is one.
    ///
    /// Succeeds whether or not a session existed.
    pub async fn logout(&self, session_id: Option<Uuid>) -> Result<(), AuthError> {
        match session_id {
            Some(id) => {
                let existed = self.sessions.delete(id).await?;
                debug!("Logout for session (existed: {})", existed);
            }
            None => debug!("Logout without a session cookie"),
        }
        Ok(())
    }

    /// Resolve the identity behind a bearer token.
    ///
    /// Any failure (bad token, expired token, unknown id, store error) is
    /// reported as `Unauthorized`.
    pub async fn authenticate(&self, token: &str) -> Result<UserResponse, AuthError> {
        let claims = self
            .tokens
            .validate(token)
            .map_err(AuthError::into_unauthorized)?;

        self.users
            .find_by_id(claims.id)
            .await
            .map_err(AuthError::into_unauthorized)?
            .ok_or(AuthError::Unauthorized)
    }

    /// Drop cookie sessions past their expiry
    pub async fn purge_expired_sessions(&self) -> Result<u64, AuthError> {
        self.sessions.delete_expired(self.clock.now()).await
    }
}
