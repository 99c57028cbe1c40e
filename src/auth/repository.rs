// Credential and session stores

use crate::auth::{
    error::AuthError,
    models::{Credential, Session, UserResponse},
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use sqlx::PgPool;
use uuid::Uuid;

/// Persistence of username → password hash
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Create a credential; fails with `DuplicateUsername` if the name is taken
    async fn create(&self, username: &str, password_hash: &str) -> Result<Credential, AuthError>;

    async fn find_by_username(&self, username: &str) -> Result<Option<Credential>, AuthError>;

    /// Identity lookup; never returns the hash
    async fn find_by_id(&self, id: i32) -> Result<Option<UserResponse>, AuthError>;
}

/// Server-side cookie sessions
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn create(&self, user_id: i32, expires_at: DateTime<Utc>) -> Result<Session, AuthError>;

    /// Remove a session; returns whether one existed
    async fn delete(&self, session_id: Uuid) -> Result<bool, AuthError>;

    /// Remove every session that expired before `now`
    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<u64, AuthError>;
}

/// Hash a session id using SHA-256
pub(crate) fn hash_session_id(session_id: Uuid) -> String {
    let mut hasher = Sha256::new();
    hasher.update(session_id.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// PostgreSQL credential store
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CredentialStore for UserRepository {
    async fn create(&self, username: &str, password_hash: &str) -> Result<Credential, AuthError> {
        // The UNIQUE constraint on username decides concurrent registrations;
        // the violation is mapped to DuplicateUsername by From<sqlx::Error>
        let credential = sqlx::query_as::<_, Credential>(
            "INSERT INTO users (username, password_hash) VALUES ($1, $2) RETURNING id, username, password_hash",
        )
        .bind(username)
        .bind(password_hash)
        .fetch_one(&self.pool)
        .await?;

        Ok(credential)
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<Credential>, AuthError> {
        let credential = sqlx::query_as::<_, Credential>(
            "SELECT id, username, password_hash FROM users WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(credential)
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<UserResponse>, AuthError> {
        let user = sqlx::query_as::<_, UserResponse>("SELECT id, username FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }
}

/// PostgreSQL session store (session ids are stored hashed with SHA-256)
#[derive(Clone)]
pub struct SessionRepository {
    pool: PgPool,
}

impl SessionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SessionStore for SessionRepository {
    async fn create(&self, user_id: i32, expires_at: DateTime<Utc>) -> Result<Session, AuthError> {
        let session_id = Uuid::new_v4();

        sqlx::query("INSERT INTO sessions (id_hash, user_id, expires_at) VALUES ($1, $2, $3)")
            .bind(hash_session_id(session_id))
            .bind(user_id)
            .bind(expires_at)
            .execute(&self.pool)
            .await
            .map_err(|e| AuthError::StoreUnavailable(e.to_string()))?;

        Ok(Session {
            id: session_id,
            user_id,
            expires_at,
        })
    }

    async fn delete(&self, session_id: Uuid) -> Result<bool, AuthError> {
        let result = sqlx::query("DELETE FROM sessions WHERE id_hash = $1")
            .bind(hash_session_id(session_id))
            .execute(&self.pool)
            .await
            .map_err(|e| AuthError::StoreUnavailable(e.to_string()))?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<u64, AuthError> {
        let result = sqlx::query("DELETE FROM sessions WHERE expires_at <= $1")
            .bind(now)
            .execute(&self.pool)
            .await
            .map_err(|e| AuthError::StoreUnavailable(e.to_string()))?;

        Ok(result.rows_affected())
    }
}
