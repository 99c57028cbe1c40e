// In-memory stores and service builders for tests

use crate::auth::{
    clock::{Clock, MockClock},
    error::AuthError,
    models::{Credential, Session, UserResponse},
    password::{HashingCost, PasswordService},
    repository::{hash_session_id, CredentialStore, SessionStore},
    service::AuthService,
    token::TokenService,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

pub const TEST_SECRET: &str = "test_secret_key_for_testing_purposes";

/// Credential store backed by a Vec; the mutex makes the uniqueness check atomic
#[derive(Default)]
pub struct MemoryCredentialStore {
    rows: Mutex<Vec<Credential>>,
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn create(&self, username: &str, password_hash: &str) -> Result<Credential, AuthError> {
        let mut rows = self.rows.lock().unwrap();
        if rows.iter().any(|row| row.username == username) {
            return Err(AuthError::DuplicateUsername);
        }
        let credential = Credential {
            id: rows.len() as i32 + 1,
            username: username.to_string(),
            password_hash: password_hash.to_string(),
        };
        rows.push(credential.clone());
        Ok(credential)
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<Credential>, AuthError> {
        let rows = self.rows.lock().unwrap();
        Ok(rows.iter().find(|row| row.username == username).cloned())
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<UserResponse>, AuthError> {
        let rows = self.rows.lock().unwrap();
        Ok(rows
            .iter()
            .find(|row| row.id == id)
            .cloned()
            .map(UserResponse::from))
    }
}

/// Session store keyed by hashed session id, like the SQL table
#[derive(Default)]
pub struct MemorySessionStore {
    sessions: Mutex<HashMap<String, Session>>,
}

impl MemorySessionStore {
    pub fn len(&self) -> usize {
        self.sessions.lock().unwrap().len()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn create(&self, user_id: i32, expires_at: DateTime<Utc>) -> Result<Session, AuthError> {
        let session = Session {
            id: Uuid::new_v4(),
            user_id,
            expires_at,
        };
        self.sessions
            .lock()
            .unwrap()
            .insert(hash_session_id(session.id), session.clone());
        Ok(session)
    }

    async fn delete(&self, session_id: Uuid) -> Result<bool, AuthError> {
        Ok(self
            .sessions
            .lock()
            .unwrap()
            .remove(&hash_session_id(session_id))
            .is_some())
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<u64, AuthError> {
        let mut sessions = self.sessions.lock().unwrap();
        let before = sessions.len();
        sessions.retain(|_, session| session.expires_at > now);
        Ok((before - sessions.len()) as u64)
    }
}

pub fn test_password_service() -> PasswordService {
    PasswordService::new(HashingCost {
        iterations: 1,
        memory_kib: 1024,
    })
    .unwrap()
}

pub fn test_service_with_clock(
    clock: Arc<MockClock>,
) -> (Arc<AuthService>, Arc<MemorySessionStore>) {
    let sessions = Arc::new(MemorySessionStore::default());
    let clock: Arc<dyn Clock> = clock;
    let service = AuthService::new(
        Arc::new(MemoryCredentialStore::default()),
        sessions.clone(),
        test_password_service(),
        TokenService::new(TEST_SECRET, clock.clone()),
        clock,
    );
    (Arc::new(service), sessions)
}

pub fn test_service() -> (Arc<AuthService>, Arc<MemorySessionStore>) {
    test_service_with_clock(Arc::new(MockClock::new()))
}
