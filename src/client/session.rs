// Client session lifecycle: login, logout, startup resolution and auto-expiry

use crate::auth::models::{CredentialsRequest, UserResponse};
use crate::client::{
    api::{AuthApi, HttpAuthApi},
    error::ClientError,
    state::{ClientAuthState, SessionPhase},
    storage::{FileTokenStorage, TokenStorage, TOKEN_KEY},
};
use crate::config::ClientConfig;
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Status message after an explicit logout
pub const LOGGED_OUT: &str = "Logged out";
/// Status message after the expiry timer fired
pub const SESSION_EXPIRED: &str = "Session expired";

#[derive(Default)]
struct ExpiryTimer {
    generation: u64,
    handle: Option<JoinHandle<()>>,
}

struct Inner {
    api: Arc<dyn AuthApi>,
    storage: Arc<dyn TokenStorage>,
    session_ttl: Duration,
    // Held for the whole of each operation, so the timer never interleaves with a login
    op_lock: Mutex<()>,
    state: Mutex<ClientAuthState>,
    timer: Mutex<ExpiryTimer>,
}

/// Client half of the auth flow.
///
/// The client runs its own expiry timer of the same length as the token
/// lifetime. The timer does not consult the server: when it fires the
/// client logs out with [`SESSION_EXPIRED`], whatever the token's real state.
#[derive(Clone)]
pub struct AuthClient {
    inner: Arc<Inner>,
}

impl AuthClient {
    pub fn new(api: Arc<dyn AuthApi>, storage: Arc<dyn TokenStorage>, session_ttl: Duration) -> Self {
        Self {
            inner: Arc::new(Inner {
                api,
                storage,
                session_ttl,
                op_lock: Mutex::new(()),
                state: Mutex::new(ClientAuthState::default()),
                timer: Mutex::new(ExpiryTimer::default()),
            }),
        }
    }

    /// HTTP client with file-backed token storage
    pub fn from_config(config: &ClientConfig) -> Result<Self, ClientError> {
        Ok(Self::new(
            Arc::new(HttpAuthApi::new(config.base_url.clone())?),
            Arc::new(FileTokenStorage::new(config.storage_path.clone())),
            config.session_ttl,
        ))
    }

    /// Snapshot of the current state
    pub async fn state(&self) -> ClientAuthState {
        self.inner.state.lock().await.clone()
    }

    /// Register a user. Does not log in.
    ///
    /// A server-side refusal comes back as [`ClientError::Rejected`];
    /// anything else is a transport failure.
    pub async fn register(&self, username: &str, password: &str) -> Result<String, ClientError> {
        let _op = self.inner.op_lock.lock().await;
        let request = credentials(username, password);

        let result = self.inner.api.register(&request).await;
        let message = match &result {
            Ok(response) => response.message.clone(),
            Err(e) => e.user_message("Registration failed"),
        };
        self.inner.state.lock().await.message = message;

        result.map(|response| response.message)
    }

    /// Log in, store the token and start the expiry timer
    pub async fn login(&self, username: &str, password: &str) -> Result<UserResponse, ClientError> {
        let _op = self.inner.op_lock.lock().await;
        let request = credentials(username, password);

        let previous = {
            let mut state = self.inner.state.lock().await;
            let previous = state.clone();
            set_phase(&mut state, SessionPhase::Authenticating);
            previous
        };

        match self.inner.api.login(&request).await {
            Ok(response) => {
                if let Err(e) = self.inner.storage.set(TOKEN_KEY, &response.token) {
                    warn!("Could not persist token: {}", e);
                }
                self.enter_authenticated(response.user.clone(), response.token).await;
                info!("Logged in as {}", response.user.username);
                Ok(response.user)
            }
            Err(e) => {
                let mut state = self.inner.state.lock().await;
                set_phase(&mut state, previous.phase);
                state.user = previous.user;
                state.token = previous.token;
                state.message = e.user_message("Login failed");
                Err(e)
            }
        }
    }

    /// Log out with a user-visible `reason`.
    ///
    /// Local state is always cleared. The server call is best effort; its
    /// error, if any, is returned after the local cleanup.
    pub async fn logout(&self, reason: &str) -> Result<(), ClientError> {
        let _op = self.inner.op_lock.lock().await;
        self.cancel_timer().await;
        self.end_session(SessionPhase::LoggedOut, reason).await
    }

    /// Restore a session from the stored token on startup.
    ///
    /// Returns whether the client is now authenticated. A missing, expired
    /// or rejected token is not an error; it is cleared and the client stays
    /// anonymous.
    pub async fn resolve_session(&self) -> bool {
        let _op = self.inner.op_lock.lock().await;

        let token = match self.inner.storage.get(TOKEN_KEY) {
            Ok(Some(token)) => token,
            Ok(None) => return false,
            Err(e) => {
                warn!("Could not read stored token: {}", e);
                return false;
            }
        };

        set_phase(&mut *self.inner.state.lock().await, SessionPhase::Authenticating);

        match self.inner.api.profile(&token).await {
            Ok(profile) => {
                info!("Restored session for {}", profile.user.username);
                self.enter_authenticated(profile.user, token).await;
                true
            }
            Err(e) => {
                debug!("Token may be expired or invalid: {}", e);
                self.cancel_timer().await;
                if let Err(e) = self.inner.storage.remove(TOKEN_KEY) {
                    warn!("Could not clear stored token: {}", e);
                }
                let mut state = self.inner.state.lock().await;
                set_phase(&mut state, SessionPhase::Anonymous);
                state.user = None;
                state.token = None;
                false
            }
        }
    }

    async fn enter_authenticated(&self, user: UserResponse, token: String) {
        {
            let mut state = self.inner.state.lock().await;
            set_phase(&mut state, SessionPhase::Authenticated);
            state.message = format!("Welcome back, {}", user.username);
            state.user = Some(user);
            state.token = Some(token);
        }
        self.start_timer().await;
    }

    /// Replace any running expiry timer with a fresh one
    async fn start_timer(&self) {
        let mut timer = self.inner.timer.lock().await;
        if let Some(handle) = timer.handle.take() {
            handle.abort();
        }
        timer.generation += 1;

        let generation = timer.generation;
        let ttl = self.inner.session_ttl;
        let inner: Weak<Inner> = Arc::downgrade(&self.inner);

        timer.handle = Some(tokio::spawn(async move {
            tokio::time::sleep(ttl).await;
            if let Some(inner) = inner.upgrade() {
                AuthClient { inner }.expire(generation).await;
            }
        }));
        debug!("Session expiry timer started ({:?})", ttl);
    }

    async fn cancel_timer(&self) {
        let mut timer = self.inner.timer.lock().await;
        timer.generation += 1;
        if let Some(handle) = timer.handle.take() {
            handle.abort();
        }
    }

    /// Called by the timer task when its countdown ends
    async fn expire(&self, generation: u64) {
        let _op = self.inner.op_lock.lock().await;
        {
            let mut timer = self.inner.timer.lock().await;
            if timer.generation != generation {
                // Superseded by a newer login or an explicit logout
                return;
            }
            // Dropped, not aborted: this is the running task
            timer.handle = None;
        }

        info!("Session expired");
        if let Err(e) = self.end_session(SessionPhase::Expired, SESSION_EXPIRED).await {
            warn!("Logout after expiry failed on the server: {}", e);
        }
    }

    async fn end_session(&self, exit_phase: SessionPhase, reason: &str) -> Result<(), ClientError> {
        let server_result = self.inner.api.logout().await.map(|_| ());

        if let Err(e) = self.inner.storage.remove(TOKEN_KEY) {
            warn!("Could not clear stored token: {}", e);
        }

        let mut state = self.inner.state.lock().await;
        set_phase(&mut state, exit_phase);
        set_phase(&mut state, SessionPhase::Anonymous);
        state.user = None;
        state.token = None;
        state.message = reason.to_string();

        server_result
    }
}

fn credentials(username: &str, password: &str) -> CredentialsRequest {
    CredentialsRequest {
        username: username.to_string(),
        password: password.to_string(),
    }
}

/// Apply a transition, logging (and otherwise ignoring) one the machine refuses
fn set_phase(state: &mut ClientAuthState, to: SessionPhase) {
    if let Err(e) = state.advance(to) {
        warn!("{}", e);
    }
}
