// Client side of the auth flow
// Keeps the bearer token in durable storage and mirrors the server's
// two-minute expiry with its own timer.

pub mod api;
pub mod error;
pub mod session;
pub mod state;
pub mod storage;

pub use api::{AuthApi, HttpAuthApi};
pub use error::ClientError;
pub use session::{AuthClient, LOGGED_OUT, SESSION_EXPIRED};
pub use state::{ClientAuthState, PhaseMachine, SessionPhase};
pub use storage::{FileTokenStorage, MemoryTokenStorage, TokenStorage, TOKEN_KEY};
