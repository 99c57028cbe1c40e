// Authentication module
// Username/password registration, JWT bearer tokens, and cookie sessions for logout

pub mod clock;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod password;
pub mod repository;
pub mod service;
pub mod token;

#[cfg(test)]
pub mod testing;

// Re-export commonly used types
pub use clock::{Clock, SystemClock};
pub use error::AuthError;
pub use handlers::{login_handler, logout_handler, profile_handler, register_handler};
pub use middleware::{session_id, AuthenticatedUser, SESSION_COOKIE_NAME};
pub use models::{CredentialsRequest, LoginResponse, MessageResponse, ProfileResponse, UserResponse};
pub use password::{HashingCost, PasswordService};
pub use repository::{CredentialStore, SessionRepository, SessionStore, UserRepository};
pub use service::{AuthService, LoginOutcome};
pub use token::{Claims, TokenService, TokenValidator};
