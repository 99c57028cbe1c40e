// Request extractors for bearer tokens and the session cookie

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use crate::auth::{error::AuthError, models::UserResponse, service::{AuthService, SESSION_TTL_SECONDS}};
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

/// Name of the cookie carrying the server session id
pub const SESSION_COOKIE_NAME: &str = "userId";

/// Authenticated user extractor for protected routes
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub UserResponse);

/// Pull the token out of an `Authorization: Bearer <token>` header
pub fn bearer_token(parts: &Parts) -> Result<&str, AuthError> {
    let auth_header = parts
        .headers
        .get(header::AUTHORIZATION)
        .ok_or(AuthError::MissingToken)?
        .to_str()
        .map_err(|_| AuthError::TokenInvalid)?;

    auth_header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or(AuthError::TokenInvalid)
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthenticatedUser
where
    Arc<AuthService>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts).map_err(AuthError::into_unauthorized)?;
        let service = Arc::<AuthService>::from_ref(state);

        let user = service.authenticate(token).await?;
        debug!("Bearer token accepted for user_id={}", user.id);
        Ok(AuthenticatedUser(user))
    }
}

/// Session id from the `userId` cookie, if present and well formed
pub fn session_id(jar: &CookieJar) -> Option<Uuid> {
    jar.get(SESSION_COOKIE_NAME)
        .and_then(|cookie| Uuid::parse_str(cookie.value()).ok())
}

fn base_cookie(value: String) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE_NAME, value))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build()
}

/// Cookie opening a session; lives as long as the server-side row
pub fn session_cookie(id: Uuid) -> Cookie<'static> {
    let mut cookie = base_cookie(id.to_string());
    cookie.set_max_age(time::Duration::seconds(SESSION_TTL_SECONDS));
    cookie
}

/// Cookie overwriting the session cookie with an already expired one
pub fn clear_session_cookie() -> Cookie<'static> {
    let mut cookie = base_cookie(String::new());
    cookie.set_max_age(time::Duration::ZERO);
    cookie
}
