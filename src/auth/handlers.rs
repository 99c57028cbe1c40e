// HTTP handlers for the /user endpoints

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use axum_extra::extract::cookie::CookieJar;
use crate::auth::{
    error::AuthError,
    middleware::{clear_session_cookie, session_cookie, session_id, AuthenticatedUser},
    models::{CredentialsRequest, MessageResponse, ProfileResponse},
    service::AuthService,
};
use crate::error::{ApiError, FailureContext};
use std::sync::Arc;
use validator::Validate;

/// Register a new user
/// POST /user/register
#[utoipa::path(
    post,
    path = "/user/register",
    request_body = CredentialsRequest,
    responses(
        (status = 201, description = "User registered", body = MessageResponse, example = json!({"message": "Welcome aboard alice"})),
        (status = 400, description = "Invalid request body", body = MessageResponse),
        (status = 500, description = "Duplicate username or store error", body = MessageResponse, example = json!({"message": "Registration failed"}))
    ),
    tag = "user"
)]
pub async fn register_handler(
    State(service): State<Arc<AuthService>>,
    body: Result<Json<CredentialsRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<MessageResponse>), ApiError> {
    const FAILURE: &str = "Registration failed";
    let Json(request) = body.map_err(AuthError::from).or_fail_with(FAILURE)?;
    tracing::debug!("Registering user: {}", request.username);

    request.validate().map_err(AuthError::from).or_fail_with(FAILURE)?;
    let user = service
        .register(&request.username, &request.password)
        .await
        .or_fail_with(FAILURE)?;

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::new(format!("Welcome aboard {}", user.username))),
    ))
}

/// Login a user
/// POST /user/login
#[utoipa::path(
    post,
    path = "/user/login",
    request_body = CredentialsRequest,
    responses(
        (status = 200, description = "Token issued and session cookie set", body = LoginResponse),
        (status = 400, description = "Unreadable request body", body = MessageResponse),
        (status = 401, description = "Unknown user or incorrect password", body = MessageResponse, example = json!({"message": "Incorrect username or password"})),
        (status = 500, description = "Store error", body = MessageResponse, example = json!({"message": "Login failed"}))
    ),
    tag = "user"
)]
pub async fn login_handler(
    State(service): State<Arc<AuthService>>,
    jar: CookieJar,
    body: Result<Json<CredentialsRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    const FAILURE: &str = "Login failed";

    // No username rules here: an unknown name is reported as such
    let Json(request) = body.map_err(AuthError::from).or_fail_with(FAILURE)?;
    let outcome = service
        .login(&request.username, &request.password)
        .await
        .or_fail_with(FAILURE)?;

    Ok((jar.add(session_cookie(outcome.session.id)), Json(outcome.response)))
}

/// End the cookie session
/// POST /user/logout
#[utoipa::path(
    post,
    path = "/user/logout",
    responses(
        (status = 200, description = "Session cleared", body = MessageResponse, example = json!({"message": "Logged out"})),
        (status = 500, description = "Store error", body = MessageResponse, example = json!({"message": "Logout failed"}))
    ),
    tag = "user"
)]
pub async fn logout_handler(
    State(service): State<Arc<AuthService>>,
    jar: CookieJar,
) -> Result<impl IntoResponse, ApiError> {
    service
        .logout(session_id(&jar))
        .await
        .or_fail_with("Logout failed")?;

    Ok((
        jar.add(clear_session_cookie()),
        Json(MessageResponse::new("Logged out")),
    ))
}

/// Current user (protected endpoint)
/// GET /user/profile
#[utoipa::path(
    get,
    path = "/user/profile",
    responses(
        (status = 200, description = "Identity behind the bearer token", body = ProfileResponse),
        (status = 401, description = "Missing, invalid or expired token", body = MessageResponse, example = json!({"message": "Unauthorized"}))
    ),
    security(("bearer_auth" = [])),
    tag = "user"
)]
pub async fn profile_handler(AuthenticatedUser(user): AuthenticatedUser) -> Json<ProfileResponse> {
    Json(ProfileResponse {
        message: "Protected route accessed".to_string(),
        user,
    })
}
