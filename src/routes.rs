// Route table and shared application state

use axum::{
    extract::FromRef,
    http::{header, HeaderValue, Method},
    routing::{get, post},
    Router,
};
use crate::auth::{
    self,
    models::{CredentialsRequest, LoginResponse, MessageResponse, ProfileResponse, UserResponse},
    AuthService,
};
use std::sync::Arc;
use tower_http::{
    cors::CorsLayer,
    trace::TraceLayer,
};
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

/// OpenAPI documentation structure
#[derive(OpenApi)]
#[openapi(
    paths(
        auth::handlers::register_handler,
        auth::handlers::login_handler,
        auth::handlers::logout_handler,
        auth::handlers::profile_handler,
    ),
    components(
        schemas(CredentialsRequest, LoginResponse, MessageResponse, ProfileResponse, UserResponse)
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "user", description = "Registration, login, logout and profile")
    ),
    info(
        title = "Session Auth API",
        version = "0.1.0",
        description = "Username/password authentication with short-lived bearer tokens"
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<AuthService>,
}

impl AppState {
    pub fn new(auth: Arc<AuthService>) -> Self {
        Self { auth }
    }
}

impl FromRef<AppState> for Arc<AuthService> {
    fn from_ref(state: &AppState) -> Self {
        state.auth.clone()
    }
}

/// Creates the application router.
/// Each method + path maps straight to one auth operation.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/user/register", post(auth::register_handler))
        .route("/user/login", post(auth::login_handler))
        .route("/user/logout", post(auth::logout_handler))
        .route("/user/profile", get(auth::profile_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// CORS for a single browser origin, with cookies allowed
pub fn cors_layer(origin: &str) -> Result<CorsLayer, header::InvalidHeaderValue> {
    Ok(CorsLayer::new()
        .allow_origin(HeaderValue::from_str(origin)?)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_credentials(true))
}
