use session_auth::{
    auth::{AuthService, Clock, PasswordService, SessionRepository, SystemClock, TokenService, UserRepository},
    config::AppConfig,
    db,
    routes::{cors_layer, create_router, AppState},
};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// How often expired cookie sessions are removed
const SESSION_PURGE_INTERVAL: Duration = Duration::from_secs(60);

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .with_level(true)
        .init();

    tracing::info!("Session Auth API - Starting...");

    let config = AppConfig::from_env()?;

    tracing::info!("Connecting to database...");
    let db_pool = db::create_pool(&config.database_url, config.db_max_connections).await?;
    db::run_migrations(&db_pool).await?;

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let auth = Arc::new(AuthService::new(
        Arc::new(UserRepository::new(db_pool.clone())),
        Arc::new(SessionRepository::new(db_pool)),
        PasswordService::new(config.hashing_cost)?,
        TokenService::new(&config.jwt_secret, clock.clone()),
        clock,
    ));

    spawn_session_purge(auth.clone());

    let app = create_router(AppState::new(auth)).layer(cors_layer(&config.cors_origin)?);

    let addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Session Auth API is running on http://{}", addr);
    tracing::info!("Swagger UI available at http://{}/swagger-ui", addr);

    axum::serve(listener, app).await?;
    Ok(())
}

fn spawn_session_purge(auth: Arc<AuthService>) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(SESSION_PURGE_INTERVAL);
        loop {
            interval.tick().await;
            match auth.purge_expired_sessions().await {
                Ok(0) => {}
                Ok(removed) => tracing::debug!("Purged {} expired sessions", removed),
                Err(e) => tracing::warn!("Session purge failed: {}", e),
            }
        }
    });
}
