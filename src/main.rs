mod app;
mod auth;
mod config;
mod db;
mod error;
mod handlers;
mod response;

use std::sync::Arc;

use app::build_router;
use auth::jwt::JwtManager;
use auth::password::PasswordManager;
use auth::services::AuthService;
use config::Config;
use db::repositories::refresh_token_repository::RefreshTokenRepository;
use db::repositories::user_repository::UserRepository;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub fn setup_logging() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        // Si RUST_LOG n'est pas défini, utiliser ces règles par défaut
        tracing_subscriber::EnvFilter::new("info,workout_tracker=debug,tower_http=info")
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn build_auth_service(config: &Config) -> Result<AuthService, lambda_http::Error> {
    let pool = db::connection::create_pool(&config.database_url, config.db_pool_size)?;

    let jwt_manager = JwtManager::new(&config.jwt_secret, config.access_token_ttl)?;

    Ok(AuthService::new(
        jwt_manager,
        PasswordManager::new(config.bcrypt_cost),
        Arc::new(UserRepository::new(pool.clone())),
        Arc::new(RefreshTokenRepository::new(pool)),
    )
    .with_refresh_ttl(config.refresh_token_ttl))
}

// ----------------- Main -----------------

#[tokio::main]
async fn main() -> Result<(), lambda_http::Error> {
    setup_logging();
    tracing::info!("Starting workout-tracker...");

    let config = Config::from_env()?;
    let auth_service = build_auth_service(&config)?;
    tracing::info!(
        environment = config.environment.as_str(),
        "Auth service ready"
    );
    let app = build_router(Arc::new(auth_service));

    if std::env::var("AWS_LAMBDA_FUNCTION_NAME").is_ok() {
        tracing::info!("Running in Lambda mode");
        lambda_http::run(app).await
    } else {
        tracing::info!("Running in local HTTP server mode");
        let addr = config.server_addr();
        let listener = tokio::net::TcpListener::bind(&addr).await?;
        tracing::info!("🚀 Server running at http://{}", addr);
        axum::serve(listener, app).await?;

        Ok(())
    }
}
