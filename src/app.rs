// src/app.rs

use axum::{
    Router,
    extract::Extension,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::auth::services::AuthService;
use crate::handlers::auth::{login, logout, refresh_token, register};
use crate::handlers::health::health;
use crate::handlers::user::get_current_user;

/// Configure les routes d'authentification.
///
/// All of them are public: refresh and logout authenticate with the refresh cookie.
pub fn auth_routes(auth_service: Arc<AuthService>) -> Router {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/refresh", post(refresh_token))
        .route("/logout", post(logout))
        .with_state(auth_service)
}

/// Routes behind `Authorization: Bearer <access token>`.
pub fn user_routes(auth_service: Arc<AuthService>) -> Router {
    let jwt_manager = auth_service.jwt_manager().clone();

    Router::new()
        .route("/me", get(get_current_user))
        // Fournit JwtManager en state pour l'extracteur AuthClaims
        .with_state(jwt_manager)
        .layer(Extension(auth_service))
}

/// Construit l'application complète
pub fn build_router(auth_service: Arc<AuthService>) -> Router {
    Router::new()
        .route("/health", get(health))
        .nest("/auth", auth_routes(auth_service.clone()))
        .nest("/users", user_routes(auth_service))
        .layer(TraceLayer::new_for_http())
}
