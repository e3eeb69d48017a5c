use axum::extract::Extension;
use std::sync::Arc;
use workout_tracker_api::UserResponse;

use super::blocking;
use crate::auth::extractors::AuthClaims;
use crate::auth::services::AuthService;
use crate::error::AppError;
use crate::response::AppResponse;

/// GET /users/me
/// Récupère le profil de l'utilisateur courant
pub async fn get_current_user(
    claims: AuthClaims,
    Extension(service): Extension<Arc<AuthService>>,
) -> Result<AppResponse<UserResponse>, AppError> {
    let user = blocking(move || service.current_user(claims.user_id)).await?;
    Ok(AppResponse::ok(user))
}
