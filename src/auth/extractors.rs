use axum::extract::FromRequestParts;
use axum::http::{header, request::Parts};

use crate::auth::jwt::{Claims, JwtManager};
use crate::error::AppError;

const BEARER: &str = "Bearer ";

/// Extracteur d'authentification pour les routes protégées.
///
/// Verifies `Authorization: Bearer <JWT>` with `JwtManager` and exposes the
/// typed user id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthClaims {
    pub user_id: i64,
    pub iat: i64,
    pub exp: i64,
}

impl TryFrom<Claims> for AuthClaims {
    type Error = AppError;

    fn try_from(c: Claims) -> Result<Self, Self::Error> {
        Ok(Self {
            user_id: c.user_id().ok_or(AppError::InvalidToken)?,
            iat: c.iat,
            exp: c.exp,
        })
    }
}

fn bearer_token(parts: &Parts) -> Option<&str> {
    let value = parts.headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix(BEARER)?.trim();
    (!token.is_empty()).then_some(token)
}

/// Implémentation de l'extracteur pour un router ayant `JwtManager` comme state.
impl FromRequestParts<JwtManager> for AuthClaims {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        jwt_manager: &JwtManager,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts).ok_or(AppError::InvalidToken)?;
        let claims = jwt_manager.verify(token)?;
        AuthClaims::try_from(claims)
    }
}
