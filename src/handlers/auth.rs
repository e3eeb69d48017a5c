// src/handlers/auth.rs

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::{HeaderMap, HeaderValue, header};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use workout_tracker_api::{AccessTokenResponse, CredentialsRequest, RegisterResponse};

use super::blocking;
use crate::auth::services::{AuthService, IssuedTokens};
use crate::error::AppError;
use crate::response::AppResponse;

pub const REFRESH_COOKIE: &str = "refresh_token";
/// Sent back on both `/auth/refresh` and `/auth/logout`.
const REFRESH_COOKIE_PATH: &str = "/auth";
const CLEARED_REFRESH_COOKIE: &str = "refresh_token=; HttpOnly; Secure; SameSite=Lax; Path=/auth; Max-Age=0; Expires=Thu, 01 Jan 1970 00:00:00 GMT";

/// POST /auth/register
/// Inscription d'un nouvel utilisateur
pub async fn register(
    State(service): State<Arc<AuthService>>,
    payload: Result<Json<CredentialsRequest>, JsonRejection>,
) -> Result<AppResponse<RegisterResponse>, AppError> {
    let Json(payload) = payload?;

    let user_id = blocking(move || service.register(&payload.name, &payload.password)).await?;
    Ok(AppResponse::created(RegisterResponse { user_id }))
}

/// POST /auth/login
/// Connexion d'un utilisateur
///
/// The refresh secret is set as an HttpOnly cookie.
pub async fn login(
    State(service): State<Arc<AuthService>>,
    payload: Result<Json<CredentialsRequest>, JsonRejection>,
) -> Result<AppResponse<AccessTokenResponse>, AppError> {
    let Json(payload) = payload?;

    let tokens = blocking(move || service.login(&payload.name, &payload.password)).await?;
    token_response(tokens)
}

/// POST /auth/refresh
/// Rotates the refresh cookie. A missing or rejected cookie is cleared.
pub async fn refresh_token(
    State(service): State<Arc<AuthService>>,
    headers: HeaderMap,
) -> Result<AppResponse<AccessTokenResponse>, (HeaderMap, AppError)> {
    let Some(raw) = read_refresh_cookie(&headers) else {
        return Err((cleared_cookie(), AppError::MissingRefreshToken));
    };

    match blocking(move || service.refresh(&raw)).await {
        Ok(tokens) => token_response(tokens).map_err(|e| (HeaderMap::new(), e)),
        Err(e @ (AppError::MissingRefreshToken | AppError::InvalidRefreshToken)) => {
            Err((cleared_cookie(), e))
        }
        Err(e) => Err((HeaderMap::new(), e)),
    }
}

/// POST /auth/logout
/// Revokes the refresh cookie if there is one. Always clears it.
pub async fn logout(
    State(service): State<Arc<AuthService>>,
    headers: HeaderMap,
) -> Result<AppResponse<()>, (HeaderMap, AppError)> {
    let raw = read_refresh_cookie(&headers);

    blocking(move || service.logout(raw.as_deref()))
        .await
        .map_err(|e| (cleared_cookie(), e))?;

    Ok(AppResponse::no_content().with_headers(cleared_cookie()))
}

fn token_response(tokens: IssuedTokens) -> Result<AppResponse<AccessTokenResponse>, AppError> {
    let cookie = refresh_cookie(&tokens.refresh_token, tokens.refresh_expires_at)?;
    Ok(
        AppResponse::ok(AccessTokenResponse::bearer(tokens.access_token, tokens.expires_in))
            .with_headers(cookie),
    )
}

fn refresh_cookie(raw: &str, expires_at: DateTime<Utc>) -> Result<HeaderMap, AppError> {
    let cookie_val = format!(
        "{REFRESH_COOKIE}={raw}; HttpOnly; Secure; SameSite=Lax; Path={REFRESH_COOKIE_PATH}; Expires={}",
        expires_at.format("%a, %d %b %Y %H:%M:%S GMT")
    );

    let mut headers = HeaderMap::new();
    headers.insert(
        header::SET_COOKIE,
        HeaderValue::from_str(&cookie_val).map_err(|_| AppError::internal("Failed to set cookie"))?,
    );
    Ok(headers)
}

fn cleared_cookie() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        header::SET_COOKIE,
        HeaderValue::from_static(CLEARED_REFRESH_COOKIE),
    );
    headers
}

/// Reads the `refresh_token` cookie from any `Cookie` header.
fn read_refresh_cookie(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|h| h.to_str().ok())
        .flat_map(|raw_cookie| raw_cookie.split(';'))
        .find_map(|kv| {
            let mut it = kv.trim().splitn(2, '=');
            match (it.next(), it.next()) {
                (Some(REFRESH_COOKIE), Some(v)) if !v.trim().is_empty() => {
                    Some(v.trim().to_string())
                }
                _ => None,
            }
        })
}
