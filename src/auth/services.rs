// src/auth/services.rs

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use workout_tracker_api::UserResponse;

use super::jwt::JwtManager;
use super::password::PasswordManager;
use super::refresh_token::{generate_secret, hash_secret};
use crate::db::error::RepositoryError;
use crate::db::models::refresh_token::NewRefreshToken;
use crate::db::models::user::NewUser;
use crate::db::store::{RefreshTokenStore, Rotation, UserStore};
use crate::error::AppError;

pub const DEFAULT_REFRESH_TTL_DAYS: i64 = 7;

/// Token pair handed to the client after login or refresh.
///
/// `refresh_token` is the raw secret. It is returned exactly once and only its
/// hash is persisted.
#[derive(Debug, Clone)]
pub struct IssuedTokens {
    pub access_token: String,
    pub expires_in: i64,
    pub refresh_token: String,
    pub refresh_expires_at: DateTime<Utc>,
}

/// Login, refresh-token rotation and logout.
pub struct AuthService {
    jwt_manager: JwtManager,
    password_manager: PasswordManager,
    users: Arc<dyn UserStore>,
    refresh_tokens: Arc<dyn RefreshTokenStore>,
    refresh_ttl: Duration,
}

impl AuthService {
    pub fn new(
        jwt_manager: JwtManager,
        password_manager: PasswordManager,
        users: Arc<dyn UserStore>,
        refresh_tokens: Arc<dyn RefreshTokenStore>,
    ) -> Self {
        Self {
            jwt_manager,
            password_manager,
            users,
            refresh_tokens,
            refresh_ttl: Duration::days(DEFAULT_REFRESH_TTL_DAYS),
        }
    }

    #[must_use]
    pub fn with_refresh_ttl(mut self, refresh_ttl: Duration) -> Self {
        self.refresh_ttl = refresh_ttl;
        self
    }

    pub fn jwt_manager(&self) -> &JwtManager {
        &self.jwt_manager
    }

    /// Inscription d'un nouvel utilisateur, renvoie son id
    pub fn register(&self, name: &str, password: &str) -> Result<i64, AppError> {
        Self::validate_credentials(name, password)?;

        let password_hash = self.password_manager.hash(password)?;
        let new_user = NewUser {
            username: name.to_string(),
            password_hash,
        };

        match self.users.create(&new_user) {
            Ok(user) => {
                tracing::info!(user_id = user.id, "User registered");
                Ok(user.id)
            }
            Err(RepositoryError::UniqueViolation(_)) => Err(AppError::UsernameTaken),
            Err(e) => Err(e.into()),
        }
    }

    /// Connexion d'un utilisateur
    pub fn login(&self, name: &str, password: &str) -> Result<IssuedTokens, AppError> {
        Self::validate_credentials(name, password)?;

        let Some(user) = self.users.find_by_username(name)? else {
            tracing::info!("Login rejected: unknown user");
            return Err(AppError::InvalidCredentials);
        };

        if !self.password_manager.verify(password, &user.password_hash) {
            tracing::info!(user_id = user.id, "Login rejected: wrong password");
            return Err(AppError::InvalidCredentials);
        }

        let access_token = self.jwt_manager.issue(user.id)?;

        let refresh_token = generate_secret();
        let refresh_expires_at = self.refresh_expiry(Utc::now())?;
        let record = self.refresh_tokens.insert(&NewRefreshToken {
            user_id: user.id,
            token_hash: hash_secret(&refresh_token),
            expires_at: refresh_expires_at,
        })?;

        tracing::info!(user_id = user.id, refresh_token_id = record.id, "User logged in");

        Ok(IssuedTokens {
            access_token,
            expires_in: self.jwt_manager.expires_in(),
            refresh_token,
            refresh_expires_at,
        })
    }

    /// Exchanges a refresh secret for a new token pair, revoking the old one.
    ///
    /// A secret that was already rotated or logged out is refused the same way
    /// as an unknown one; a replay by a thief and a stale retry by the owner
    /// look identical from here.
    pub fn refresh(&self, raw_refresh_token: &str) -> Result<IssuedTokens, AppError> {
        if raw_refresh_token.trim().is_empty() {
            return Err(AppError::MissingRefreshToken);
        }

        let now = Utc::now();
        let Some(current) = self
            .refresh_tokens
            .find_by_hash(&hash_secret(raw_refresh_token))?
        else {
            tracing::info!("Refresh rejected: unknown token");
            return Err(AppError::InvalidRefreshToken);
        };

        if current.is_revoked() {
            tracing::warn!(
                user_id = current.user_id,
                refresh_token_id = current.id,
                replaced_by = ?current.replaced_by_token_id,
                "Refresh rejected: token already revoked (possible replay)"
            );
            return Err(AppError::InvalidRefreshToken);
        }
        if !current.is_active(now) {
            tracing::info!(refresh_token_id = current.id, "Refresh rejected: token expired");
            return Err(AppError::InvalidRefreshToken);
        }

        let access_token = self.jwt_manager.issue(current.user_id)?;

        let refresh_token = generate_secret();
        let refresh_expires_at = self.refresh_expiry(now)?;
        let successor = self
            .refresh_tokens
            .rotate(&Rotation {
                old_id: current.id,
                user_id: current.user_id,
                new_hash: hash_secret(&refresh_token),
                new_expires_at: refresh_expires_at,
                rotated_at: now,
            })
            .map_err(|e| {
                if let RepositoryError::AlreadyRevoked(id) = &e {
                    tracing::warn!(
                        user_id = current.user_id,
                        refresh_token_id = id,
                        "Refresh rejected: lost rotation race (possible replay)"
                    );
                }
                AppError::from(e)
            })?;

        tracing::info!(
            user_id = current.user_id,
            refresh_token_id = current.id,
            replaced_by = successor.id,
            "Refresh token rotated"
        );

        Ok(IssuedTokens {
            access_token,
            expires_in: self.jwt_manager.expires_in(),
            refresh_token,
            refresh_expires_at,
        })
    }

    /// Best-effort revoke. Blank, unknown and already revoked secrets all
    /// succeed; only storage failures are reported.
    pub fn logout(&self, raw_refresh_token: Option<&str>) -> Result<(), AppError> {
        let Some(raw) = raw_refresh_token.filter(|raw| !raw.trim().is_empty()) else {
            return Ok(());
        };

        let Some(current) = self.refresh_tokens.find_by_hash(&hash_secret(raw))? else {
            tracing::debug!("Logout with unknown refresh token");
            return Ok(());
        };

        if current.is_revoked() {
            tracing::debug!(refresh_token_id = current.id, "Logout with revoked refresh token");
            return Ok(());
        }

        if self.refresh_tokens.revoke(current.id, Utc::now())? {
            tracing::info!(
                user_id = current.user_id,
                refresh_token_id = current.id,
                "User logged out"
            );
        }
        Ok(())
    }

    /// Profil de l'utilisateur authentifié
    pub fn current_user(&self, user_id: i64) -> Result<UserResponse, AppError> {
        self.users
            .find_by_id(user_id)?
            .map(UserResponse::from)
            .ok_or_else(|| AppError::not_found("User not found"))
    }

    fn refresh_expiry(&self, now: DateTime<Utc>) -> Result<DateTime<Utc>, AppError> {
        now.checked_add_signed(self.refresh_ttl)
            .ok_or_else(|| AppError::internal("Refresh token expiry is out of range"))
    }

    fn validate_credentials(name: &str, password: &str) -> Result<(), AppError> {
        if name.trim().is_empty() || password.trim().is_empty() {
            return Err(AppError::RequiredFields);
        }
        Ok(())
    }
}
