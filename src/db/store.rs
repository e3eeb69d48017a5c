//! Storage seams used by the session layer.
//!
//! Implemented by the Diesel repositories for PostgreSQL, and by the
//! in-memory stores in [`crate::db::memory`] for unit tests.

use chrono::{DateTime, Utc};

use crate::db::error::RepositoryError;
use crate::db::models::refresh_token::{NewRefreshToken, RefreshToken};
use crate::db::models::user::{NewUser, User};

pub trait UserStore: Send + Sync {
    /// Fails with `UniqueViolation` if the username is taken.
    fn create(&self, new_user: &NewUser) -> Result<User, RepositoryError>;

    fn find_by_username(&self, username: &str) -> Result<Option<User>, RepositoryError>;

    fn find_by_id(&self, id: i64) -> Result<Option<User>, RepositoryError>;
}

/// Everything needed to replace a refresh token with its successor.
#[derive(Debug, Clone)]
pub struct Rotation {
    pub old_id: i64,
    pub user_id: i64,
    pub new_hash: String,
    pub new_expires_at: DateTime<Utc>,
    pub rotated_at: DateTime<Utc>,
}

pub trait RefreshTokenStore: Send + Sync {
    fn insert(&self, new_token: &NewRefreshToken) -> Result<RefreshToken, RepositoryError>;

    fn find_by_hash(&self, token_hash: &str) -> Result<Option<RefreshToken>, RepositoryError>;

    /// Sets `revoked_at` if it is unset. Returns `false` when the token was
    /// already revoked; an earlier timestamp or `replaced_by_token_id` is kept.
    fn revoke(&self, id: i64, revoked_at: DateTime<Utc>) -> Result<bool, RepositoryError>;

    /// Atomically inserts the successor and revokes `old_id` with
    /// `replaced_by_token_id` pointing at it. Fails with `AlreadyRevoked`, and
    /// leaves no successor behind, if `old_id` was revoked first.
    fn rotate(&self, rotation: &Rotation) -> Result<RefreshToken, RepositoryError>;
}
