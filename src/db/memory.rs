//! In-memory stores with the same contracts as the Diesel repositories.
//! A single mutex per store makes `rotate` atomic.

use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};

use crate::db::error::RepositoryError;
use crate::db::models::refresh_token::{NewRefreshToken, RefreshToken};
use crate::db::models::user::{NewUser, User};
use crate::db::store::{RefreshTokenStore, Rotation, UserStore};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
}

#[derive(Default)]
pub struct InMemoryUserStore {
    users: Mutex<Vec<User>>,
}

impl UserStore for InMemoryUserStore {
    fn create(&self, new_user: &NewUser) -> Result<User, RepositoryError> {
        let mut users = lock(&self.users);
        if users.iter().any(|u| u.username == new_user.username) {
            return Err(RepositoryError::UniqueViolation(format!(
                "username {} already exists",
                new_user.username
            )));
        }

        let user = User {
            id: i64::try_from(users.len()).unwrap_or(i64::MAX - 1) + 1,
            username: new_user.username.clone(),
            password_hash: new_user.password_hash.clone(),
            created_at: Utc::now(),
        };
        users.push(user.clone());
        Ok(user)
    }

    fn find_by_username(&self, username: &str) -> Result<Option<User>, RepositoryError> {
        Ok(lock(&self.users)
            .iter()
            .find(|u| u.username == username)
            .cloned())
    }

    fn find_by_id(&self, id: i64) -> Result<Option<User>, RepositoryError> {
        Ok(lock(&self.users).iter().find(|u| u.id == id).cloned())
    }
}

#[derive(Default)]
pub struct InMemoryRefreshTokenStore {
    tokens: Mutex<Vec<RefreshToken>>,
}

impl InMemoryRefreshTokenStore {
    pub fn all(&self) -> Vec<RefreshToken> {
        lock(&self.tokens).clone()
    }

    fn push(
        tokens: &mut Vec<RefreshToken>,
        new_token: &NewRefreshToken,
    ) -> Result<RefreshToken, RepositoryError> {
        if tokens.iter().any(|t| t.token_hash == new_token.token_hash) {
            return Err(RepositoryError::UniqueViolation(
                "token_hash already exists".to_string(),
            ));
        }

        let record = RefreshToken {
            id: i64::try_from(tokens.len()).unwrap_or(i64::MAX - 1) + 1,
            user_id: new_token.user_id,
            token_hash: new_token.token_hash.clone(),
            created_at: Utc::now(),
            last_used_at: None,
            expires_at: new_token.expires_at,
            revoked_at: None,
            replaced_by_token_id: None,
        };
        tokens.push(record.clone());
        Ok(record)
    }
}

impl RefreshTokenStore for InMemoryRefreshTokenStore {
    fn insert(&self, new_token: &NewRefreshToken) -> Result<RefreshToken, RepositoryError> {
        Self::push(&mut lock(&self.tokens), new_token)
    }

    fn find_by_hash(&self, token_hash: &str) -> Result<Option<RefreshToken>, RepositoryError> {
        Ok(lock(&self.tokens)
            .iter()
            .find(|t| t.token_hash == token_hash)
            .cloned())
    }

    fn revoke(&self, id: i64, revoked_at: DateTime<Utc>) -> Result<bool, RepositoryError> {
        let mut tokens = lock(&self.tokens);
        match tokens.iter_mut().find(|t| t.id == id && t.revoked_at.is_none()) {
            Some(token) => {
                token.revoked_at = Some(revoked_at);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn rotate(&self, rotation: &Rotation) -> Result<RefreshToken, RepositoryError> {
        let mut tokens = lock(&self.tokens);

        let old_is_active = tokens
            .iter()
            .any(|t| t.id == rotation.old_id && t.revoked_at.is_none());
        if !old_is_active {
            return Err(RepositoryError::AlreadyRevoked(rotation.old_id));
        }

        let successor = Self::push(
            &mut tokens,
            &NewRefreshToken {
                user_id: rotation.user_id,
                token_hash: rotation.new_hash.clone(),
                expires_at: rotation.new_expires_at,
            },
        )?;

        if let Some(old) = tokens.iter_mut().find(|t| t.id == rotation.old_id) {
            old.revoked_at = Some(rotation.rotated_at);
            old.replaced_by_token_id = Some(successor.id);
        }

        Ok(successor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn new_token(hash: &str) -> NewRefreshToken {
        NewRefreshToken {
            user_id: 1,
            token_hash: hash.to_string(),
            expires_at: Utc::now() + Duration::days(7),
        }
    }

    #[test]
    fn rotate_rejects_revoked_token_without_inserting() {
        let store = InMemoryRefreshTokenStore::default();
        let old = store.insert(&new_token("a")).unwrap();
        assert!(store.revoke(old.id, Utc::now()).unwrap());

        let result = store.rotate(&Rotation {
            old_id: old.id,
            user_id: 1,
            new_hash: "b".to_string(),
            new_expires_at: Utc::now() + Duration::days(7),
            rotated_at: Utc::now(),
        });

        assert!(matches!(result, Err(RepositoryError::AlreadyRevoked(_))));
        assert_eq!(store.all().len(), 1);
    }

    #[test]
    fn duplicate_username_is_rejected() {
        let store = InMemoryUserStore::default();
        let new = NewUser {
            username: "alice".to_string(),
            password_hash: "hash".to_string(),
        };
        store.create(&new).unwrap();
        assert!(matches!(
            store.create(&new),
            Err(RepositoryError::UniqueViolation(_))
        ));
    }
}
