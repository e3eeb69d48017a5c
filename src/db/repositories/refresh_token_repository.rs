use crate::db::DbPool;
use crate::db::connection::get_connection;
use crate::db::error::RepositoryError;
use crate::db::models::refresh_token::{NewRefreshToken, RefreshToken};
use crate::db::schema::refresh_tokens;
use crate::db::store::{RefreshTokenStore, Rotation};
use chrono::{DateTime, Utc};
use diesel::prelude::*;

#[derive(Clone)]
pub struct RefreshTokenRepository {
    pool: DbPool,
}

impl RefreshTokenRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    #[cfg(test)]
    pub fn find_by_id(&self, id: i64) -> Result<Option<RefreshToken>, RepositoryError> {
        let mut conn = get_connection(&self.pool)?;

        refresh_tokens::table
            .filter(refresh_tokens::id.eq(id))
            .select(RefreshToken::as_select())
            .first(&mut conn)
            .optional()
            .map_err(Into::into)
    }
}

impl RefreshTokenStore for RefreshTokenRepository {
    fn insert(&self, new_token: &NewRefreshToken) -> Result<RefreshToken, RepositoryError> {
        let mut conn = get_connection(&self.pool)?;

        diesel::insert_into(refresh_tokens::table)
            .values(new_token)
            .returning(RefreshToken::as_returning())
            .get_result(&mut conn)
            .map_err(Into::into)
    }

    fn find_by_hash(&self, token_hash: &str) -> Result<Option<RefreshToken>, RepositoryError> {
        let mut conn = get_connection(&self.pool)?;

        // Revoked and expired rows are returned too; the caller decides.
        refresh_tokens::table
            .filter(refresh_tokens::token_hash.eq(token_hash))
            .select(RefreshToken::as_select())
            .first(&mut conn)
            .optional()
            .map_err(Into::into)
    }

    fn revoke(&self, id: i64, revoked_at: DateTime<Utc>) -> Result<bool, RepositoryError> {
        let mut conn = get_connection(&self.pool)?;

        let updated = diesel::update(
            refresh_tokens::table
                .filter(refresh_tokens::id.eq(id))
                .filter(refresh_tokens::revoked_at.is_null()),
        )
        .set(refresh_tokens::revoked_at.eq(Some(revoked_at)))
        .execute(&mut conn)?;

        Ok(updated == 1)
    }

    fn rotate(&self, rotation: &Rotation) -> Result<RefreshToken, RepositoryError> {
        let mut conn = get_connection(&self.pool)?;

        // Any Err returned from the closure rolls the insert back.
        conn.transaction::<_, RepositoryError, _>(|conn| {
            let successor = diesel::insert_into(refresh_tokens::table)
                .values(NewRefreshToken {
                    user_id: rotation.user_id,
                    token_hash: rotation.new_hash.clone(),
                    expires_at: rotation.new_expires_at,
                })
                .returning(RefreshToken::as_returning())
                .get_result(conn)?;

            // Row lock + predicate re-check makes concurrent rotations of the
            // same token serialize here; the loser sees zero affected rows.
            let updated = diesel::update(
                refresh_tokens::table
                    .filter(refresh_tokens::id.eq(rotation.old_id))
                    .filter(refresh_tokens::revoked_at.is_null()),
            )
            .set((
                refresh_tokens::revoked_at.eq(Some(rotation.rotated_at)),
                refresh_tokens::replaced_by_token_id.eq(Some(successor.id)),
            ))
            .execute(conn)?;

            if updated == 0 {
                return Err(RepositoryError::AlreadyRevoked(rotation.old_id));
            }

            Ok(successor)
        })
    }
}
