use crate::db::DbPool;
use crate::db::connection::get_connection;
use crate::db::error::RepositoryError;
use crate::db::models::user::{NewUser, User};
use crate::db::schema::users;
use crate::db::store::UserStore;
use diesel::prelude::*;

#[derive(Clone)]
pub struct UserRepository {
    pool: DbPool,
}

impl UserRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl UserStore for UserRepository {
    fn create(&self, new_user: &NewUser) -> Result<User, RepositoryError> {
        let mut conn = get_connection(&self.pool)?;

        diesel::insert_into(users::table)
            .values(new_user)
            .returning(User::as_returning())
            .get_result(&mut conn)
            .map_err(Into::into)
    }

    fn find_by_username(&self, username: &str) -> Result<Option<User>, RepositoryError> {
        let mut conn = get_connection(&self.pool)?;

        users::table
            .filter(users::username.eq(username))
            .select(User::as_select())
            .first(&mut conn)
            .optional()
            .map_err(Into::into)
    }

    fn find_by_id(&self, id: i64) -> Result<Option<User>, RepositoryError> {
        let mut conn = get_connection(&self.pool)?;

        users::table
            .filter(users::id.eq(id))
            .select(User::as_select())
            .first(&mut conn)
            .optional()
            .map_err(Into::into)
    }
}
