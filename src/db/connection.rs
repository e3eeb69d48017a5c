use super::{DbConnection, DbPool};
use crate::db::error::RepositoryError;
use diesel::PgConnection;
use diesel::r2d2::ConnectionManager;

/// Builds the r2d2 pool shared by every repository.
pub fn create_pool(database_url: &str, max_size: u32) -> Result<DbPool, RepositoryError> {
    let manager = ConnectionManager::<PgConnection>::new(database_url);

    diesel::r2d2::Pool::builder()
        .max_size(max_size)
        .build(manager)
        .map_err(Into::into)
}

pub fn get_connection(pool: &DbPool) -> Result<DbConnection, RepositoryError> {
    pool.get().map_err(Into::into)
}

/// Pool for the database-backed tests; those tests are `#[ignore]`d and need
/// `DATABASE_URL` pointing at a migrated database.
#[cfg(test)]
pub fn test_pool() -> DbPool {
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    create_pool(&database_url, 5).expect("Failed to create test pool")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[ignore = "requires a PostgreSQL DATABASE_URL"]
    fn test_pool_hands_out_connections() {
        let pool = test_pool();
        assert_eq!(pool.max_size(), 5);
        assert!(get_connection(&pool).is_ok());
    }
}
