pub mod auth;
pub mod health;
pub mod user;

use crate::error::AppError;

/// Runs bcrypt and Diesel work off the async runtime.
pub(crate) async fn blocking<T, F>(work: F) -> Result<T, AppError>
where
    F: FnOnce() -> Result<T, AppError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| AppError::internal(format!("Task join error: {e}")))?
}
