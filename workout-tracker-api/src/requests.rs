use serde::{Deserialize, Serialize};

// -------- REQUEST DTOs --------

/// Body of `POST /auth/register` and `POST /auth/login`.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct CredentialsRequest {
    pub name: String,
    pub password: String, // Plain text
}
