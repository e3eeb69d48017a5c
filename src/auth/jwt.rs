use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

/// Only HS256 is accepted; a token advertising any other algorithm is rejected
/// before its signature is looked at.
const ALGORITHM: Algorithm = Algorithm::HS256;

#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    #[error("JWT signing secret is not configured")]
    MissingSecret,
    #[error("Token lifetime is out of range")]
    TtlOutOfRange,
    #[error("Token generation failed: {0}")]
    GenerationFailed(jsonwebtoken::errors::Error),
    #[error("Invalid token")]
    InvalidToken,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    /// User id, in decimal.
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    pub fn user_id(&self) -> Option<i64> {
        self.sub.parse().ok()
    }
}

/// Issues and verifies short-lived access tokens.
#[derive(Clone)]
pub struct JwtManager {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    access_ttl: Duration,
}

impl JwtManager {
    pub fn new(secret: &str, access_ttl: Duration) -> Result<Self, JwtError> {
        let secret = secret.trim();
        if secret.is_empty() {
            return Err(JwtError::MissingSecret);
        }

        let mut validation = Validation::new(ALGORITHM);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            access_ttl,
        })
    }

    /// Signs an access token for `user_id` with the configured TTL.
    pub fn issue(&self, user_id: i64) -> Result<String, JwtError> {
        self.generate_token(user_id, self.access_ttl)
    }

    /// Access token lifetime in seconds.
    pub fn expires_in(&self) -> i64 {
        self.access_ttl.num_seconds()
    }

    pub fn generate_token(&self, user_id: i64, ttl: Duration) -> Result<String, JwtError> {
        let now = Utc::now();
        let expires_at = now.checked_add_signed(ttl).ok_or(JwtError::TtlOutOfRange)?;

        let claims = Claims {
            sub: user_id.to_string(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        };

        encode(&Header::new(ALGORITHM), &claims, &self.encoding_key)
            .map_err(JwtError::GenerationFailed)
    }

    /// Checks algorithm, signature, expiry and subject. Every failure collapses
    /// into `InvalidToken`.
    pub fn verify(&self, token: &str) -> Result<Claims, JwtError> {
        let claims = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| {
                tracing::debug!(error = %e, "Access token rejected");
                JwtError::InvalidToken
            })?;

        match claims.user_id() {
            Some(_) => Ok(claims),
            None => {
                tracing::debug!("Access token rejected: subject is not a user id");
                Err(JwtError::InvalidToken)
            }
        }
    }
}
