use bcrypt::{DEFAULT_COST, hash, verify};

#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    #[error("Password hashing failed: {0}")]
    HashingFailed(bcrypt::BcryptError),
}

/// bcrypt hashing with a configurable work factor.
#[derive(Debug, Clone, Copy)]
pub struct PasswordManager {
    cost: u32,
}

impl Default for PasswordManager {
    fn default() -> Self {
        Self::new(DEFAULT_COST)
    }
}

impl PasswordManager {
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }

    pub fn hash(&self, password: &str) -> Result<String, PasswordError> {
        hash(password, self.cost).map_err(PasswordError::HashingFailed)
    }

    /// Fails closed: a malformed hash counts as a mismatch.
    pub fn verify(&self, password: &str, hash: &str) -> bool {
        verify(password, hash).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Stored password hash could not be verified");
            false
        })
    }
}

#[cfg(test)]
mod tests {
    use super::PasswordManager;

    const TEST_COST: u32 = 4;

    fn manager() -> PasswordManager {
        PasswordManager::new(TEST_COST)
    }

    #[test]
    fn verify_returns_true_when_password_matches() {
        let hashed = manager().hash("pw123456").expect("Hashing failed");

        assert!(manager().verify("pw123456", &hashed));
    }

    #[test]
    fn verify_returns_false_when_password_does_not_match() {
        let hashed = manager().hash("pw123456").expect("Hashing failed");

        assert!(!manager().verify("pw1234567", &hashed));
    }

    #[test]
    fn same_password_hashes_differently_each_time() {
        let hash1 = manager().hash("pw123456").unwrap();
        let hash2 = manager().hash("pw123456").unwrap();

        assert_ne!(hash1, hash2, "each hash carries its own salt");
    }

    #[test]
    fn hash_embeds_configured_cost() {
        let hashed = manager().hash("pw123456").unwrap();

        assert!(hashed.starts_with("$2"));
        assert!(hashed.contains("$04$"));
    }

    #[test]
    fn verify_fails_closed_on_malformed_hash() {
        assert!(!manager().verify("pw123456", "not-a-bcrypt-hash"));
        assert!(!manager().verify("pw123456", ""));
    }
}
