//! bcrypt adapter for the password hashing port.

use crate::identity::SELLER_HASH_COST;
use crate::ports::{PasswordHashError, PasswordHasher};

/// Hashes passwords with bcrypt at a fixed cost factor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BcryptPasswordHasher {
    cost: u32,
}

impl BcryptPasswordHasher {
    /// Create a hasher with the given cost factor.
    #[must_use]
    pub const fn new(cost: u32) -> Self {
        Self { cost }
    }

    /// Configured cost factor.
    #[must_use]
    pub const fn cost(&self) -> u32 {
        self.cost
    }
}

impl Default for BcryptPasswordHasher {
    fn default() -> Self {
        Self::new(SELLER_HASH_COST)
    }
}

impl PasswordHasher for BcryptPasswordHasher {
    fn hash(&self, password: &str) -> Result<String, PasswordHashError> {
        bcrypt::hash(password, self.cost).map_err(|error| PasswordHashError::hash(error.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    fn default_cost_matches_the_seller_credentials() {
        assert_eq!(BcryptPasswordHasher::default().cost(), 8);
    }

    #[rstest]
    fn hashes_verify_against_the_plain_password() {
        let hasher = BcryptPasswordHasher::new(4);
        let hash = hasher.hash("123456").expect("hash");

        assert!(hash.starts_with("$2b$04$"));
        assert!(bcrypt::verify("123456", &hash).expect("verify"));
        assert!(!bcrypt::verify("654321", &hash).expect("verify"));
    }

    #[rstest]
    fn out_of_range_cost_is_a_hash_error() {
        let error = BcryptPasswordHasher::new(99)
            .hash("123456")
            .expect_err("cost 99 is invalid");
        assert!(matches!(error, PasswordHashError::Hash { .. }));
    }
}
