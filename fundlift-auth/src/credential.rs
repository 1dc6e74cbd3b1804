//! Credential hashing
//!
//! Passwords are stored only as salted argon2id digests. The work factor
//! comes from configuration; the parameters travel inside the PHC string so
//! verification does not depend on the current configuration.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};
use fundlift_core::{HashingConfig, PlatformError, PlatformResult};

/// One-way password hashing and verification
#[derive(Clone)]
pub struct CredentialHasher {
    argon2: Argon2<'static>,
}

impl CredentialHasher {
    /// Build a hasher from the configured work factor
    ///
    /// Out-of-range parameters are a startup configuration failure.
    pub fn new(config: &HashingConfig) -> PlatformResult<Self> {
        let params = Params::new(
            config.memory_kib,
            config.iterations,
            config.parallelism,
            None,
        )
        .map_err(|e| {
            PlatformError::config(&format!("invalid hashing parameters: {}", e), "credential")
        })?;

        Ok(Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        })
    }

    /// Hash a password with a fresh random salt
    ///
    /// Two calls with the same password produce different digests; both
    /// verify. The password itself is never logged.
    pub fn hash(&self, password: &str) -> PlatformResult<String> {
        let salt = SaltString::generate(&mut OsRng);

        self.argon2
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| {
                PlatformError::internal(&format!("password hashing failed: {}", e), "credential")
            })
    }

    /// Verify a password against a stored digest
    ///
    /// Recomputes with the parameters embedded in the digest and compares in
    /// constant time. A malformed digest verifies false rather than erroring.
    pub fn verify(&self, password: &str, digest: &str) -> bool {
        match PasswordHash::new(digest) {
            Ok(parsed) => self
                .argon2
                .verify_password(password.as_bytes(), &parsed)
                .is_ok(),
            Err(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fast_hasher() -> CredentialHasher {
        // Minimal work factor to keep tests quick
        CredentialHasher::new(&HashingConfig {
            memory_kib: 8,
            iterations: 1,
            parallelism: 1,
        })
        .unwrap()
    }

    #[test]
    fn hash_then_verify_succeeds() {
        let hasher = fast_hasher();
        let digest = hasher.hash("secret1").unwrap();
        assert!(hasher.verify("secret1", &digest));
    }

    #[test]
    fn wrong_password_fails_verification() {
        let hasher = fast_hasher();
        let digest = hasher.hash("secret1").unwrap();
        assert!(!hasher.verify("secret2", &digest));
    }

    #[test]
    fn salting_makes_digests_differ() {
        let hasher = fast_hasher();
        let first = hasher.hash("secret1").unwrap();
        let second = hasher.hash("secret1").unwrap();
        assert_ne!(first, second);
        assert!(hasher.verify("secret1", &first));
        assert!(hasher.verify("secret1", &second));
    }

    #[test]
    fn malformed_digest_verifies_false() {
        let hasher = fast_hasher();
        assert!(!hasher.verify("secret1", "not-a-phc-string"));
        assert!(!hasher.verify("secret1", ""));
    }

    #[test]
    fn digest_carries_its_own_parameters() {
        // A digest produced under one work factor verifies under a hasher
        // configured with another
        let digest = fast_hasher().hash("secret1").unwrap();
        let other = CredentialHasher::new(&HashingConfig {
            memory_kib: 16,
            iterations: 2,
            parallelism: 1,
        })
        .unwrap();
        assert!(other.verify("secret1", &digest));
    }

    #[test]
    fn invalid_parameters_are_a_config_error() {
        let result = CredentialHasher::new(&HashingConfig {
            memory_kib: 0,
            iterations: 0,
            parallelism: 0,
        });
        assert!(matches!(result, Err(PlatformError::Config { .. })));
    }
}
