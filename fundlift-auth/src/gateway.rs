//! Auth gateway service boundary
//!
//! The three credential/token operations other components call, independent
//! of whether the implementation runs in this process or behind the remote
//! channel. The local implementation is the only holder of the hashing
//! parameters and the signing secret.

use crate::credential::CredentialHasher;
use crate::roles::Role;
use crate::token::TokenIssuer;
use async_trait::async_trait;
use fundlift_core::{PlatformConfig, PlatformResult};
use tracing::debug;

/// Callable surface of the auth service
#[async_trait]
pub trait AuthGateway: Send + Sync {
    /// Hash a plaintext password into a storable digest
    async fn hash_password(&self, password: &str) -> PlatformResult<String>;

    /// Verify a plaintext password against a stored digest
    async fn compare_passwords(&self, password: &str, digest: &str) -> PlatformResult<bool>;

    /// Issue an identity token for an authenticated user
    async fn issue_token(&self, email: &str, user_id: &str, role: Role) -> PlatformResult<String>;
}

/// In-process implementation delegating to the hasher and issuer
pub struct LocalAuthGateway {
    hasher: CredentialHasher,
    issuer: TokenIssuer,
}

impl LocalAuthGateway {
    pub fn new(hasher: CredentialHasher, issuer: TokenIssuer) -> Self {
        Self { hasher, issuer }
    }

    /// Build the gateway from validated configuration
    pub fn from_config(config: &PlatformConfig) -> PlatformResult<Self> {
        Ok(Self {
            hasher: CredentialHasher::new(&config.hashing)?,
            issuer: TokenIssuer::new(&config.auth.jwt_secret, config.auth.token_ttl_secs)?,
        })
    }

    /// Verify a previously issued token (server-side consumers only; the
    /// decoding key stays here)
    pub fn verify_token(&self, token: &str) -> PlatformResult<crate::token::TokenClaims> {
        self.issuer.verify(token)
    }
}

#[async_trait]
impl AuthGateway for LocalAuthGateway {
    async fn hash_password(&self, password: &str) -> PlatformResult<String> {
        self.hasher.hash(password)
    }

    async fn compare_passwords(&self, password: &str, digest: &str) -> PlatformResult<bool> {
        Ok(self.hasher.verify(password, digest))
    }

    async fn issue_token(&self, email: &str, user_id: &str, role: Role) -> PlatformResult<String> {
        debug!(user_id = %user_id, role = %role, "issuing token");
        self.issuer.issue(email, user_id, role)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fundlift_core::{AuthConfig, HashingConfig};

    fn test_gateway() -> LocalAuthGateway {
        let config = PlatformConfig {
            auth: AuthConfig {
                jwt_secret: "test-secret".to_string(),
                token_ttl_secs: 3600,
            },
            hashing: HashingConfig {
                memory_kib: 8,
                iterations: 1,
                parallelism: 1,
            },
            ..Default::default()
        };
        LocalAuthGateway::from_config(&config).unwrap()
    }

    #[tokio::test]
    async fn gateway_hash_and_compare() {
        let gateway = test_gateway();
        let digest = gateway.hash_password("secret1").await.unwrap();
        assert!(gateway.compare_passwords("secret1", &digest).await.unwrap());
        assert!(!gateway.compare_passwords("wrong", &digest).await.unwrap());
    }

    #[tokio::test]
    async fn gateway_issues_verifiable_tokens() {
        let gateway = test_gateway();
        let token = gateway
            .issue_token("a@x.com", "user-1", Role::Moderator)
            .await
            .unwrap();
        let claims = gateway.verify_token(&token).unwrap();
        assert_eq!(claims.user_id, "user-1");
        assert_eq!(claims.role, Role::Moderator);
    }

    #[test]
    fn from_config_rejects_missing_secret() {
        let config = PlatformConfig::default();
        assert!(LocalAuthGateway::from_config(&config).is_err());
    }
}
