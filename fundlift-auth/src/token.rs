//! Identity token issuance and verification
//!
//! Tokens are HMAC-signed JWTs carrying the subject, user id and role. The
//! signing secret is held by the issuer and never leaves the process; the
//! TTL is a configuration value, not a constant baked in here.

use crate::roles::Role;
use chrono::{Duration, Utc};
use fundlift_core::{PlatformError, PlatformResult};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Claims carried by an identity token
///
/// The signature covers every field; any post-issue mutation invalidates
/// the token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject (the user's email)
    pub sub: String,
    /// User email, duplicated for consumers that read it directly
    pub email: String,
    /// User identifier
    #[serde(rename = "userId")]
    pub user_id: String,
    /// Role claim consumed by the access guard
    pub role: Role,
    /// Issued at (unix timestamp)
    pub iat: i64,
    /// Expiration time (unix timestamp), strictly after `iat`
    pub exp: i64,
}

/// Signs and verifies identity tokens
pub struct TokenIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl TokenIssuer {
    /// Build an issuer from the signing secret and token TTL
    ///
    /// An absent secret is a startup configuration failure; issuance never
    /// discovers it mid-request.
    pub fn new(secret: &str, ttl_secs: u64) -> PlatformResult<Self> {
        if secret.is_empty() {
            return Err(PlatformError::config("signing secret is not set", "token"));
        }

        Ok(Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl: Duration::seconds(ttl_secs as i64),
        })
    }

    /// Issue a fresh token for an authenticated user
    pub fn issue(&self, email: &str, user_id: &str, role: Role) -> PlatformResult<String> {
        self.issue_at(Utc::now().timestamp(), email, user_id, role)
    }

    fn issue_at(
        &self,
        issued_at: i64,
        email: &str,
        user_id: &str,
        role: Role,
    ) -> PlatformResult<String> {
        let claims = TokenClaims {
            sub: email.to_string(),
            email: email.to_string(),
            user_id: user_id.to_string(),
            role,
            iat: issued_at,
            exp: issued_at + self.ttl.num_seconds(),
        };

        encode(&Header::default(), &claims, &self.encoding).map_err(|e| {
            PlatformError::internal(&format!("failed to sign token: {}", e), "token")
        })
    }

    /// Verify a token's signature and expiry, returning its claims
    ///
    /// Expired and malformed tokens are logged distinctly but surface the
    /// same authentication-grade failure to callers.
    pub fn verify(&self, token: &str) -> PlatformResult<TokenClaims> {
        let mut validation = Validation::default();
        validation.leeway = 0;

        match decode::<TokenClaims>(token, &self.decoding, &validation) {
            Ok(data) => Ok(data.claims),
            Err(e) => {
                match e.kind() {
                    jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                        debug!("token verification failed: expired")
                    }
                    _ => debug!("token verification failed: {}", e),
                }
                Err(PlatformError::authentication("token"))
            }
        }
    }
}
