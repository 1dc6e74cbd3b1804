//! Identity service
//!
//! Signup and login orchestration over the auth invoker and a user-record
//! store. Plaintext passwords exist only transiently here; the store sees
//! digests, the caller sees public projections.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use fundlift_auth::{AuthGateway, Role};
use fundlift_core::{PlatformError, PlatformResult};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Internal user data with password digest
#[derive(Debug, Clone)]
pub struct UserRecord {
    pub id: String,
    pub email: String,
    pub name: String,
    pub role: Role,
    pub password_digest: String,
    pub created_at: DateTime<Utc>,
}

impl UserRecord {
    /// Convert to the public projection; the digest never leaves the store
    pub fn to_user_info(&self) -> UserInfo {
        UserInfo {
            id: self.id.clone(),
            email: self.email.clone(),
            name: self.name.clone(),
            role: self.role,
            created_at: self.created_at,
        }
    }
}

/// Public user information
#[derive(Debug, Clone, Serialize)]
pub struct UserInfo {
    pub id: String,
    pub email: String,
    pub name: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

/// User-record persistence boundary
///
/// The uniqueness constraint on email lives here; a lost same-email race
/// surfaces as a conflict, which callers treat as a normal outcome.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_email(&self, email: &str) -> PlatformResult<Option<UserRecord>>;

    /// Insert a new record, failing with a conflict if the email is taken
    async fn insert(&self, record: UserRecord) -> PlatformResult<()>;
}

/// In-memory user store
#[derive(Debug, Default)]
pub struct InMemoryUserStore {
    users: RwLock<HashMap<String, UserRecord>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn find_by_email(&self, email: &str) -> PlatformResult<Option<UserRecord>> {
        let users = self.users.read().unwrap();
        Ok(users.get(email).cloned())
    }

    async fn insert(&self, record: UserRecord) -> PlatformResult<()> {
        // Existence check and insert under one write lock; concurrent
        // same-email signups serialize here and the loser sees the conflict
        let mut users = self.users.write().unwrap();
        if users.contains_key(&record.email) {
            return Err(PlatformError::conflict("User already exists", "user-store"));
        }
        users.insert(record.email.clone(), record);
        Ok(())
    }
}

/// Signup/login orchestration
pub struct IdentityService {
    gateway: Arc<dyn AuthGateway>,
    store: Arc<dyn UserStore>,
    /// Digest verified on the unknown-email login path so its latency
    /// profile matches the wrong-password path
    decoy_digest: String,
}

impl IdentityService {
    /// Build the service, pre-computing the decoy digest
    pub async fn bootstrap(
        gateway: Arc<dyn AuthGateway>,
        store: Arc<dyn UserStore>,
    ) -> PlatformResult<Self> {
        let decoy_digest = gateway
            .hash_password(&Uuid::new_v4().to_string())
            .await
            .map_err(Self::shield_transport)?;

        Ok(Self {
            gateway,
            store,
            decoy_digest,
        })
    }

    /// Register a new user
    ///
    /// Exactly one outcome: the created record's public projection, a
    /// conflict for an existing email, or a service-unavailable failure.
    pub async fn signup(&self, email: &str, name: &str, password: &str) -> PlatformResult<UserInfo> {
        if self.store.find_by_email(email).await?.is_some() {
            debug!("signup rejected: email already registered");
            return Err(PlatformError::conflict("User already exists", "identity"));
        }

        let digest = self
            .gateway
            .hash_password(password)
            .await
            .map_err(Self::shield_transport)?;

        let record = UserRecord {
            id: Uuid::new_v4().to_string(),
            email: email.to_string(),
            name: name.to_string(),
            role: Role::Supporter,
            password_digest: digest,
            created_at: Utc::now(),
        };
        let info = record.to_user_info();

        self.store.insert(record).await?;

        info!(user_id = %info.id, "user registered");
        Ok(info)
    }

    /// Authenticate a user and issue an identity token
    ///
    /// Unknown email and wrong password produce the same failure, in shape
    /// and in timing: the unknown-email path verifies against the decoy
    /// digest before rejecting.
    pub async fn login(&self, email: &str, password: &str) -> PlatformResult<String> {
        match self.store.find_by_email(email).await? {
            Some(user) => {
                let valid = self
                    .gateway
                    .compare_passwords(password, &user.password_digest)
                    .await
                    .map_err(Self::shield_transport)?;

                if !valid {
                    warn!(user_id = %user.id, "login rejected");
                    return Err(PlatformError::authentication("identity"));
                }

                let token = self
                    .gateway
                    .issue_token(&user.email, &user.id, user.role)
                    .await
                    .map_err(Self::shield_transport)?;

                info!(user_id = %user.id, "login succeeded");
                Ok(token)
            }
            None => {
                let _ = self
                    .gateway
                    .compare_passwords(password, &self.decoy_digest)
                    .await
                    .map_err(Self::shield_transport)?;

                warn!("login rejected");
                Err(PlatformError::authentication("identity"))
            }
        }
    }

    /// Transport details never reach the end user; a failing channel is a
    /// generic service-unavailable outcome
    fn shield_transport(error: PlatformError) -> PlatformError {
        match error {
            PlatformError::Transport { .. } => {
                error.log();
                PlatformError::unavailable("authentication service is unavailable", "identity")
            }
            other => other,
        }
    }
}
