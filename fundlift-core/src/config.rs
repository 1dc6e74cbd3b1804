//! Platform configuration
//!
//! All security-sensitive knobs (signing secret, token TTL, hashing work
//! factor, remote channel address) are read once at startup and never
//! mutated afterwards.

use crate::error::{ErrorContext, PlatformError, PlatformResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::logging::LoggingConfig;

/// Top-level configuration for a Fundlift process
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PlatformConfig {
    pub auth: AuthConfig,
    pub hashing: HashingConfig,
    /// Presence routes all gateway calls over the remote channel; absence
    /// selects in-process execution. Decided once, at startup.
    pub remote: Option<RemoteConfig>,
    pub logging: LoggingConfig,
}

/// Token issuance configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// HMAC signing secret for identity tokens. Required; there is no
    /// built-in fallback value.
    pub jwt_secret: String,
    /// Token lifetime in seconds
    pub token_ttl_secs: u64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: String::new(),
            token_ttl_secs: 3600,
        }
    }
}

/// Argon2 work-factor parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HashingConfig {
    /// Memory cost in KiB
    pub memory_kib: u32,
    /// Number of iterations
    pub iterations: u32,
    /// Degree of parallelism
    pub parallelism: u32,
}

impl Default for HashingConfig {
    fn default() -> Self {
        // argon2 crate defaults (19 MiB, t=2, p=1)
        Self {
            memory_kib: 19456,
            iterations: 2,
            parallelism: 1,
        }
    }
}

/// Remote channel configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteConfig {
    /// Address of the auth service, e.g. "127.0.0.1:4001"
    pub addr: String,
    /// Bound on each remote round trip in milliseconds
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

fn default_request_timeout_ms() -> u64 {
    5000
}

impl PlatformConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> PlatformResult<Self> {
        let content = std::fs::read_to_string(&path).map_err(|e| PlatformError::Config {
            message: format!("Failed to read config file: {}", e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("config")
                .with_operation("read_file")
                .with_suggestion("Check if the config file exists and is readable"),
        })?;

        let config: PlatformConfig =
            toml::from_str(&content).map_err(|e| PlatformError::Config {
                message: format!("Failed to parse config: {}", e),
                source: Some(Box::new(e)),
                context: ErrorContext::new("config")
                    .with_operation("parse_toml")
                    .with_suggestion("Check TOML syntax in config file"),
            })?;

        Ok(config)
    }

    /// Overlay environment variables on top of the loaded values
    ///
    /// FUNDLIFT_JWT_SECRET, FUNDLIFT_TOKEN_TTL_SECS, FUNDLIFT_AUTH_ADDR and
    /// FUNDLIFT_LOG_LEVEL are recognised.
    pub fn apply_env(mut self) -> Self {
        if let Ok(secret) = std::env::var("FUNDLIFT_JWT_SECRET") {
            self.auth.jwt_secret = secret;
        }
        if let Some(ttl) = std::env::var("FUNDLIFT_TOKEN_TTL_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
        {
            self.auth.token_ttl_secs = ttl;
        }
        if let Ok(addr) = std::env::var("FUNDLIFT_AUTH_ADDR") {
            if addr.is_empty() {
                self.remote = None;
            } else {
                let request_timeout_ms = self
                    .remote
                    .as_ref()
                    .map(|r| r.request_timeout_ms)
                    .unwrap_or_else(default_request_timeout_ms);
                self.remote = Some(RemoteConfig {
                    addr,
                    request_timeout_ms,
                });
            }
        }
        if let Ok(level) = std::env::var("FUNDLIFT_LOG_LEVEL") {
            self.logging.level = level;
        }
        self
    }

    /// Validate the configuration
    ///
    /// A failure here is fatal; the process must not start with a missing
    /// signing secret or degenerate hashing parameters.
    pub fn validate(&self) -> PlatformResult<()> {
        if self.auth.jwt_secret.is_empty() {
            return Err(PlatformError::Config {
                message: "auth.jwt_secret must be set".to_string(),
                source: None,
                context: ErrorContext::new("config")
                    .with_operation("validate")
                    .with_suggestion("Set FUNDLIFT_JWT_SECRET or auth.jwt_secret in the config file"),
            });
        }

        if self.auth.token_ttl_secs == 0 {
            return Err(PlatformError::Config {
                message: "auth.token_ttl_secs must be greater than 0".to_string(),
                source: None,
                context: ErrorContext::new("config").with_operation("validate"),
            });
        }

        if self.hashing.memory_kib < 8 * self.hashing.parallelism
            || self.hashing.iterations == 0
            || self.hashing.parallelism == 0
        {
            return Err(PlatformError::Config {
                message: "hashing parameters are out of range".to_string(),
                source: None,
                context: ErrorContext::new("config")
                    .with_operation("validate")
                    .with_suggestion("Use the defaults unless you have measured a reason not to"),
            });
        }

        if let Some(remote) = &self.remote {
            if remote.addr.is_empty() {
                return Err(PlatformError::Config {
                    message: "remote.addr must not be empty".to_string(),
                    source: None,
                    context: ErrorContext::new("config").with_operation("validate"),
                });
            }
            if remote.request_timeout_ms == 0 {
                return Err(PlatformError::Config {
                    message: "remote.request_timeout_ms must be greater than 0".to_string(),
                    source: None,
                    context: ErrorContext::new("config").with_operation("validate"),
                });
            }
        }

        Ok(())
    }
}
