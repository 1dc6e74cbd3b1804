//! Unified error handling system
//!
//! Provides the platform error taxonomy with context and proper error chaining

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, warn};

pub type PlatformResult<T> = Result<T, PlatformError>;

/// Error context providing additional information for debugging
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorContext {
    /// Unique error ID for tracking
    pub error_id: String,
    /// Timestamp when error occurred
    pub timestamp: DateTime<Utc>,
    /// Component where error originated
    pub component: String,
    /// Operation being performed when error occurred
    pub operation: Option<String>,
    /// Recovery suggestions
    pub recovery_suggestions: Vec<String>,
}

impl ErrorContext {
    pub fn new(component: &str) -> Self {
        Self {
            error_id: uuid::Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            component: component.to_string(),
            operation: None,
            recovery_suggestions: Vec::new(),
        }
    }

    pub fn with_operation(mut self, operation: &str) -> Self {
        self.operation = Some(operation.to_string());
        self
    }

    pub fn with_suggestion(mut self, suggestion: &str) -> Self {
        self.recovery_suggestions.push(suggestion.to_string());
        self
    }
}

/// Main error type for the Fundlift platform
///
/// The authentication variant deliberately carries a single generic message:
/// unknown identity and wrong credentials must be indistinguishable to the
/// caller (see `IdentityService`).
#[derive(Error, Debug)]
pub enum PlatformError {
    #[error("Invalid credentials")]
    Authentication { context: ErrorContext },

    #[error("Conflict: {message}")]
    Conflict {
        message: String,
        context: ErrorContext,
    },

    #[error("No authenticated principal found")]
    AuthorizationMissing { context: ErrorContext },

    #[error("{}", authorization_message(.required_roles, .missing_permissions))]
    Authorization {
        /// Roles that would have satisfied the policy (any-of); empty when
        /// the permission gate failed instead.
        required_roles: Vec<String>,
        /// Exactly the required permissions the caller does not hold.
        missing_permissions: Vec<String>,
        context: ErrorContext,
    },

    #[error("Transport error: {message}")]
    Transport {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
        context: ErrorContext,
    },

    #[error("Service unavailable: {message}")]
    Unavailable {
        message: String,
        context: ErrorContext,
    },

    #[error("Resource not found: {resource}")]
    NotFound {
        resource: String,
        context: ErrorContext,
    },

    #[error("Configuration error: {message}")]
    Config {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
        context: ErrorContext,
    },

    #[error("Internal error: {message}")]
    Internal {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
        context: ErrorContext,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

fn authorization_message(required_roles: &[String], missing_permissions: &[String]) -> String {
    if !required_roles.is_empty() {
        format!(
            "This action requires one of the following roles: {}",
            required_roles.join(", ")
        )
    } else {
        format!(
            "Missing required permissions: {}",
            missing_permissions.join(", ")
        )
    }
}

impl PlatformError {
    /// Generic authentication failure; the message never discloses which
    /// part of the credential check failed
    pub fn authentication(component: &str) -> Self {
        PlatformError::Authentication {
            context: ErrorContext::new(component),
        }
    }

    pub fn conflict(message: &str, component: &str) -> Self {
        PlatformError::Conflict {
            message: message.to_string(),
            context: ErrorContext::new(component),
        }
    }

    pub fn authorization_missing(component: &str) -> Self {
        PlatformError::AuthorizationMissing {
            context: ErrorContext::new(component),
        }
    }

    pub fn transport(message: &str, component: &str) -> Self {
        PlatformError::Transport {
            message: message.to_string(),
            source: None,
            context: ErrorContext::new(component)
                .with_suggestion("Check that the remote service is reachable"),
        }
    }

    pub fn unavailable(message: &str, component: &str) -> Self {
        PlatformError::Unavailable {
            message: message.to_string(),
            context: ErrorContext::new(component).with_suggestion("Retry the request later"),
        }
    }

    pub fn not_found(resource: &str, component: &str) -> Self {
        PlatformError::NotFound {
            resource: resource.to_string(),
            context: ErrorContext::new(component),
        }
    }

    pub fn config(message: &str, component: &str) -> Self {
        PlatformError::Config {
            message: message.to_string(),
            source: None,
            context: ErrorContext::new(component)
                .with_suggestion("Check your configuration file and environment"),
        }
    }

    pub fn internal(message: &str, component: &str) -> Self {
        PlatformError::Internal {
            message: message.to_string(),
            source: None,
            context: ErrorContext::new(component),
        }
    }

    /// Get the error context
    pub fn context(&self) -> Option<&ErrorContext> {
        match self {
            PlatformError::Authentication { context } => Some(context),
            PlatformError::Conflict { context, .. } => Some(context),
            PlatformError::AuthorizationMissing { context } => Some(context),
            PlatformError::Authorization { context, .. } => Some(context),
            PlatformError::Transport { context, .. } => Some(context),
            PlatformError::Unavailable { context, .. } => Some(context),
            PlatformError::NotFound { context, .. } => Some(context),
            PlatformError::Config { context, .. } => Some(context),
            PlatformError::Internal { context, .. } => Some(context),
            _ => None,
        }
    }

    /// Check if error is recoverable by retrying
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            PlatformError::Transport { .. } | PlatformError::Unavailable { .. }
        )
    }

    /// Log the error with appropriate level
    pub fn log(&self) {
        match self {
            PlatformError::Config { .. } | PlatformError::Internal { .. } => {
                error!(
                    error_id = ?self.context().map(|c| &c.error_id),
                    error = %self,
                    "Fatal error occurred"
                );
            }
            PlatformError::Transport { .. } | PlatformError::Unavailable { .. } => {
                warn!(
                    error_id = ?self.context().map(|c| &c.error_id),
                    error = %self,
                    "Service error (may be recoverable)"
                );
            }
            _ => {
                warn!(
                    error_id = ?self.context().map(|c| &c.error_id),
                    error = %self,
                    "Request rejected"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn authorization_error_lists_required_roles() {
        let err = PlatformError::Authorization {
            required_roles: vec!["moderator".to_string(), "admin".to_string()],
            missing_permissions: vec![],
            context: ErrorContext::new("guard"),
        };
        assert_eq!(
            err.to_string(),
            "This action requires one of the following roles: moderator, admin"
        );
    }

    #[test]
    fn authorization_error_lists_missing_permissions() {
        let err = PlatformError::Authorization {
            required_roles: vec![],
            missing_permissions: vec!["manage_users".to_string()],
            context: ErrorContext::new("guard"),
        };
        assert_eq!(err.to_string(), "Missing required permissions: manage_users");
    }

    #[test]
    fn authentication_error_is_generic() {
        // Unknown user and wrong password must render identically
        let err = PlatformError::authentication("identity");
        assert_eq!(err.to_string(), "Invalid credentials");
    }

    #[test]
    fn transport_errors_are_recoverable() {
        assert!(PlatformError::transport("timeout", "channel").is_recoverable());
        assert!(!PlatformError::authentication("identity").is_recoverable());
        assert!(!PlatformError::config("missing secret", "config").is_recoverable());
    }
}
