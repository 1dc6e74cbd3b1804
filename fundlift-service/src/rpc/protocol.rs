//! Wire protocol types
//!
//! The envelope carries an operation name, a correlation id and a single
//! payload value; every request gets exactly one response with the same id.

use fundlift_auth::Role;
use fundlift_core::PlatformError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

// Auth service operations
pub const OP_HASH_PASSWORD: &str = "hashPassword";
pub const OP_COMPARE_PASSWORDS: &str = "comparePasswords";
pub const OP_GENERATE_TOKEN: &str = "generateToken";

// Notification service operations
pub const OP_NOTIFICATIONS_CREATE: &str = "notifications.create";
pub const OP_NOTIFICATIONS_FOR_USER: &str = "notifications.get_user_notifications";
pub const OP_NOTIFICATIONS_MARK_READ: &str = "notifications.mark_as_read";

/// A single request frame
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcRequest {
    pub id: Uuid,
    pub op: String,
    pub payload: Value,
}

impl RpcRequest {
    pub fn new(op: &str, payload: Value) -> Self {
        Self {
            id: Uuid::new_v4(),
            op: op.to_string(),
            payload,
        }
    }
}

/// A single response frame, correlated to a request by id
///
/// `id` is null when the request was too malformed to recover one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcResponse {
    pub id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ok: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub err: Option<RpcErrorBody>,
}

impl RpcResponse {
    pub fn ok(id: Uuid, value: Value) -> Self {
        Self {
            id: Some(id),
            ok: Some(value),
            err: None,
        }
    }

    pub fn err(id: Option<Uuid>, error: &PlatformError) -> Self {
        Self {
            id,
            ok: None,
            err: Some(RpcErrorBody::from_error(error)),
        }
    }
}

/// Error payload crossing the wire
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcErrorBody {
    pub kind: String,
    pub message: String,
}

impl RpcErrorBody {
    pub fn from_error(error: &PlatformError) -> Self {
        let kind = match error {
            PlatformError::Authentication { .. } => "authentication",
            PlatformError::Conflict { .. } => "conflict",
            PlatformError::AuthorizationMissing { .. } => "authorization_missing",
            PlatformError::Authorization { .. } => "authorization",
            PlatformError::Transport { .. } => "transport",
            PlatformError::Unavailable { .. } => "unavailable",
            PlatformError::NotFound { .. } => "not_found",
            PlatformError::Config { .. } => "config",
            PlatformError::Serialization(_) => "invalid_request",
            _ => "internal",
        };
        Self {
            kind: kind.to_string(),
            message: error.to_string(),
        }
    }

    /// Map a remote error envelope back onto the local taxonomy so callers
    /// see one error shape regardless of invocation mode
    pub fn into_platform_error(self, component: &str) -> PlatformError {
        match self.kind.as_str() {
            "authentication" => PlatformError::authentication(component),
            "conflict" => PlatformError::conflict(&self.message, component),
            "authorization_missing" => PlatformError::authorization_missing(component),
            "not_found" => PlatformError::not_found(&self.message, component),
            "unavailable" => PlatformError::unavailable(&self.message, component),
            "transport" => PlatformError::transport(&self.message, component),
            _ => PlatformError::internal(&self.message, component),
        }
    }
}

/// Payload for `comparePasswords`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparePasswordsArgs {
    pub password: String,
    pub hash: String,
}

/// Payload for `generateToken`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateTokenArgs {
    pub email: String,
    pub user_id: String,
    pub role: Role,
}

/// Payload for `notifications.get_user_notifications`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserNotificationsArgs {
    pub user_id: String,
}

/// Payload for `notifications.mark_as_read`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkAsReadArgs {
    pub notification_id: String,
    pub user_id: String,
}
