//! Notification service and its dual-mode client
//!
//! The second consumer of the dual-mode pattern: the same operations run
//! against the in-process service or over the remote channel, chosen once
//! at construction.

use crate::rpc::channel::RemoteChannel;
use crate::rpc::protocol::{
    MarkAsReadArgs, UserNotificationsArgs, OP_NOTIFICATIONS_CREATE, OP_NOTIFICATIONS_FOR_USER,
    OP_NOTIFICATIONS_MARK_READ,
};
use chrono::{DateTime, Utc};
use fundlift_core::{PlatformError, PlatformResult};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tracing::debug;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NotificationKind {
    Info,
    Success,
    Warning,
    Error,
}

/// A notification delivered to one user
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub message: String,
    pub kind: NotificationKind,
    pub action_url: Option<String>,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

/// Input for creating a notification
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateNotification {
    pub user_id: String,
    pub title: String,
    pub message: String,
    pub kind: NotificationKind,
    pub action_url: Option<String>,
}

impl CreateNotification {
    pub fn info(user_id: &str, title: &str, message: &str) -> Self {
        Self::with_kind(user_id, title, message, NotificationKind::Info)
    }

    pub fn success(user_id: &str, title: &str, message: &str) -> Self {
        Self::with_kind(user_id, title, message, NotificationKind::Success)
    }

    pub fn warning(user_id: &str, title: &str, message: &str) -> Self {
        Self::with_kind(user_id, title, message, NotificationKind::Warning)
    }

    pub fn error(user_id: &str, title: &str, message: &str) -> Self {
        Self::with_kind(user_id, title, message, NotificationKind::Error)
    }

    fn with_kind(user_id: &str, title: &str, message: &str, kind: NotificationKind) -> Self {
        Self {
            user_id: user_id.to_string(),
            title: title.to_string(),
            message: message.to_string(),
            kind,
            action_url: None,
        }
    }

    pub fn with_action_url(mut self, url: &str) -> Self {
        self.action_url = Some(url.to_string());
        self
    }
}

/// In-process notification storage and operations
#[derive(Debug, Default)]
pub struct NotificationsService {
    by_user: RwLock<HashMap<String, Vec<Notification>>>,
}

impl NotificationsService {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn create(&self, input: CreateNotification) -> PlatformResult<Notification> {
        let notification = Notification {
            id: Uuid::new_v4().to_string(),
            user_id: input.user_id.clone(),
            title: input.title,
            message: input.message,
            kind: input.kind,
            action_url: input.action_url,
            read: false,
            created_at: Utc::now(),
        };

        let mut by_user = self.by_user.write().unwrap();
        by_user
            .entry(input.user_id)
            .or_default()
            .push(notification.clone());

        debug!(notification_id = %notification.id, "notification created");
        Ok(notification)
    }

    pub async fn notifications_for_user(&self, user_id: &str) -> PlatformResult<Vec<Notification>> {
        let by_user = self.by_user.read().unwrap();
        Ok(by_user.get(user_id).cloned().unwrap_or_default())
    }

    pub async fn mark_as_read(
        &self,
        notification_id: &str,
        user_id: &str,
    ) -> PlatformResult<Notification> {
        let mut by_user = self.by_user.write().unwrap();
        let notifications = by_user
            .get_mut(user_id)
            .ok_or_else(|| PlatformError::not_found("notification", "notifications"))?;

        let notification = notifications
            .iter_mut()
            .find(|n| n.id == notification_id)
            .ok_or_else(|| PlatformError::not_found("notification", "notifications"))?;

        notification.read = true;
        Ok(notification.clone())
    }
}

/// Notification operations, local or remote, behind one interface
#[derive(Debug, Clone)]
pub enum NotificationsClient {
    Local(Arc<NotificationsService>),
    Remote(Arc<RemoteChannel>),
}

impl NotificationsClient {
    pub fn local(service: Arc<NotificationsService>) -> Self {
        NotificationsClient::Local(service)
    }

    pub fn remote(channel: Arc<RemoteChannel>) -> Self {
        NotificationsClient::Remote(channel)
    }

    pub async fn create(&self, input: CreateNotification) -> PlatformResult<Notification> {
        match self {
            NotificationsClient::Local(service) => service.create(input).await,
            NotificationsClient::Remote(channel) => {
                let value = channel
                    .call(OP_NOTIFICATIONS_CREATE, serde_json::to_value(input)?)
                    .await?;
                Ok(serde_json::from_value(value)?)
            }
        }
    }

    pub async fn notifications_for_user(&self, user_id: &str) -> PlatformResult<Vec<Notification>> {
        match self {
            NotificationsClient::Local(service) => service.notifications_for_user(user_id).await,
            NotificationsClient::Remote(channel) => {
                let args = UserNotificationsArgs {
                    user_id: user_id.to_string(),
                };
                let value = channel
                    .call(OP_NOTIFICATIONS_FOR_USER, serde_json::to_value(args)?)
                    .await?;
                Ok(serde_json::from_value(value)?)
            }
        }
    }

    pub async fn mark_as_read(
        &self,
        notification_id: &str,
        user_id: &str,
    ) -> PlatformResult<Notification> {
        match self {
            NotificationsClient::Local(service) => {
                service.mark_as_read(notification_id, user_id).await
            }
            NotificationsClient::Remote(channel) => {
                let args = MarkAsReadArgs {
                    notification_id: notification_id.to_string(),
                    user_id: user_id.to_string(),
                };
                let value = channel
                    .call(OP_NOTIFICATIONS_MARK_READ, serde_json::to_value(args)?)
                    .await?;
                Ok(serde_json::from_value(value)?)
            }
        }
    }
}
