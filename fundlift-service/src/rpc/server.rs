//! RPC server
//!
//! Listens on the configured TCP address, one task per connection, and
//! dispatches each request frame to the local auth gateway or notification
//! service by operation name.

use crate::notifications::{CreateNotification, NotificationsService};
use crate::rpc::protocol::{
    ComparePasswordsArgs, GenerateTokenArgs, MarkAsReadArgs, RpcRequest, RpcResponse,
    UserNotificationsArgs, OP_COMPARE_PASSWORDS, OP_GENERATE_TOKEN, OP_HASH_PASSWORD,
    OP_NOTIFICATIONS_CREATE, OP_NOTIFICATIONS_FOR_USER, OP_NOTIFICATIONS_MARK_READ,
};
use fundlift_auth::{AuthGateway, LocalAuthGateway};
use fundlift_core::{PlatformError, PlatformResult};
use serde_json::Value;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tracing::{debug, info, warn};

/// Maps operation names onto the in-process service implementations
pub struct RpcDispatcher {
    gateway: Arc<LocalAuthGateway>,
    notifications: Arc<NotificationsService>,
}

impl RpcDispatcher {
    pub fn new(gateway: Arc<LocalAuthGateway>, notifications: Arc<NotificationsService>) -> Self {
        Self {
            gateway,
            notifications,
        }
    }

    /// Execute one request and produce its correlated response frame
    pub async fn dispatch(&self, request: RpcRequest) -> RpcResponse {
        debug!(op = %request.op, id = %request.id, "dispatching");
        match self.execute(&request.op, request.payload).await {
            Ok(value) => RpcResponse::ok(request.id, value),
            Err(error) => {
                error.log();
                RpcResponse::err(Some(request.id), &error)
            }
        }
    }

    async fn execute(&self, op: &str, payload: Value) -> PlatformResult<Value> {
        match op {
            OP_HASH_PASSWORD => {
                let password: String = serde_json::from_value(payload)?;
                let digest = self.gateway.hash_password(&password).await?;
                Ok(Value::String(digest))
            }
            OP_COMPARE_PASSWORDS => {
                let args: ComparePasswordsArgs = serde_json::from_value(payload)?;
                let matches = self
                    .gateway
                    .compare_passwords(&args.password, &args.hash)
                    .await?;
                Ok(Value::Bool(matches))
            }
            OP_GENERATE_TOKEN => {
                let args: GenerateTokenArgs = serde_json::from_value(payload)?;
                let token = self
                    .gateway
                    .issue_token(&args.email, &args.user_id, args.role)
                    .await?;
                Ok(Value::String(token))
            }
            OP_NOTIFICATIONS_CREATE => {
                let input: CreateNotification = serde_json::from_value(payload)?;
                let notification = self.notifications.create(input).await?;
                Ok(serde_json::to_value(notification)?)
            }
            OP_NOTIFICATIONS_FOR_USER => {
                let args: UserNotificationsArgs = serde_json::from_value(payload)?;
                let notifications = self.notifications.notifications_for_user(&args.user_id).await?;
                Ok(serde_json::to_value(notifications)?)
            }
            OP_NOTIFICATIONS_MARK_READ => {
                let args: MarkAsReadArgs = serde_json::from_value(payload)?;
                let notification = self
                    .notifications
                    .mark_as_read(&args.notification_id, &args.user_id)
                    .await?;
                Ok(serde_json::to_value(notification)?)
            }
            unknown => Err(PlatformError::not_found(
                &format!("operation '{}'", unknown),
                "rpc-server",
            )),
        }
    }
}

/// Accept connections until the listener fails
pub async fn serve(listener: TcpListener, dispatcher: Arc<RpcDispatcher>) -> PlatformResult<()> {
    loop {
        let (stream, peer) = listener.accept().await?;
        debug!(peer = %peer, "connection accepted");
        let dispatcher = dispatcher.clone();
        tokio::spawn(async move {
            if let Err(e) = handle_connection(stream, dispatcher).await {
                warn!(peer = %peer, error = %e, "connection closed with error");
            }
        });
    }
}

async fn handle_connection(stream: TcpStream, dispatcher: Arc<RpcDispatcher>) -> PlatformResult<()> {
    let (read_half, mut write_half) = stream.into_split();
    let mut reader = BufReader::new(read_half);
    let mut line = String::new();

    loop {
        line.clear();
        let read = reader.read_line(&mut line).await?;
        if read == 0 {
            info!("peer disconnected");
            return Ok(());
        }
        if line.trim().is_empty() {
            continue;
        }

        let response = match serde_json::from_str::<RpcRequest>(line.trim()) {
            Ok(request) => dispatcher.dispatch(request).await,
            Err(e) => {
                warn!(error = %e, "discarding malformed request frame");
                RpcResponse::err(None, &PlatformError::Serialization(e))
            }
        };

        let mut frame = serde_json::to_string(&response)?;
        frame.push('\n');
        write_half.write_all(frame.as_bytes()).await?;
    }
}
