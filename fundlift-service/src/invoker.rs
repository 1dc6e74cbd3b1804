//! Dual-mode auth invocation
//!
//! The mode is fixed once, at construction, from configuration: a remote
//! address routes every call over the channel, its absence selects the
//! in-process gateway. Business logic never branches on the mode again, and
//! a remote failure is reported, never silently downgraded to local
//! execution.

use crate::rpc::channel::RemoteChannel;
use crate::rpc::protocol::{
    ComparePasswordsArgs, GenerateTokenArgs, OP_COMPARE_PASSWORDS, OP_GENERATE_TOKEN,
    OP_HASH_PASSWORD,
};
use async_trait::async_trait;
use fundlift_auth::{AuthGateway, LocalAuthGateway, Role};
use fundlift_core::{PlatformConfig, PlatformResult};
use serde_json::json;
use std::sync::Arc;
use tracing::info;

/// Auth gateway calls, local or remote, behind one interface
#[derive(Clone)]
pub enum AuthInvoker {
    Local(Arc<LocalAuthGateway>),
    Remote(Arc<RemoteChannel>),
}

impl AuthInvoker {
    pub fn local(gateway: Arc<LocalAuthGateway>) -> Self {
        AuthInvoker::Local(gateway)
    }

    pub fn remote(channel: Arc<RemoteChannel>) -> Self {
        AuthInvoker::Remote(channel)
    }

    /// Resolve the invocation mode from configuration
    ///
    /// Called once at startup; the returned invoker is shared for the
    /// process lifetime.
    pub async fn from_config(config: &PlatformConfig) -> PlatformResult<Self> {
        match &config.remote {
            Some(remote) => {
                info!(addr = %remote.addr, "auth operations route over the remote channel");
                Ok(AuthInvoker::Remote(Arc::new(
                    RemoteChannel::connect(remote).await?,
                )))
            }
            None => {
                info!("auth operations execute in-process");
                Ok(AuthInvoker::Local(Arc::new(LocalAuthGateway::from_config(
                    config,
                )?)))
            }
        }
    }
}

#[async_trait]
impl AuthGateway for AuthInvoker {
    async fn hash_password(&self, password: &str) -> PlatformResult<String> {
        match self {
            AuthInvoker::Local(gateway) => gateway.hash_password(password).await,
            AuthInvoker::Remote(channel) => {
                let value = channel.call(OP_HASH_PASSWORD, json!(password)).await?;
                Ok(serde_json::from_value(value)?)
            }
        }
    }

    async fn compare_passwords(&self, password: &str, digest: &str) -> PlatformResult<bool> {
        match self {
            AuthInvoker::Local(gateway) => gateway.compare_passwords(password, digest).await,
            AuthInvoker::Remote(channel) => {
                let args = ComparePasswordsArgs {
                    password: password.to_string(),
                    hash: digest.to_string(),
                };
                let value = channel
                    .call(OP_COMPARE_PASSWORDS, serde_json::to_value(args)?)
                    .await?;
                Ok(serde_json::from_value(value)?)
            }
        }
    }

    async fn issue_token(&self, email: &str, user_id: &str, role: Role) -> PlatformResult<String> {
        match self {
            AuthInvoker::Local(gateway) => gateway.issue_token(email, user_id, role).await,
            AuthInvoker::Remote(channel) => {
                let args = GenerateTokenArgs {
                    email: email.to_string(),
                    user_id: user_id.to_string(),
                    role,
                };
                let value = channel
                    .call(OP_GENERATE_TOKEN, serde_json::to_value(args)?)
                    .await?;
                Ok(serde_json::from_value(value)?)
            }
        }
    }
}
