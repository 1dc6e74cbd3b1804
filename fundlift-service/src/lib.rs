//! Fundlift service layer
//!
//! Presents the auth gateway (and the notification service) behind one call
//! interface regardless of whether the implementation runs in-process or
//! behind the remote channel, and hosts the signup/login orchestration on
//! top of it. The `fundlift-authd` binary serves the remote end.

pub mod identity;
pub mod invoker;
pub mod notifications;
pub mod rpc;

pub use identity::{IdentityService, InMemoryUserStore, UserInfo, UserRecord, UserStore};
pub use invoker::AuthInvoker;
pub use notifications::{
    CreateNotification, Notification, NotificationKind, NotificationsClient, NotificationsService,
};
pub use rpc::channel::RemoteChannel;
pub use rpc::server::RpcDispatcher;
