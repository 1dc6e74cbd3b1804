//! End-to-end tests for the auth service
//!
//! Covers the signup/login scenario, contract parity between the local and
//! remote invocation paths against a live in-process RPC server, and the
//! guard evaluated over the platform policy table.

use fundlift_auth::{
    AccessGuard, AuthGateway, AuthenticatedRequest, GraphQueryContext, LocalAuthGateway,
    OperationPolicies, Principal, RequestContext, Role, RolePermissionTable,
};
use fundlift_core::{
    AuthConfig, HashingConfig, PlatformConfig, PlatformError, RemoteConfig,
};
use fundlift_service::rpc::server;
use fundlift_service::{
    AuthInvoker, CreateNotification, IdentityService, InMemoryUserStore, NotificationsClient,
    NotificationsService, RemoteChannel, RpcDispatcher,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;

fn test_config() -> PlatformConfig {
    PlatformConfig {
        auth: AuthConfig {
            jwt_secret: "integration-test-secret".to_string(),
            token_ttl_secs: 3600,
        },
        // Minimal work factor to keep tests quick
        hashing: HashingConfig {
            memory_kib: 8,
            iterations: 1,
            parallelism: 1,
        },
        ..Default::default()
    }
}

/// Start an RPC server on an ephemeral port, returning its address
async fn spawn_server(config: &PlatformConfig) -> SocketAddr {
    let gateway = Arc::new(LocalAuthGateway::from_config(config).unwrap());
    let notifications = Arc::new(NotificationsService::new());
    let dispatcher = Arc::new(RpcDispatcher::new(gateway, notifications));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = server::serve(listener, dispatcher).await;
    });
    addr
}

async fn connect(addr: SocketAddr) -> RemoteChannel {
    RemoteChannel::connect(&RemoteConfig {
        addr: addr.to_string(),
        request_timeout_ms: 2000,
    })
    .await
    .unwrap()
}

#[tokio::test]
async fn signup_login_scenario() {
    let config = test_config();
    let gateway = Arc::new(LocalAuthGateway::from_config(&config).unwrap());
    let invoker = AuthInvoker::local(gateway.clone());
    let service = IdentityService::bootstrap(Arc::new(invoker), Arc::new(InMemoryUserStore::new()))
        .await
        .unwrap();

    // First signup succeeds
    let info = service.signup("a@x.com", "A", "secret1").await.unwrap();
    assert_eq!(info.email, "a@x.com");
    assert_eq!(info.role, Role::Supporter);

    // Second signup with the same email is a conflict
    assert!(matches!(
        service.signup("a@x.com", "A", "secret1").await,
        Err(PlatformError::Conflict { .. })
    ));

    // Login with the right password yields a verifiable token
    let token = service.login("a@x.com", "secret1").await.unwrap();
    let claims = gateway.verify_token(&token).unwrap();
    assert_eq!(claims.sub, "a@x.com");
    assert_eq!(claims.user_id, info.id);
    assert_eq!(claims.role, Role::Supporter);

    // Wrong password and unknown user fail with the same kind
    let wrong = service.login("a@x.com", "wrong").await.unwrap_err();
    let unknown = service.login("nouser@x.com", "x").await.unwrap_err();
    assert!(matches!(wrong, PlatformError::Authentication { .. }));
    assert!(matches!(unknown, PlatformError::Authentication { .. }));
    assert_eq!(wrong.to_string(), unknown.to_string());
}

#[tokio::test]
async fn local_and_remote_paths_agree() {
    let config = test_config();
    let addr = spawn_server(&config).await;

    let local_gateway = Arc::new(LocalAuthGateway::from_config(&config).unwrap());
    let local = AuthInvoker::local(local_gateway.clone());

    let remote_config = PlatformConfig {
        remote: Some(RemoteConfig {
            addr: addr.to_string(),
            request_timeout_ms: 2000,
        }),
        ..test_config()
    };
    let remote = AuthInvoker::from_config(&remote_config).await.unwrap();
    assert!(matches!(remote, AuthInvoker::Remote(_)));

    // A digest produced on either path verifies on both
    let local_digest = local.hash_password("secret1").await.unwrap();
    let remote_digest = remote.hash_password("secret1").await.unwrap();

    for digest in [&local_digest, &remote_digest] {
        assert!(local.compare_passwords("secret1", digest).await.unwrap());
        assert!(remote.compare_passwords("secret1", digest).await.unwrap());
        assert!(!local.compare_passwords("wrong", digest).await.unwrap());
        assert!(!remote.compare_passwords("wrong", digest).await.unwrap());
    }

    // Tokens issued on either path carry the same claims
    let local_token = local
        .issue_token("a@x.com", "user-1", Role::Moderator)
        .await
        .unwrap();
    let remote_token = remote
        .issue_token("a@x.com", "user-1", Role::Moderator)
        .await
        .unwrap();

    let local_claims = local_gateway.verify_token(&local_token).unwrap();
    let remote_claims = local_gateway.verify_token(&remote_token).unwrap();
    assert_eq!(local_claims.sub, remote_claims.sub);
    assert_eq!(local_claims.user_id, remote_claims.user_id);
    assert_eq!(local_claims.role, remote_claims.role);
}

#[tokio::test]
async fn identity_service_runs_over_the_remote_channel() {
    let config = test_config();
    let addr = spawn_server(&config).await;

    let remote_config = PlatformConfig {
        remote: Some(RemoteConfig {
            addr: addr.to_string(),
            request_timeout_ms: 2000,
        }),
        ..test_config()
    };
    let invoker = AuthInvoker::from_config(&remote_config).await.unwrap();
    let service = IdentityService::bootstrap(Arc::new(invoker), Arc::new(InMemoryUserStore::new()))
        .await
        .unwrap();

    service.signup("b@x.com", "B", "secret2").await.unwrap();
    let token = service.login("b@x.com", "secret2").await.unwrap();
    assert!(!token.is_empty());

    // The server holds the signing secret; a local gateway built from the
    // same configuration accepts the token
    let verifier = LocalAuthGateway::from_config(&config).unwrap();
    let claims = verifier.verify_token(&token).unwrap();
    assert_eq!(claims.sub, "b@x.com");

    assert!(matches!(
        service.login("b@x.com", "wrong").await,
        Err(PlatformError::Authentication { .. })
    ));
}

#[tokio::test]
async fn unknown_remote_operation_is_reported() {
    let addr = spawn_server(&test_config()).await;
    let channel = connect(addr).await;

    match channel.call("fabricateMoney", serde_json::json!(null)).await {
        Err(PlatformError::NotFound { .. }) => {}
        other => panic!("expected NotFound, got {:?}", other),
    }
}

#[tokio::test]
async fn remote_timeout_is_a_transport_failure() {
    // A listener that accepts connections but never answers
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let (_stream, _) = listener.accept().await.unwrap();
        tokio::time::sleep(std::time::Duration::from_secs(60)).await;
    });

    let channel = RemoteChannel::connect(&RemoteConfig {
        addr: addr.to_string(),
        request_timeout_ms: 200,
    })
    .await
    .unwrap();

    match channel
        .call("hashPassword", serde_json::json!("secret1"))
        .await
    {
        Err(PlatformError::Transport { .. }) => {}
        other => panic!("expected Transport, got {:?}", other),
    }
}

#[tokio::test]
async fn connecting_to_a_dead_address_fails() {
    // Bind then drop to get an address nothing listens on
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let result = RemoteChannel::connect(&RemoteConfig {
        addr: addr.to_string(),
        request_timeout_ms: 200,
    })
    .await;
    assert!(matches!(result, Err(PlatformError::Transport { .. })));
}

#[tokio::test]
async fn notification_operations_agree_across_modes() {
    let addr = spawn_server(&test_config()).await;
    let remote = NotificationsClient::remote(Arc::new(connect(addr).await));

    let created = remote
        .create(
            CreateNotification::info("user-7", "Campaign approved", "Your campaign is live")
                .with_action_url("/campaigns/7"),
        )
        .await
        .unwrap();
    assert_eq!(created.user_id, "user-7");
    assert!(!created.read);

    let listed = remote.notifications_for_user("user-7").await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, created.id);

    let updated = remote.mark_as_read(&created.id, "user-7").await.unwrap();
    assert!(updated.read);

    // Same sequence against the in-process service behaves identically
    let local = NotificationsClient::local(Arc::new(NotificationsService::new()));
    let created = local
        .create(CreateNotification::info(
            "user-7",
            "Campaign approved",
            "Your campaign is live",
        ))
        .await
        .unwrap();
    let listed = local.notifications_for_user("user-7").await.unwrap();
    assert_eq!(listed.len(), 1);
    let updated = local.mark_as_read(&created.id, "user-7").await.unwrap();
    assert!(updated.read);
}

#[tokio::test]
async fn guard_enforces_platform_policies_over_graph_context() {
    let table = Arc::new(RolePermissionTable::platform_defaults());
    let guard = AccessGuard::new(table);
    let policies = OperationPolicies::platform_defaults();
    let policy = policies.policy_for("approveCampaign");

    let moderator = RequestContext::graph(GraphQueryContext {
        request: Some(AuthenticatedRequest::authenticated(Principal::new(
            "user-1",
            Role::Moderator,
        ))),
        operation_name: Some("approveCampaign".to_string()),
    });
    assert!(guard.check(&policy, &moderator).is_ok());

    let supporter = RequestContext::graph(GraphQueryContext {
        request: Some(AuthenticatedRequest::authenticated(Principal::new(
            "user-2",
            Role::Supporter,
        ))),
        operation_name: Some("approveCampaign".to_string()),
    });
    match guard.check(&policy, &supporter) {
        Err(PlatformError::Authorization { required_roles, .. }) => {
            assert_eq!(required_roles, vec!["moderator", "admin"]);
        }
        other => panic!("expected Authorization, got {:?}", other.err()),
    }

    let anonymous = RequestContext::graph(GraphQueryContext::default());
    assert!(matches!(
        guard.check(&policy, &anonymous),
        Err(PlatformError::AuthorizationMissing { .. })
    ));
}
