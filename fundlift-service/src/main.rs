//! Fundlift auth daemon
//!
//! Serves the auth gateway and notification operations over the RPC channel
//! so that other processes can call them without holding the hashing
//! parameters or the signing secret.

use clap::Parser;
use fundlift_auth::{LocalAuthGateway, RolePermissionTable};
use fundlift_core::{init_logging, PlatformConfig};
use fundlift_service::rpc::server;
use fundlift_service::{NotificationsService, RpcDispatcher};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

/// Fundlift auth daemon - credential hashing and token issuance service
#[derive(Parser)]
#[command(name = "fundlift-authd")]
#[command(about = "Auth service daemon for the Fundlift platform")]
#[command(version)]
struct Args {
    /// Path to a TOML configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Address to listen on
    #[arg(long, default_value = "127.0.0.1:4001")]
    bind: String,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    // Load environment variables
    dotenvy::dotenv().ok();

    let config = match load_config(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("configuration error: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = init_logging(&config.logging) {
        eprintln!("failed to initialize logging: {}", e);
        std::process::exit(1);
    }

    if let Err(e) = run(&args, &config).await {
        tracing::error!(error = %e, "daemon exited with error");
        std::process::exit(1);
    }
}

fn load_config(args: &Args) -> anyhow::Result<PlatformConfig> {
    let config = match &args.config {
        Some(path) => PlatformConfig::from_file(path)?,
        None => PlatformConfig::default(),
    }
    .apply_env();

    // Misconfiguration is fatal; the daemon must not start without a
    // signing secret or with a malformed policy table
    config.validate()?;
    RolePermissionTable::platform_defaults().validate()?;

    Ok(config)
}

async fn run(args: &Args, config: &PlatformConfig) -> anyhow::Result<()> {
    let gateway = Arc::new(LocalAuthGateway::from_config(config)?);
    let notifications = Arc::new(NotificationsService::new());
    let dispatcher = Arc::new(RpcDispatcher::new(gateway, notifications));

    let listener = TcpListener::bind(&args.bind).await?;
    info!(addr = %args.bind, "fundlift auth daemon listening");

    server::serve(listener, dispatcher).await?;
    Ok(())
}
