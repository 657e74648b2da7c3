/// SSO Service Main Entry Point
///
/// Starts gRPC server with:
/// - SQLite credential store (migrated on startup)
/// - HS256 token issuer (secret validated before anything else starts)
/// - gRPC health service
use anyhow::{Context, Result};
use sso_service::{
    config::{AppEnv, Settings},
    grpc::{correlation_interceptor, sso::auth::auth_server::AuthServer, SsoGrpcServer},
    security::{JwtIssuer, PasswordHasher},
    storage::Storage,
    AuthService,
};
use std::sync::Arc;
use tokio::signal;
use tonic::transport::Server;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let settings = Settings::load().context("Failed to load configuration")?;

    init_tracing(settings.env);

    info!(
        env = %settings.env,
        port = settings.grpc.port,
        "Starting SSO service"
    );

    let issuer = JwtIssuer::new(&settings.jwt.secret).context("Failed to initialize JWT signing key")?;
    info!("JWT signing key initialized");

    let storage = Storage::connect(&settings.storage.path, settings.storage.max_connections)
        .await
        .context("Failed to open SQLite storage")?;
    storage
        .migrate()
        .await
        .context("Failed to run database migrations")?;
    info!(path = %settings.storage.path, "Storage ready");

    let storage = Arc::new(storage);
    let auth = AuthService::new(
        storage.clone(),
        storage.clone(),
        storage,
        PasswordHasher::default(),
        issuer,
        settings.jwt.token_ttl,
    );
    let sso_server = SsoGrpcServer::new(auth, settings.grpc.timeout);

    let (mut health_reporter, health_service) = tonic_health::server::health_reporter();
    health_reporter
        .set_serving::<AuthServer<SsoGrpcServer>>()
        .await;

    let addr = format!("{}:{}", settings.grpc.host, settings.grpc.port)
        .parse()
        .context("Invalid server address")?;

    info!("Starting gRPC server on {}", addr);

    Server::builder()
        .add_service(health_service)
        .add_service(AuthServer::with_interceptor(
            sso_server,
            correlation_interceptor,
        ))
        .serve_with_shutdown(addr, shutdown_signal())
        .await
        .context("gRPC server error")?;

    info!("SSO service shutdown complete");

    Ok(())
}

/// Pretty output locally, JSON elsewhere; `RUST_LOG` overrides the level
fn init_tracing(env: AppEnv) {
    let default_filter = match env {
        AppEnv::Local | AppEnv::Dev => "sso_service=debug,info",
        AppEnv::Prod => "sso_service=info,info",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    match env {
        AppEnv::Local => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .pretty()
            .init(),
        AppEnv::Dev | AppEnv::Prod => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .json()
            .init(),
    }
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal");
        },
        _ = terminate => {
            info!("Received SIGTERM signal");
        },
    }

    info!("Shutting down gracefully...");
}
