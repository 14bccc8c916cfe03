use std::path::Path;
use std::sync::Arc;

use clap::Parser;
use tracing::info;

use parley_broker::BrokerBuilder;
use parley_server::api::AppState;
use parley_server::auth::AuthProvider;
use parley_server::config::ParleyConfig;

/// Parley chat HTTP server.
#[derive(Parser, Debug)]
#[command(name = "parley-server", about = "Standalone HTTP server for Parley")]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long, default_value = "parley.toml")]
    config: String,

    /// Override the bind host.
    #[arg(long)]
    host: Option<String>,

    /// Override the bind port.
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing subscriber from RUST_LOG or default to info.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    // Load configuration from TOML file, or use defaults if the file does not exist.
    let mut config: ParleyConfig = if Path::new(&cli.config).exists() {
        let contents = std::fs::read_to_string(&cli.config)?;
        toml::from_str(&contents)?
    } else {
        info!(
            path = %cli.config,
            "config file not found, using defaults"
        );
        toml::from_str("")?
    };

    // CLI overrides take precedence over the config file.
    if let Some(host) = cli.host {
        config.server.host = host;
    }
    if let Some(port) = cli.port {
        config.server.port = port;
    }

    // Create the message store backend.
    let store = parley_server::store_factory::create_store(&config.store).await?;
    info!(backend = %config.store.backend, "message store initialized");

    // Create the blob store for attachments.
    let blob = parley_blob::FsBlobStore::new(&config.upload.directory, config.server.base_url())
        .await
        .map_err(|e| format!("blob store: {e}"))?;
    info!(directory = %config.upload.directory, "blob store initialized");

    // Build the auth provider. Without a configured secret, issued
    // tokens do not survive a restart.
    let jwt_secret = match config.auth.jwt_secret {
        Some(ref secret) => secret.clone(),
        None => {
            tracing::warn!("auth.jwt_secret not set, generating a random secret");
            uuid::Uuid::new_v4().to_string()
        }
    };
    let auth = Arc::new(AuthProvider::new(&jwt_secret, config.auth.jwt_expiry_seconds));

    // Build the delivery broker.
    let broker = BrokerBuilder::new()
        .store(store)
        .channel_capacity(config.stream.channel_capacity)
        .max_sessions_per_user(config.stream.max_sessions_per_user)
        .build()?;

    let state = AppState {
        broker: Arc::new(broker),
        blob: Arc::new(blob),
        auth,
        uploads_dir: config.upload.directory.clone(),
    };
    let app = parley_server::api::router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(address = %addr, "parley-server listening");

    // Serve with graceful shutdown on SIGINT / SIGTERM.
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("parley-server shut down");
    Ok(())
}

/// Wait for SIGINT (Ctrl+C) or SIGTERM, then return to trigger graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => { info!("received SIGINT"); }
        () = terminate => { info!("received SIGTERM"); }
    }
}
