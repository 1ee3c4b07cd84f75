use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tracing::{info, warn};

use linkvault_core::RandomTokenGenerator;
use linkvault_engine::{DropEngineBuilder, ExpirySweeper};
use linkvault_server::api::AppState;
use linkvault_server::config::LinkVaultConfig;

/// LinkVault temporary drop server.
#[derive(Parser, Debug)]
#[command(name = "linkvault-server", about = "HTTP server for LinkVault temporary drops")]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long, default_value = "linkvault.toml")]
    config: String,

    /// Override the bind host.
    #[arg(long)]
    host: Option<String>,

    /// Override the bind port.
    #[arg(long)]
    port: Option<u16>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run database migrations for the configured drop store, then exit.
    Migrate,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Load configuration from TOML file, or use defaults if the file does not exist.
    let config_exists = Path::new(&cli.config).exists();
    let config: LinkVaultConfig = if config_exists {
        let contents = std::fs::read_to_string(&cli.config)?;
        toml::from_str(&contents)?
    } else {
        toml::from_str("")?
    };

    linkvault_server::telemetry::init(&config.telemetry);

    if !config_exists {
        info!(path = %cli.config, "config file not found, using defaults");
    }

    if let Some(Commands::Migrate) = cli.command {
        return run_migrate(&config).await;
    }

    let store = linkvault_server::store_factory::create_store(&config.store).await?;
    info!(backend = %config.store.backend, "drop store initialized");

    let max_upload_bytes = config.server.max_upload_bytes;
    let blobs =
        linkvault_server::blob_factory::create_blob_store(&config.blob, max_upload_bytes as u64)
            .await?;
    info!(backend = %config.blob.backend, "blob store initialized");

    let engine = DropEngineBuilder::new()
        .store(store)
        .blobs(blobs)
        .tokens(Arc::new(RandomTokenGenerator::with_lengths(
            config.drops.id_length,
            config.drops.delete_token_length,
        )))
        .default_ttl_minutes(config.drops.default_ttl_minutes)
        .max_ttl_minutes(config.drops.max_ttl_minutes)
        .max_insert_attempts(config.drops.max_insert_attempts)
        .build()?;

    // Start the expiry sweeper on its own task.
    let sweeper = if config.sweeper.enabled {
        let (mut sweeper, shutdown_tx) =
            ExpirySweeper::new(&engine, config.sweeper.to_sweeper_config());
        let handle = tokio::spawn(async move {
            sweeper.run().await;
        });
        Some((shutdown_tx, handle))
    } else {
        info!("expiry sweeper disabled");
        None
    };

    let state = AppState {
        engine,
        public_url: config.server.public_url(),
        max_upload_bytes,
    };
    let app = linkvault_server::api::router(state);

    // Resolve the bind address (CLI overrides take precedence).
    let host = cli.host.unwrap_or(config.server.host);
    let port = cli.port.unwrap_or(config.server.port);
    let addr = format!("{host}:{port}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(address = %addr, "linkvault-server listening");

    // Serve with graceful shutdown on SIGINT / SIGTERM.
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Stop the sweeper, letting an in-progress sweep finish.
    if let Some((shutdown_tx, handle)) = sweeper {
        let _ = shutdown_tx.send(()).await;
        let shutdown_timeout = Duration::from_secs(config.server.shutdown_timeout_seconds);
        if tokio::time::timeout(shutdown_timeout, handle).await.is_err() {
            warn!(
                timeout_secs = config.server.shutdown_timeout_seconds,
                "shutdown timeout exceeded, abandoning expiry sweep"
            );
        }
    }

    info!("linkvault-server shut down");
    Ok(())
}

/// Run the `migrate` subcommand: initialize the drop store schema and exit.
async fn run_migrate(config: &LinkVaultConfig) -> Result<(), Box<dyn std::error::Error>> {
    info!(backend = %config.store.backend, "running drop store migrations...");
    let _store = linkvault_server::store_factory::create_store(&config.store).await?;
    info!(backend = %config.store.backend, "drop store migrations complete");
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
