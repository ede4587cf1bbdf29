//! Main entry point for the Pesto registration service
//!
//! Loads configuration, initializes logging and storage, and serves the
//! registration API until SIGINT/SIGTERM.

use anyhow::Result;
use clap::Parser;
use pesto_registration::api::HttpServer;
use pesto_registration::config::{validate_config, AppConfig, StorageBackend};
use pesto_registration::service::AppState;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info, warn};

/// Pesto Registration Service - waitlist sign-ups over HTTP
#[derive(Parser)]
#[command(
    name = "pesto-registration",
    version,
    about = "A waitlist registration microservice",
    long_about = "Pesto Registration accepts user sign-ups on POST /api/register, keeps them \
                 as an ordered waitlist in a key/value store, and lists pending registrants \
                 on GET /api/pending."
)]
struct Args {
    /// Configuration file path
    #[arg(
        short,
        long,
        value_name = "FILE",
        help = "Path to configuration file (TOML format)"
    )]
    config: Option<PathBuf>,

    /// Log level override
    #[arg(
        short,
        long,
        value_name = "LEVEL",
        help = "Override log level (trace, debug, info, warn, error)"
    )]
    log_level: Option<String>,

    /// HTTP host override
    #[arg(long, value_name = "HOST", help = "Override HTTP bind host")]
    host: Option<String>,

    /// HTTP port override
    #[arg(long, value_name = "PORT", help = "Override HTTP server port")]
    http_port: Option<u16>,

    /// Storage backend override
    #[arg(long, value_name = "BACKEND", help = "Storage backend (memory, file)")]
    storage_backend: Option<StorageBackend>,

    /// Data directory override
    #[arg(long, value_name = "DIR", help = "Data directory for the file backend")]
    data_dir: Option<PathBuf>,

    /// Enable debug mode
    #[arg(short, long, help = "Enable debug mode with verbose logging")]
    debug: bool,

    /// Dry run mode (validate config and exit)
    #[arg(
        long,
        help = "Validate configuration and exit without starting service"
    )]
    dry_run: bool,
}

/// Initialize structured logging with the configured level
fn init_logging(log_level: &str) -> Result<()> {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_level.into()),
        )
        .with_target(false)
        .with_thread_ids(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    Ok(())
}

/// Wait for shutdown signals (SIGINT, SIGTERM)
async fn wait_for_shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received SIGINT (Ctrl+C) signal");
        },
        _ = terminate => {
            info!("Received SIGTERM signal");
        },
    }
}

/// Display startup banner with service information
fn display_startup_banner(config: &AppConfig) {
    info!("Pesto Registration Service");
    info!("   Service: {}", config.service.name);
    info!("   Log level: {}", config.service.log_level);
    info!("   Listen: {}", config.bind_address());
    info!("   Storage: {}", config.storage.backend);
    if config.storage.backend == StorageBackend::File {
        info!("   Data dir: {}", config.storage.data_dir.display());
    }
    info!("   Waitlist key: {}", config.storage.waitlist_key);
}

/// Load configuration from file or environment, then apply CLI overrides
fn load_config(args: &Args) -> Result<AppConfig> {
    let mut config = if let Some(config_path) = &args.config {
        AppConfig::from_file(config_path)?
    } else {
        AppConfig::from_env()?
    };

    // Apply CLI overrides
    if let Some(log_level) = &args.log_level {
        config.service.log_level = log_level.clone();
    }

    if args.debug {
        config.service.log_level = "debug".to_string();
    }

    if let Some(host) = &args.host {
        config.service.host = host.clone();
    }

    if let Some(http_port) = args.http_port {
        config.service.http_port = http_port;
    }

    if let Some(backend) = args.storage_backend {
        config.storage.backend = backend;
    }

    if let Some(data_dir) = &args.data_dir {
        config.storage.data_dir = data_dir.clone();
    }

    validate_config(&config)?;
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Load configuration (CLI args can override environment/config file)
    let config = load_config(&args).unwrap_or_else(|e| {
        eprintln!("Configuration error: {}", e);
        std::process::exit(1);
    });

    // Initialize logging early (before any other operations)
    if let Err(e) = init_logging(&config.service.log_level) {
        eprintln!("Failed to initialize logging: {}", e);
        std::process::exit(1);
    }

    if args.dry_run {
        info!("Configuration validation successful");
        display_startup_banner(&config);
        info!("Dry run completed - exiting without starting service");
        return Ok(());
    }

    display_startup_banner(&config);

    let app_state = match AppState::new(config.clone()) {
        Ok(state) => Arc::new(state),
        Err(e) => {
            error!("Failed to initialize application: {}", e);
            std::process::exit(1);
        }
    };

    let server = Arc::new(HttpServer::new(app_state));
    let mut server_task = {
        let server = server.clone();
        tokio::spawn(async move { server.start().await })
    };

    info!("Pesto Registration Service is running");

    tokio::select! {
        result = &mut server_task => {
            // Server exited on its own, most likely a bind failure
            match result {
                Ok(Ok(())) => info!("HTTP server exited"),
                Ok(Err(e)) => error!("HTTP server failed: {:#}", e),
                Err(e) => error!("HTTP server task panicked: {}", e),
            }
            std::process::exit(1);
        }
        _ = wait_for_shutdown_signal() => {}
    }

    info!("Shutdown signal received, beginning graceful shutdown...");
    server.stop();

    match tokio::time::timeout(config.shutdown_timeout(), server_task).await {
        Ok(Ok(Ok(()))) => info!("Graceful shutdown completed successfully"),
        Ok(Ok(Err(e))) => error!("HTTP server failed during shutdown: {:#}", e),
        Ok(Err(e)) => error!("HTTP server task panicked: {}", e),
        Err(_) => warn!("Shutdown timeout exceeded, forcing exit"),
    }

    info!("Pesto Registration Service stopped");
    Ok(())
}
