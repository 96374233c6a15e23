//! Main entry point for the lobby broker service
//!
//! This is the production entry point that loads configuration, starts
//! the TCP listener, and runs until a shutdown signal arrives.

use anyhow::Result;
use clap::Parser;
use lobby_broker::config::{AppConfig, DEFAULT_CONFIG_PATH};
use lobby_broker::service::AppState;
use std::path::PathBuf;
use tokio::signal;
use tracing::{error, info};

/// Lobby Broker - matchmaking front door for multiplayer game sessions
#[derive(Parser)]
#[command(
    name = "lobby-broker",
    version,
    about = "A TCP lobby broker that spawns dedicated game-server instances on demand",
    long_about = "Lobby Broker accepts persistent TCP sessions over which clients create or \
                 join named lobbies. Each created lobby gets its own game-server process, \
                 spawned from the configured build, and clients receive the endpoint to dial."
)]
struct Args {
    /// Configuration file path
    #[arg(
        short,
        long,
        value_name = "FILE",
        help = "Path to configuration file (JSON format)"
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

    /// Listen port override
    #[arg(long, value_name = "PORT", help = "Override broker listen port")]
    listen_port: Option<u16>,

    /// Game server build path override
    #[arg(
        long,
        value_name = "PATH",
        help = "Override path to the game server build"
    )]
    build_path: Option<PathBuf>,

    /// Game server base port override
    #[arg(
        long,
        value_name = "PORT",
        help = "Override first port assigned to spawned game servers"
    )]
    base_port: Option<u16>,

    /// Write a default configuration file and exit
    #[arg(
        long,
        help = "Write a default config file (to --config or the default path) and exit"
    )]
    init_config: bool,

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
            info!("Received SIGINT (Ctrl+C) signal");
        },
        _ = terminate => {
            info!("Received SIGTERM signal");
        },
    }
}

/// Display startup banner with service information
fn display_startup_banner(config: &AppConfig) {
    info!("Lobby Broker");
    info!("   Service: {}", config.service.name);
    info!("   Log level: {}", config.service.log_level);
    info!(
        "   Listen: {}:{}",
        config.listener.bind_addr, config.listener.port
    );
    info!(
        "   Game server build: {}",
        config.game_server.build_path.display()
    );
    info!("   Game server base port: {}", config.game_server.base_port);
}

/// Load and merge configuration from the persisted file, environment,
/// and CLI arguments
fn load_config(args: &Args) -> Result<AppConfig> {
    let mut config = if let Some(config_path) = &args.config {
        AppConfig::from_file(config_path)?
    } else if PathBuf::from(DEFAULT_CONFIG_PATH).exists() {
        AppConfig::from_file(&PathBuf::from(DEFAULT_CONFIG_PATH))?
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

    if let Some(listen_port) = args.listen_port {
        config.listener.port = listen_port;
    }

    if let Some(build_path) = &args.build_path {
        config.game_server.build_path = build_path.clone();
    }

    if let Some(base_port) = args.base_port {
        config.game_server.base_port = base_port;
    }

    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Handle special modes that must not require an existing config
    if args.init_config {
        let path = args
            .config
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));
        AppConfig::load_or_init(&path)?;
        println!("Configuration ready at {}", path.display());
        return Ok(());
    }

    // Load configuration (CLI args can override file/environment)
    let config = load_config(&args).unwrap_or_else(|e| {
        eprintln!("Configuration error: {}", e);
        std::process::exit(1);
    });

    // Initialize logging early (before any other operations)
    if let Err(e) = init_logging(&config.service.log_level) {
        eprintln!("Failed to initialize logging: {}", e);
        std::process::exit(1);
    }

    display_startup_banner(&config);

    if args.dry_run {
        info!("Configuration validation successful");
        info!("Dry run completed - exiting without starting service");
        return Ok(());
    }

    // Initialize and start the service
    let mut app_state = match AppState::new(config) {
        Ok(state) => state,
        Err(e) => {
            error!("Failed to initialize application: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = app_state.start().await {
        error!("Failed to start service: {}", e);
        std::process::exit(1);
    }

    info!("Lobby broker is running");
    info!("Press Ctrl+C to shutdown gracefully...");

    // Wait for shutdown signal
    wait_for_shutdown_signal().await;

    info!("Shutdown signal received, stopping service...");
    app_state.shutdown().await;

    info!("Lobby broker stopped");
    Ok(())
}
