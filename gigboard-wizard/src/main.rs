//! gigboard-wizard - listing publication service
//!
//! Hosts the three-step listing wizard over HTTP on port 5731 with an SSE
//! event stream at `/events`.

use anyhow::Result;
use clap::Parser;
use gigboard_common::config::{
    default_config_path, load_toml_config, LoggingConfig, RootFolderInitializer,
    RootFolderResolver,
};
use gigboard_common::db::init_database;
use gigboard_common::events::EventBus;
use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing::info;
use tracing_subscriber::EnvFilter;

use gigboard_wizard::{build_router, AppState};

#[derive(Debug, Parser)]
#[command(name = "gigboard-wizard", version, about = "Gigboard listing wizard service")]
struct Args {
    /// Root folder holding the database and uploaded media
    #[arg(long, value_name = "PATH")]
    root_folder: Option<PathBuf>,

    /// TOML config file
    #[arg(long, value_name = "FILE", env = "GIGBOARD_CONFIG")]
    config: Option<PathBuf>,

    /// HTTP port (overrides the config file)
    #[arg(long)]
    port: Option<u16>,
}

fn init_tracing(logging: &LoggingConfig) -> Result<()> {
    // RUST_LOG wins over the configured level
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&logging.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    match &logging.file {
        Some(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .init();
        }
        None => {
            tracing_subscriber::fmt().with_env_filter(filter).init();
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config_path = args.config.clone().unwrap_or_else(default_config_path);
    let config = load_toml_config(&config_path)?;

    init_tracing(&config.logging)?;

    info!(
        "Starting Gigboard listing wizard (gigboard-wizard) v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );
    info!("Config file: {}", config_path.display());

    let root_folder = RootFolderResolver::new()
        .with_cli_arg(args.root_folder)
        .with_toml(&config)
        .resolve();

    let initializer = RootFolderInitializer::new(root_folder);
    initializer
        .ensure_directory_exists()
        .map_err(|e| anyhow::anyhow!("Failed to initialize root folder: {}", e))?;

    let db_path = initializer.database_path();
    info!("Database: {}", db_path.display());
    let db_pool = init_database(&db_path).await?;
    info!("Database connection established");

    let event_bus = EventBus::new(100);

    let state = AppState::from_config(db_pool, &config, initializer.media_path(), event_bus).await?;
    let app = build_router(state);

    let port = args.port.unwrap_or(config.port);
    let addr = format!("127.0.0.1:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
