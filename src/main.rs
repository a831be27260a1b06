//! Counter API entry point.

use std::net::SocketAddr;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use counter_api::api::{cors_layer, create_router, AppState};
use counter_api::config::{Config, LogFormat, StoreBackend};
use counter_api::counter::CounterService;
use counter_api::error::AppError;
use counter_api::metrics;
use counter_api::store::{CounterStore, DynamoStore, MemoryStore};
use counter_api::utils::shutdown_signal;

/// HTTP counter API backed by DynamoDB.
#[derive(Parser, Debug)]
#[command(name = "counter-api")]
#[command(about = "Health check and atomic counter API backed by DynamoDB")]
#[command(version)]
struct Args {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the HTTP API (default).
    Serve {
        /// HTTP server port (overrides PORT).
        #[arg(short, long)]
        port: Option<u16>,

        /// Keep the counter in process memory instead of DynamoDB.
        #[arg(long)]
        memory: bool,
    },

    /// Create the counter table and seed the zero row.
    SetupDb,

    /// Check configuration validity.
    CheckConfig,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse CLI arguments
    let args = Args::parse();

    // Configuration drives the log format, so load it before logging starts
    let config = Config::load();
    let json_logs = matches!(&config, Ok(c) if c.log_format == LogFormat::Json);

    // Initialize logging
    let filter = if args.verbose {
        EnvFilter::new("counter_api=debug,info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(json_logs.then(|| fmt::layer().json()))
        .with((!json_logs).then(fmt::layer))
        .with(filter)
        .init();

    let config = config.map_err(|e| {
        error!("Failed to load configuration: {}", e);
        e
    })?;

    match args.command {
        Some(Command::CheckConfig) => cmd_check_config(&config),
        Some(Command::SetupDb) => cmd_setup_db(config).await,
        Some(Command::Serve { port, memory }) => cmd_serve(config, port, memory).await,
        None => cmd_serve(config, None, false).await,
    }
}

/// Check configuration validity.
fn cmd_check_config(config: &Config) -> anyhow::Result<()> {
    println!("======================================================================");
    println!("COUNTER API - CONFIGURATION CHECK");
    println!("======================================================================");

    print!("Validating configuration... ");
    match config.validate() {
        Ok(()) => println!("OK"),
        Err(e) => {
            println!("FAILED");
            println!("  Error: {}", e);
            return Err(anyhow::anyhow!("Configuration validation failed"));
        }
    }

    println!("----------------------------------------------------------------------");
    println!("Configuration Summary:");
    println!("  Port: {}", config.port);
    println!("  Store Backend: {}", config.store_backend);
    println!("  Table: {}", config.table_name);
    println!("  Region: {}", config.aws_region);
    println!("  Endpoint: {}", config.endpoint().unwrap_or("AWS default"));
    println!(
        "  Credentials: {}",
        if config.static_credentials().is_some() {
            "static"
        } else {
            "default provider chain"
        }
    );
    println!("  CORS Origins: {}", config.cors_origins);
    println!("  Log Format: {}", config.log_format);
    println!("======================================================================");
    println!("CONFIGURATION CHECK PASSED");
    println!("======================================================================");

    Ok(())
}

/// Create the table and seed the counter row.
async fn cmd_setup_db(config: Config) -> anyhow::Result<()> {
    config.validate().map_err(AppError::InvalidConfig)?;

    if config.store_backend == StoreBackend::Memory {
        info!("Memory backend has no table to create");
        return Ok(());
    }

    let store = DynamoStore::from_config(&config).await;
    let counter = CounterService::new(Arc::new(store))
        .setup()
        .await
        .map_err(AppError::from)?;

    info!(
        table = %config.table_name,
        count = counter.count,
        updated_at = %counter.updated_at,
        "Table ready"
    );

    Ok(())
}

/// Serve the HTTP API until shutdown.
async fn cmd_serve(mut config: Config, port: Option<u16>, memory: bool) -> anyhow::Result<()> {
    // Override with CLI args if provided
    if let Some(port) = port {
        config.port = port;
    }
    if memory {
        config.store_backend = StoreBackend::Memory;
    }

    if let Err(e) = config.validate() {
        error!("Invalid configuration: {}", e);
        return Err(anyhow::anyhow!("Configuration validation failed: {}", e));
    }

    let store: Arc<dyn CounterStore> = match config.store_backend {
        StoreBackend::Dynamodb => Arc::new(DynamoStore::from_config(&config).await),
        StoreBackend::Memory => Arc::new(MemoryStore::new()),
    };
    info!("Store backend: {}", store.name());

    let state = AppState::new(CounterService::new(store)).with_metrics(metrics::init_metrics());
    let cors = cors_layer(config.cors_origin_list().map_err(|e| anyhow::anyhow!(e))?);
    let router = create_router(state, cors);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = TcpListener::bind(addr).await.map_err(AppError::from)?;
    info!("HTTP server listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}
