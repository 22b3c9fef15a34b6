//! Student API server entry point.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tokio::net::TcpListener;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use student_api::api::{create_router, AppState};
use student_api::config::Config;
use student_api::error::AppError;
use student_api::metrics;
use student_api::store::Store;
use student_api::utils::shutdown_signal;

/// HTTP API for student records stored in a JSON file.
#[derive(Parser, Debug)]
#[command(name = "student-api")]
#[command(about = "Create and list student records over HTTP")]
#[command(version)]
struct Args {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Option<Command>,

    /// HTTP listen port (overrides PORT).
    #[arg(short, long)]
    port: Option<u16>,

    /// Directory holding the students file (overrides DATA_DIR).
    #[arg(long)]
    data_dir: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP server (default).
    Serve,

    /// Check configuration validity and print the effective settings.
    CheckConfig,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse CLI arguments
    let args = Args::parse();

    // Load configuration
    let mut config = Config::load().map_err(AppError::from)?;
    if let Some(port) = args.port {
        config.port = port;
    }
    if let Some(dir) = args.data_dir.clone() {
        config.data_dir = dir;
    }

    // Initialize logging
    let filter = if args.verbose {
        EnvFilter::new("student_api=debug,tower_http=debug,info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.rust_log))
    };

    if args.json_logs || config.json_logs() {
        tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(fmt::layer())
            .with(filter)
            .init();
    }

    // Validate configuration
    if let Err(e) = config.validate() {
        error!("Invalid configuration: {}", e);
        return Err(AppError::InvalidConfig(e).into());
    }

    match args.command {
        Some(Command::CheckConfig) => cmd_check_config(&config),
        Some(Command::Serve) | None => cmd_serve(config).await,
    }
}

/// Print the effective configuration.
fn cmd_check_config(config: &Config) -> anyhow::Result<()> {
    println!("======================================================================");
    println!("STUDENT API - CONFIGURATION CHECK");
    println!("======================================================================");
    println!("  Listen Address: {}", config.listen_addr());
    println!("  Students File:  {}", config.students_path().display());
    println!("  Log Level:      {}", config.rust_log);
    println!("  Log Format:     {}", config.log_format);
    println!("======================================================================");
    println!("CONFIGURATION CHECK PASSED");
    println!("======================================================================");

    Ok(())
}

/// Run the HTTP server until shutdown.
async fn cmd_serve(config: Config) -> anyhow::Result<()> {
    let store = Store::new(config.students_path());
    store.ensure().await.map_err(AppError::from)?;
    info!("Student store at {}", store.path().display());

    let mut app_state = AppState::new(store);
    match metrics::init_metrics() {
        Ok(handle) => app_state = app_state.with_metrics(handle),
        Err(e) => warn!("Metrics disabled: {}", e),
    }

    let addr = config.listen_addr();
    let listener = TcpListener::bind(addr).await.map_err(AppError::from)?;
    info!("Student API listening on port {}", config.port);

    let router = create_router(app_state);
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(AppError::from)?;

    info!("Server stopped");
    Ok(())
}
