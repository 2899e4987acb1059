use clap::Parser;
use std::path::PathBuf;

use user_service::config::loader;
use user_service::lifecycle::{self, signals, Shutdown};
use user_service::observability::{logging, metrics};

#[derive(Parser)]
#[command(name = "user-service", version)]
#[command(about = "User CRUD service with a supervised database connection", long_about = None)]
struct Cli {
    /// Path to a TOML config file. Defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = loader::load(cli.config.as_deref())?;

    logging::init_logging(&config.observability);
    tracing::info!("user-service v{} starting", env!("CARGO_PKG_VERSION"));

    tracing::info!(
        bind_address = %config.listener.bind_address,
        database = %config.database.url,
        check = %config.health_check.name,
        interval = ?config.health_check.interval(),
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        if let Ok(addr) = config.observability.metrics_address.parse() {
            metrics::init_metrics(addr);
        } else {
            tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            );
        }
    }

    let shutdown = Shutdown::new();
    tokio::spawn(signals::trigger_on_signal(shutdown.clone()));

    let app = lifecycle::start(config, &shutdown).await?;
    app.wait().await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
