use anyhow::Result;
use clap::Parser;
use logrow_exporter::{app::App, cli::Cli, config::Config};
use tokio::sync::watch;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match Config::load(&cli) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("failed to load configuration: {err}");
            std::process::exit(1);
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.log_level)),
        )
        .init();

    info!("logrow-exporter starting up");
    info!("-------------------- Configuration --------------------");
    info!("Log Level: {}", config.log_level);
    info!("Listen Address: {}", config.metrics.listen_address);
    info!("Metrics Enabled: {}", config.metrics.enabled);
    info!(
        "System Metrics Enabled: {}",
        config.metrics.system_metrics_enabled
    );
    info!("Command Path: {}", config.collector.command_path.display());
    info!("Interval: {}s", config.collector.interval_seconds);
    match config.collector.eviction_ttl_seconds {
        Some(ttl) => info!("Key Eviction TTL: {}s", ttl),
        None => info!("Key Eviction: disabled"),
    }
    info!("-------------------------------------------------------");

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let app = App::builder(config).build(shutdown_rx).await?;

    tokio::spawn(async move {
        if let Err(err) = tokio::signal::ctrl_c().await {
            error!("failed to listen for shutdown signal: {err}");
            return;
        }
        info!("shutdown signal received");
        let _ = shutdown_tx.send(true);
    });

    app.run().await
}
