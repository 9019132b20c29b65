pub mod api;
pub mod cli;
pub mod config;
pub mod constants;
pub mod db;
pub mod entities;
pub mod services;
pub mod state;

use anyhow::Context;
use clap::Parser;
pub use config::Config;
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

pub async fn run() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();

    if matches!(cli.command, Some(cli::Commands::Init)) {
        Config::create_default_if_missing()?;
        println!("✓ Config file created. Edit config.toml and run again.");
        return Ok(());
    }

    let config = Config::load()?;
    config.validate()?;

    let prometheus_handle = if config.observability.metrics_enabled {
        use metrics_exporter_prometheus::PrometheusBuilder;
        let builder = PrometheusBuilder::new();
        let handle = builder
            .install_recorder()
            .context("Failed to install Prometheus recorder")?;
        info!("Prometheus metrics recorder initialized");
        Some(handle)
    } else {
        None
    };

    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.general.log_level));

    let fmt_layer = tracing_subscriber::fmt::layer();

    let registry = tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer);

    if config.observability.loki_enabled {
        let url = url::Url::parse(&config.observability.loki_url).context("Invalid Loki URL")?;

        let (layer, task) = tracing_loki::builder()
            .label("app", "finch")?
            .extra_field("env", "production")?
            .build_url(url)?;

        tokio::spawn(task);

        registry.with(layer).init();
        info!(
            "Loki logging initialized at {}",
            config.observability.loki_url
        );
    } else {
        registry.init();
    }

    serve(config, prometheus_handle).await
}

async fn serve(
    config: Config,
    prometheus_handle: Option<metrics_exporter_prometheus::PrometheusHandle>,
) -> anyhow::Result<()> {
    info!("Finch v{} starting...", env!("CARGO_PKG_VERSION"));

    let port = config.server.port;
    let state = api::create_app_state_from_config(config, prometheus_handle).await?;
    let app = api::router(state).await;

    let addr = format!("0.0.0.0:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    let server_handle = tokio::spawn(async move {
        info!("🌐 Web Server running at http://0.0.0.0:{}", port);
        if let Err(e) = axum::serve(listener, app).await {
            error!("Web server error: {}", e);
        }
    });

    info!("Server running. Press Ctrl+C to stop.");

    match signal::ctrl_c().await {
        Ok(()) => {
            info!("Shutdown signal received");
        }
        Err(e) => {
            error!("Error listening for shutdown: {}", e);
        }
    }

    server_handle.abort();
    info!("Server stopped");

    Ok(())
}
