//! Vantage gateway binary.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context as _;
use clap::Parser;
use figment::Figment;
use figment::providers::{Env, Format, Json, Serialized};
use vantage_capture::UnsupportedProvider;
use vantage_rpc::registry::MethodRegistry;
use vantage_server::shutdown::DEFAULT_SHUTDOWN_TIMEOUT;
use vantage_server::{Config, StaticResolver, VantageServer, telemetry};

/// Remote-session control and notification gateway.
#[derive(Debug, Parser)]
#[command(name = "vantage-server", version)]
struct Cli {
    /// Path to a JSON configuration file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the bind host.
    #[arg(long)]
    host: Option<String>,

    /// Override the bind port.
    #[arg(long)]
    port: Option<u16>,
}

fn load_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut figment = Figment::from(Serialized::defaults(Config::default()));
    if let Some(path) = &cli.config {
        figment = figment.merge(Json::file(path));
    }
    let mut config: Config = figment
        .merge(Env::prefixed("VANTAGE_").split("__"))
        .extract()
        .context("invalid configuration")?;

    if let Some(host) = &cli.host {
        config.server.host.clone_from(host);
    }
    if let Some(port) = cli.port {
        config.server.port = port;
    }
    Ok(config)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = load_config(&cli)?;

    let metrics_handle = telemetry::install_recorder();

    let mut registry = MethodRegistry::new();
    vantage_rpc::handlers::register_all(&mut registry);

    let resolver = Arc::new(StaticResolver::from_entries(&config.auth.tokens));
    // The desktop capability is injected by the embedding host; the plain
    // binary runs without one and reports capture/input as unavailable.
    let provider = Arc::new(UnsupportedProvider);

    let server = VantageServer::new(
        config.server,
        registry,
        provider,
        resolver,
        Some(metrics_handle),
    );
    let (addr, serve_handle) = server.listen().await?;
    tracing::info!(%addr, "vantage server ready");

    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for ctrl-c")?;
    tracing::info!("shutting down");
    server
        .shutdown_coordinator()
        .graceful_shutdown(vec![serve_handle], DEFAULT_SHUTDOWN_TIMEOUT)
        .await;

    Ok(())
}
