use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use catalog_relay::{config::Config, web::WebServer};

#[derive(Parser)]
#[command(name = "catalog-relay")]
#[command(version)]
#[command(about = "Video catalog aggregator with a streaming media relay")]
#[command(long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Listening IP address
    #[arg(short = 'H', long, value_name = "IP")]
    host: Option<String>,

    /// Listening port
    #[arg(short, long, value_name = "PORT")]
    port: Option<u16>,

    /// Directory holding the web UI
    #[arg(short = 's', long, value_name = "DIR")]
    static_dir: Option<PathBuf>,

    /// Log level
    #[arg(short = 'v', long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // DEBUG=true raises the default level when no --log-level was given
    let debug_env = std::env::var("DEBUG").is_ok_and(|v| v.eq_ignore_ascii_case("true"));
    let level = if debug_env && cli.log_level == "info" {
        "debug"
    } else {
        cli.log_level.as_str()
    };
    let log_filter = if level == "trace" {
        format!("catalog_relay={level},tower_http=trace")
    } else {
        format!("catalog_relay={level}")
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Catalog Relay v{}", env!("CARGO_PKG_VERSION"));

    let mut config = Config::load(&cli.config)?;

    // Override config with CLI arguments
    if let Some(host) = cli.host {
        config.web.host = host;
    }
    if let Some(port) = cli.port {
        config.web.port = port;
    }
    if let Some(static_dir) = cli.static_dir {
        config.web.static_dir = static_dir;
    }

    info!(
        "Relay: timeout={:?} max_retries={} sources={}",
        config.relay.timeout,
        config.relay.max_retries,
        config.sources.len()
    );

    let server = WebServer::new(config)?;
    info!("Web server binding to {}:{}", server.host(), server.port());
    server.serve().await
}
