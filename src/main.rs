use anyhow::Result;
use clap::Parser;
use fedi_exporter::{config::Config, server};
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/Default.toml")]
    config: String,

    /// Instance base URL (overrides config)
    #[arg(long, env = "API_BASE_URL")]
    api_base_url: Option<String>,

    /// API bearer token (overrides config)
    #[arg(long, env = "API_TOKEN", hide_env_values = true)]
    api_token: Option<String>,

    /// Port to listen on for metrics (overrides config)
    #[arg(short, long, env = "PORT")]
    port: Option<u16>,

    /// Address to bind to (overrides config)
    #[arg(short, long, env = "EXPORTER_ADDR")]
    addr: Option<String>,

    /// Collection interval in milliseconds (overrides config)
    #[arg(long, env = "SCRAPE_INTERVAL")]
    scrape_interval: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        "Starting Misskey-family Prometheus Exporter v{}",
        env!("CARGO_PKG_VERSION")
    );

    // .env must be loaded before clap reads the flat variable names
    if let Ok(path) = dotenvy::dotenv() {
        info!("Loaded environment from {}", path.display());
    }

    // Parse CLI arguments
    let args = Args::parse();

    // Load configuration
    let mut config = Config::load(&args.config)?;

    // Override with CLI arguments if provided
    if let Some(base_url) = args.api_base_url {
        config.api.base_url = base_url;
    }
    if let Some(token) = args.api_token.filter(|t| !t.trim().is_empty()) {
        config.api.token = Some(secrecy::SecretString::new(token.into()));
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(addr) = args.addr {
        config.server.addr = addr;
    }
    if let Some(interval) = args.scrape_interval {
        config.metrics.scrape_interval_ms = interval;
    }
    config.validate()?;

    if !config.has_token() {
        warn!("API_TOKEN is not set. Admin endpoints will be reported as unavailable.");
    }

    info!("Configuration loaded successfully");
    info!("Instance API: {}", config.api.base_url);
    info!(
        "Collection interval: {}ms",
        config.metrics.scrape_interval_ms
    );
    info!(
        "Metrics endpoint: http://{}:{}/metrics",
        config.server.addr, config.server.port
    );

    // Start the metrics server
    if let Err(e) = server::start(config).await {
        error!("Server error: {}", e);
        std::process::exit(1);
    }

    Ok(())
}
