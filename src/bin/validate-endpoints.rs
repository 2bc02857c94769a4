//! Checks every API endpoint the exporter uses against its expected schema and
//! prints a summary. Exits non-zero when any endpoint fails.

use anyhow::Result;
use clap::Parser;
use fedi_exporter::config::Config;
use fedi_exporter::fedi::ApiClient;
use fedi_exporter::validation::{default_checks, detect_variant, validate_all};
use tracing::{error, info};
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
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    dotenvy::dotenv().ok();
    let args = Args::parse();

    let mut config = Config::load(&args.config)?;
    if let Some(base_url) = args.api_base_url {
        config.api.base_url = base_url;
    }
    if let Some(token) = args.api_token.filter(|t| !t.trim().is_empty()) {
        config.api.token = Some(secrecy::SecretString::new(token.into()));
    }

    if !config.has_token() {
        error!("API_TOKEN environment variable is required");
        std::process::exit(1);
    }

    let client = ApiClient::new(&config.api)?;

    let variant = detect_variant(&client).await;
    info!("Detected software variant: {}", variant);

    let summary = validate_all(&client, &default_checks()).await;

    println!("\n=== Test Summary ===");
    println!("Software Variant: {}", variant);
    println!("Total Endpoints: {}", summary.total);
    println!("Successful: {}", summary.successful);
    println!("Failed: {}", summary.failed);

    if summary.failed > 0 {
        println!("\nErrors by Type:");
        for (kind, count) in &summary.errors_by_kind {
            println!("  {}: {}", kind, count);
        }

        if !summary.validation_errors.is_empty() {
            println!("\nValidation Errors:");
            for (endpoint, message) in &summary.validation_errors {
                println!("\n{}:\n  {}", endpoint, message);
            }
        }
        std::process::exit(1);
    }

    Ok(())
}
