//! hostmetrics reporting CLI

use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use hostmetrics::config::CONFIG_ENV;
use hostmetrics::{report, HostMetrics, LocatorConfig};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the native library, bypassing the locator
    #[arg(long)]
    library: Option<PathBuf>,

    /// Locator configuration file (JSON)
    #[arg(long)]
    config: Option<PathBuf>,

    /// CPU sampling interval in milliseconds
    #[arg(long, default_value = "500")]
    interval_ms: u64,

    /// Print the snapshot as JSON
    #[arg(long)]
    json: bool,
}

/// Completes on Ctrl-C. Stays pending if the handler cannot be installed.
async fn ctrl_c() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Cannot listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "hostmetrics=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let metrics = match cli.library {
        Some(path) => HostMetrics::open(path)?,
        None => {
            let config = match cli
                .config
                .or_else(|| std::env::var_os(CONFIG_ENV).map(PathBuf::from))
            {
                Some(path) => {
                    tracing::info!("Loading configuration from {}", path.display());
                    LocatorConfig::from_file(path)?
                }
                None => LocatorConfig::default(),
            };
            HostMetrics::locate(&config)?
        }
    };

    let info = metrics
        .snapshot(Duration::from_millis(cli.interval_ms), ctrl_c())
        .await?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&info)?);
    } else {
        print!("{}", report::render(&info));
    }

    metrics.close();
    Ok(())
}
