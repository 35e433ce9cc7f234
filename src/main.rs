//! Expiring Map console
//!
//! Reads cache commands from stdin and writes replies to stdout. Logs go to
//! stderr so replies stay machine-readable.

use anyhow::Context;
use tokio::io::BufReader;
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use expiring_map::{console, Config, SharedCache};

/// Main entry point for the console.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Create the shared cache (fails on a non-positive capacity)
/// 4. Serve commands from stdin until EOF, `QUIT` or Ctrl+C
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "expiring_map=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    info!("Starting expiring map console");

    let config = Config::from_env();
    info!(
        "Configuration loaded: capacity={}, default_ttl={}ms",
        config.capacity, config.default_ttl_ms
    );

    let cache = SharedCache::<String, String>::from_config(&config)
        .context("failed to create cache")?;

    let stdin = BufReader::new(tokio::io::stdin());
    let stdout = tokio::io::stdout();

    tokio::select! {
        result = console::run(stdin, stdout, cache, config.default_ttl()) => {
            result.context("console I/O failed")?;
        }
        _ = signal::ctrl_c() => {
            info!("Received Ctrl+C, shutting down");
        }
    }

    info!("Shutdown complete");
    Ok(())
}
