//! FUTBOL AI: entry point.
//!
//! Initialises structured logging, loads configuration, wires the
//! providers into the shared API state and serves HTTP until Ctrl+C.

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;

use futbol_ai::config::AppConfig;
use futbol_ai::server::{self, AppContext};

const DEFAULT_CONFIG_PATH: &str = "config.toml";

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (non-fatal if missing)
    let _ = dotenv::dotenv();

    init_logging();

    let config_path = std::env::var("FUTBOL_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    let cfg = AppConfig::load_or_default(&config_path)?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        config = %config_path,
        current_season = %cfg.history.current_season,
        live_season = cfg.live_data.default_season,
        "FUTBOL AI starting up"
    );

    let state = Arc::new(AppContext::from_config(&cfg)?);

    let addr: SocketAddr = format!("{}:{}", cfg.server.host, cfg.server.port)
        .parse()
        .with_context(|| format!("Invalid listen address {}:{}", cfg.server.host, cfg.server.port))?;

    server::serve(state, addr).await?;

    info!("FUTBOL AI shut down cleanly.");
    Ok(())
}

/// Initialise the `tracing` subscriber.
fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("futbol_ai=info,tower_http=info"));

    let json_logging = std::env::var("FUTBOL_LOG_JSON").is_ok();

    if json_logging {
        fmt()
            .json()
            .with_env_filter(env_filter)
            .with_target(true)
            .with_thread_ids(true)
            .init();
    } else {
        fmt()
            .with_env_filter(env_filter)
            .with_target(true)
            .init();
    }
}
