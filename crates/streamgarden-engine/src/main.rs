//! Streamgarden engine binary.
//!
//! Wires the overlay server to the garden driver. It loads configuration,
//! picks the guardian backend, starts the HTTP + `WebSocket` server, and
//! runs the driver until `Ctrl-C`.
//!
//! # Startup Sequence
//!
//! 1. Initialize structured logging (tracing)
//! 2. Load configuration from `streamgarden.yaml` plus environment overrides
//! 3. Connect the guardian store (`PostgreSQL` when `DATABASE_URL` is set,
//!    memory otherwise)
//! 4. Spawn the overlay server
//! 5. Run the garden driver

mod driver;
mod error;

use std::path::Path;
use std::sync::Arc;

use rand::rngs::StdRng;
use streamgarden_core::RngSource;
use streamgarden_core::config::{InfrastructureConfig, OverlayConfig};
use streamgarden_overlay::{AppState, spawn_overlay};
use streamgarden_store::{
    GuardianBackend, MemoryGuardianStore, PgGuardianStore, PostgresConfig, PostgresPool,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::driver::GardenDriver;
use crate::error::EngineError;

const CONFIG_PATH: &str = "streamgarden.yaml";

/// Application entry point.
///
/// # Errors
///
/// Returns an error if configuration, the guardian database, or the
/// overlay server cannot be brought up.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    info!("streamgarden-engine starting");

    // 2. Configuration.
    let config = load_config()?;
    info!(
        host = config.server.host,
        port = config.server.port,
        max_flowers = config.garden.max_flowers,
        tick_interval_ms = config.schedule.tick_interval_ms,
        "Configuration loaded"
    );

    // 3. Guardian store.
    let guardians = connect_guardians(&config.infrastructure).await?;
    info!(backend = guardians.name(), "Guardian store ready");

    // 4. Overlay server.
    let (state, queue) = AppState::new(guardians, &config.chat, config.streamelements.clone());
    let state = Arc::new(state);
    let server = spawn_overlay(config.server.clone().into(), Arc::clone(&state))
        .map_err(EngineError::from)?;

    // 5. Garden driver.
    let driver: GardenDriver<RngSource<StdRng>> =
        GardenDriver::new(Arc::clone(&state), &config, RngSource::from_entropy);

    tokio::select! {
        () = driver.run(queue) => {}
        signal = tokio::signal::ctrl_c() => {
            signal.map_err(EngineError::from)?;
            info!("shutdown requested");
        }
    }

    server.abort();
    info!("streamgarden-engine stopped");
    Ok(())
}

/// Load `streamgarden.yaml` if present, otherwise defaults. Environment
/// overrides apply either way.
fn load_config() -> Result<OverlayConfig, EngineError> {
    let path = Path::new(CONFIG_PATH);
    if path.exists() {
        return Ok(OverlayConfig::from_file(path)?);
    }
    info!("Config file not found, using defaults");
    let mut config = OverlayConfig::default();
    config.apply_overrides(|name| std::env::var(name).ok())?;
    Ok(config)
}

/// `PostgreSQL` when a database URL is configured, memory otherwise.
async fn connect_guardians(
    infrastructure: &InfrastructureConfig,
) -> Result<GuardianBackend, EngineError> {
    let Some(url) = infrastructure.database_url.as_deref() else {
        warn!("DATABASE_URL not set, guardians will not survive a restart");
        return Ok(MemoryGuardianStore::new().into());
    };

    let pool = PostgresPool::connect(&PostgresConfig::new(url)).await?;
    pool.run_migrations().await?;
    Ok(PgGuardianStore::new(pool.pool().clone()).into())
}
