//! Engine binary for the `SwarmGrid` simulation.
//!
//! Loads configuration, initializes logging, builds the initial world and
//! then either steps it a fixed number of ticks headless or serves it
//! through the Observer API, where clients start, pause, step and reset
//! the run.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `swarmgrid-config.yaml` (or `SWARMGRID_CONFIG`)
//! 2. Initialize structured logging (tracing)
//! 3. Initialize the simulation from the configured settings and seed
//! 4. If `world.max_ticks > 0`, run headless and log the result
//! 5. Otherwise wrap the simulation in a tick driver and serve the
//!    Observer API until Ctrl-C or `SIGTERM`, which also stops the timer

mod error;
mod observer_callback;

use std::sync::Arc;

use swarmgrid_core::config::{LogFormat, LoggingConfig, SimulationConfig, config_path};
use swarmgrid_core::driver::TickDriver;
use swarmgrid_core::runner::{self, NoOpCallback};
use swarmgrid_core::simulation::Simulation;
use swarmgrid_observer::{AppState, ServerConfig, broadcast_channel};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::error::EngineError;
use crate::observer_callback::ObserverCallback;

/// Application entry point for the engine.
///
/// # Errors
///
/// Returns an error if any initialization step or the simulation itself fails.
#[tokio::main]
async fn main() -> Result<(), EngineError> {
    // 1. Load configuration.
    let config = SimulationConfig::load()?;

    // 2. Initialize structured logging.
    init_logging(&config.logging);
    info!(
        config_path = %config_path().display(),
        world_name = config.world.name,
        seed = config.world.seed,
        speed = config.world.speed,
        max_ticks = config.world.max_ticks,
        "Configuration loaded"
    );

    // 3. Initialize the simulation.
    let mut simulation = Simulation::new(config.settings.clone(), config.world.seed)?;

    // 4. Headless run.
    if config.world.max_ticks > 0 {
        let result = runner::run_headless(&mut simulation, config.world.max_ticks, &mut NoOpCallback)?;
        runner::log_run_end(&result);
        info!("swarmgrid-engine shutdown complete");
        return Ok(());
    }

    // 5. Interactive run behind the Observer API.
    let tx = broadcast_channel();
    let callback = ObserverCallback::new(tx.clone());
    let driver = Arc::new(TickDriver::new(
        simulation,
        config.world.speed,
        Box::new(callback),
    )?);

    if config.world.autostart {
        driver.start().await;
    }

    let app_state = Arc::new(AppState::new(driver, tx));
    let server_config = ServerConfig::from(&config.observer);
    swarmgrid_observer::start_server(&server_config, app_state).await?;

    info!("swarmgrid-engine shutdown complete");
    Ok(())
}

/// Install the global tracing subscriber.
///
/// `RUST_LOG` takes precedence over the configured level.
fn init_logging(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&logging.level));

    match logging.format {
        LogFormat::Pretty => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .init(),
        LogFormat::Json => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .json()
            .init(),
    }
}
