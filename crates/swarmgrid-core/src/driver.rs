//! Cadence control for interactive runs.
//!
//! The [`TickDriver`] owns the shared [`Simulation`] and at most one timer
//! task. The timer is a `tokio` task ticking a `tokio::time::interval`; the
//! driver keeps its `JoinHandle` and aborts it to cancel, so changing speed
//! always removes the old timer before installing the new one.
//!
//! Every tick, timed or manual, runs synchronously under the simulation's
//! write lock. Readers holding the read lock therefore only ever observe
//! state between completed ticks.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{error, info};
use uuid::Uuid;

use crate::config::{SettingsError, SettingsUpdate, validate_speed};
use crate::runner::TickCallback;
use crate::simulation::{SettingsChange, Simulation};
use crate::tick::{TickError, TickSummary};

/// Tick period at speed multiplier 1.
pub const BASE_TICK_PERIOD_MS: u64 = 1000;

/// Longest timer period, reached by very small multipliers.
pub const MAX_TICK_PERIOD_MS: u64 = 86_400_000;

/// Errors returned by driver operations.
#[derive(Debug, thiserror::Error)]
pub enum DriverError {
    /// A tick, reset or settings change failed.
    #[error("tick error: {source}")]
    Tick {
        /// The underlying tick error.
        #[from]
        source: TickError,
    },

    /// A control value was rejected.
    #[error("settings error: {source}")]
    Settings {
        /// The underlying validation error.
        #[from]
        source: SettingsError,
    },
}

/// Snapshot of the driver for status endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriverStatus {
    /// Whether the timer is installed.
    pub running: bool,
    /// Current speed multiplier.
    pub speed: f64,
    /// Timer period in milliseconds.
    pub period_ms: u64,
    /// Last completed tick.
    pub tick: u64,
    /// Current run.
    pub run_id: Uuid,
    /// When the current run was initialized.
    pub started_at: DateTime<Utc>,
}

type SharedCallback = Arc<Mutex<Box<dyn TickCallback>>>;

#[derive(Debug)]
struct Timer {
    handle: Option<JoinHandle<()>>,
    speed: f64,
}

impl Timer {
    fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    fn cancel(&mut self) -> bool {
        self.handle.take().is_some_and(|handle| {
            let was_running = !handle.is_finished();
            handle.abort();
            was_running
        })
    }
}

/// Runs ticks manually or on a cancellable timer.
pub struct TickDriver {
    simulation: Arc<RwLock<Simulation>>,
    callback: SharedCallback,
    timer: Mutex<Timer>,
}

impl std::fmt::Debug for TickDriver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TickDriver").finish_non_exhaustive()
    }
}

impl TickDriver {
    /// Wrap `simulation`, notifying `callback` after every tick.
    ///
    /// # Errors
    ///
    /// Returns [`DriverError::Settings`] if `speed` is not positive and
    /// finite.
    pub fn new(
        simulation: Simulation,
        speed: f64,
        callback: Box<dyn TickCallback>,
    ) -> Result<Self, DriverError> {
        validate_speed(speed)?;
        Ok(Self {
            simulation: Arc::new(RwLock::new(simulation)),
            callback: Arc::new(Mutex::new(callback)),
            timer: Mutex::new(Timer {
                handle: None,
                speed,
            }),
        })
    }

    /// Shared handle for read access to the simulation.
    pub const fn simulation(&self) -> &Arc<RwLock<Simulation>> {
        &self.simulation
    }

    // -----------------------------------------------------------------------
    // Cadence
    // -----------------------------------------------------------------------

    /// Install the timer. Returns `false` if it was already running.
    pub async fn start(&self) -> bool {
        let mut timer = self.timer.lock().await;
        if timer.is_running() {
            return false;
        }
        timer.handle = Some(self.spawn_timer(timer.speed));
        info!(speed = timer.speed, "Simulation started");
        true
    }

    /// Cancel the timer. Returns `false` if it was not running.
    pub async fn pause(&self) -> bool {
        let stopped = self.timer.lock().await.cancel();
        if stopped {
            info!("Simulation paused");
        }
        stopped
    }

    /// Change the speed multiplier, replacing a running timer.
    ///
    /// # Errors
    ///
    /// Returns [`DriverError::Settings`] if `multiplier` is not positive and
    /// finite. The current speed is kept.
    pub async fn set_speed(&self, multiplier: f64) -> Result<(), DriverError> {
        validate_speed(multiplier)?;
        let mut timer = self.timer.lock().await;
        timer.speed = multiplier;
        if timer.cancel() {
            timer.handle = Some(self.spawn_timer(multiplier));
        }
        info!(speed = multiplier, period_ms = period_ms(multiplier), "Speed changed");
        Ok(())
    }

    /// Whether the timer is installed.
    pub async fn is_running(&self) -> bool {
        self.timer.lock().await.is_running()
    }

    // -----------------------------------------------------------------------
    // Simulation control
    // -----------------------------------------------------------------------

    /// Run exactly one tick now.
    ///
    /// # Errors
    ///
    /// Returns [`DriverError::Tick`] if the tick fails.
    pub async fn step_once(&self) -> Result<TickSummary, DriverError> {
        Ok(execute_tick(&self.simulation, &self.callback).await?)
    }

    /// Stop the timer and re-initialize the simulation.
    ///
    /// # Errors
    ///
    /// Returns [`DriverError::Tick`] if initialization fails.
    pub async fn reset(&self) -> Result<(), DriverError> {
        self.timer.lock().await.cancel();
        self.simulation.write().await.reset()?;
        Ok(())
    }

    /// Apply a partial settings update.
    ///
    /// # Errors
    ///
    /// Returns [`DriverError::Tick`] wrapping the validation failure.
    pub async fn update_settings(
        &self,
        update: &SettingsUpdate,
    ) -> Result<SettingsChange, DriverError> {
        Ok(self.simulation.write().await.update_settings(update)?)
    }

    /// Current driver status.
    pub async fn status(&self) -> DriverStatus {
        let (running, speed) = {
            let timer = self.timer.lock().await;
            (timer.is_running(), timer.speed)
        };
        let simulation = self.simulation.read().await;
        DriverStatus {
            running,
            speed,
            period_ms: period_ms(speed),
            tick: simulation.current_tick(),
            run_id: simulation.run_id(),
            started_at: simulation.started_at(),
        }
    }

    fn spawn_timer(&self, speed: f64) -> JoinHandle<()> {
        let simulation = Arc::clone(&self.simulation);
        let callback = Arc::clone(&self.callback);
        let period = Duration::from_millis(period_ms(speed));

        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick completes immediately.
            interval.tick().await;
            loop {
                interval.tick().await;
                if let Err(err) = execute_tick(&simulation, &callback).await {
                    error!(%err, "Timed tick failed, stopping timer");
                    break;
                }
            }
        })
    }
}

impl Drop for TickDriver {
    fn drop(&mut self) {
        self.timer.get_mut().cancel();
    }
}

async fn execute_tick(
    simulation: &RwLock<Simulation>,
    callback: &Mutex<Box<dyn TickCallback>>,
) -> Result<TickSummary, TickError> {
    let mut simulation = simulation.write().await;
    let summary = simulation.tick()?;
    callback.lock().await.on_tick(&summary, &simulation);
    Ok(summary)
}

/// Timer period for `multiplier` in whole milliseconds: `1000 / multiplier`
/// rounded, clamped to `1..=MAX_TICK_PERIOD_MS`.
///
/// Invalid multipliers map to the base period.
// The value is a clamped whole number, so the cast is exact.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn period_ms(multiplier: f64) -> u64 {
    if validate_speed(multiplier).is_err() {
        return BASE_TICK_PERIOD_MS;
    }
    (1000.0 / multiplier).round().clamp(1.0, 86_400_000.0) as u64
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use crate::config::SimulationSettings;
    use crate::runner::NoOpCallback;

    fn driver(speed: f64) -> TickDriver {
        let settings = SimulationSettings {
            grid_width: 5,
            grid_height: 5,
            initial_agent_count: 10,
            ..SimulationSettings::default()
        };
        let simulation = Simulation::new(settings, 31).unwrap();
        TickDriver::new(simulation, speed, Box::new(NoOpCallback)).unwrap()
    }

    async fn tick_of(driver: &TickDriver) -> u64 {
        driver.simulation().read().await.current_tick()
    }

    #[test]
    fn period_scales_with_speed() {
        assert_eq!(period_ms(1.0), 1000);
        assert_eq!(period_ms(4.0), 250);
        assert_eq!(period_ms(3.0), 333);
        assert_eq!(period_ms(0.5), 2000);
        assert_eq!(period_ms(5000.0), 1);
        assert_eq!(period_ms(1e-9), MAX_TICK_PERIOD_MS);
    }

    #[tokio::test]
    async fn non_positive_speed_rejected() {
        let d = driver(1.0);
        for bad in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            assert!(matches!(
                d.set_speed(bad).await,
                Err(DriverError::Settings {
                    source: SettingsError::InvalidSpeed { .. }
                })
            ));
        }
        assert_eq!(d.status().await.speed, 1.0);
    }

    #[tokio::test(start_paused = true)]
    async fn half_speed_ticks_every_two_seconds() {
        let d = driver(0.5);
        assert_eq!(d.status().await.period_ms, 2000);
        d.start().await;

        tokio::time::sleep(Duration::from_millis(1_900)).await;
        assert_eq!(tick_of(&d).await, 0);
        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(tick_of(&d).await, 1);
        tokio::time::sleep(Duration::from_millis(2_000)).await;
        assert_eq!(tick_of(&d).await, 2);
        d.pause().await;
    }

    #[tokio::test]
    async fn step_once_advances_one_tick() {
        let d = driver(1.0);
        let summary = d.step_once().await.unwrap();
        assert_eq!(summary.tick, 1);
        assert_eq!(tick_of(&d).await, 1);
        assert!(!d.is_running().await);
    }

    #[tokio::test(start_paused = true)]
    async fn timer_ticks_at_period() {
        let d = driver(2.0);
        assert!(d.start().await);

        tokio::time::sleep(Duration::from_millis(1_250)).await;
        assert_eq!(tick_of(&d).await, 2);

        assert!(d.pause().await);
        tokio::time::sleep(Duration::from_millis(5_000)).await;
        assert_eq!(tick_of(&d).await, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn start_and_pause_are_idempotent() {
        let d = driver(1.0);
        assert!(!d.pause().await);
        assert!(d.start().await);
        assert!(!d.start().await);

        tokio::time::sleep(Duration::from_millis(3_500)).await;
        // A second timer would have doubled this.
        assert_eq!(tick_of(&d).await, 3);

        assert!(d.pause().await);
        assert!(!d.pause().await);
    }

    #[tokio::test(start_paused = true)]
    async fn speed_change_replaces_timer() {
        let d = driver(1.0);
        d.start().await;
        tokio::time::sleep(Duration::from_millis(1_500)).await;
        assert_eq!(tick_of(&d).await, 1);

        d.set_speed(10.0).await.unwrap();
        tokio::time::sleep(Duration::from_millis(1_050)).await;
        assert_eq!(tick_of(&d).await, 11);

        let status = d.status().await;
        assert!(status.running);
        assert_eq!(status.period_ms, 100);
    }

    #[tokio::test]
    async fn speed_change_while_paused_does_not_start() {
        let d = driver(1.0);
        d.set_speed(4.0).await.unwrap();
        assert!(!d.is_running().await);
        assert_eq!(d.status().await.speed, 4.0);
    }

    #[tokio::test(start_paused = true)]
    async fn reset_stops_timer_and_reinitializes() {
        let d = driver(5.0);
        d.start().await;
        tokio::time::sleep(Duration::from_millis(1_100)).await;
        let old_run = d.status().await.run_id;

        d.reset().await.unwrap();

        let status = d.status().await;
        assert!(!status.running);
        assert_eq!(status.tick, 0);
        assert_ne!(status.run_id, old_run);
    }
}
