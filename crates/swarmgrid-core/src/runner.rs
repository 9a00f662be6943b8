//! Tick callbacks and the bounded headless runner.
//!
//! [`run_headless`] steps a [`Simulation`] a fixed number of times with no
//! timer, notifying a [`TickCallback`] after each tick. The interactive,
//! timer-driven loop lives in [`driver`](crate::driver) and shares the same
//! callback trait.

use tracing::{info, warn};
use uuid::Uuid;

use crate::simulation::Simulation;
use crate::tick::{TickError, TickSummary};

/// Errors that can occur during a headless run.
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    /// A tick execution failed.
    #[error("tick error: {source}")]
    Tick {
        /// The underlying tick error.
        #[from]
        source: TickError,
    },
}

/// Result of a headless run.
#[derive(Debug, Clone)]
pub struct RunResult {
    /// Run that was stepped.
    pub run_id: Uuid,
    /// Number of ticks executed.
    pub total_ticks: u64,
    /// The last tick summary, if any tick completed.
    pub final_summary: Option<TickSummary>,
}

/// Callback invoked after each tick completes.
///
/// Implementations can use this to broadcast tick summaries to observers.
/// The callback receives the summary and the simulation as of the end of the
/// tick.
pub trait TickCallback: Send {
    /// Called after a tick completes successfully.
    fn on_tick(&mut self, summary: &TickSummary, simulation: &Simulation);
}

/// A no-op tick callback for testing.
pub struct NoOpCallback;

impl TickCallback for NoOpCallback {
    fn on_tick(&mut self, _summary: &TickSummary, _simulation: &Simulation) {}
}

/// Step `simulation` `max_ticks` times.
///
/// # Errors
///
/// Returns [`RunnerError`] if a tick fails; ticks completed before the
/// failure remain applied.
pub fn run_headless(
    simulation: &mut Simulation,
    max_ticks: u64,
    callback: &mut dyn TickCallback,
) -> Result<RunResult, RunnerError> {
    info!(
        run_id = %simulation.run_id(),
        seed = simulation.seed(),
        max_ticks,
        "Headless run starting"
    );

    let mut final_summary = None;
    let mut total_ticks: u64 = 0;

    while total_ticks < max_ticks {
        let summary = simulation.tick()?;
        total_ticks = total_ticks.saturating_add(1);
        callback.on_tick(&summary, simulation);
        final_summary = Some(summary);
    }

    Ok(RunResult {
        run_id: simulation.run_id(),
        total_ticks,
        final_summary,
    })
}

/// Log the end of a headless run.
pub fn log_run_end(result: &RunResult) {
    info!(
        run_id = %result.run_id,
        total_ticks = result.total_ticks,
        "Simulation ended"
    );

    if let Some(ref summary) = result.final_summary {
        info!(
            tick = summary.tick,
            total_transactions = summary.metrics.total_transactions,
            success_rate = summary.metrics.success_rate,
            "Final tick summary"
        );
    } else {
        warn!("Simulation ended with no ticks executed");
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::config::SimulationSettings;

    struct Counting {
        ticks: Vec<u64>,
    }

    impl TickCallback for Counting {
        fn on_tick(&mut self, summary: &TickSummary, simulation: &Simulation) {
            assert_eq!(summary.tick, simulation.current_tick());
            self.ticks.push(summary.tick);
        }
    }

    fn simulation() -> Simulation {
        let settings = SimulationSettings {
            grid_width: 4,
            grid_height: 4,
            initial_agent_count: 8,
            ..SimulationSettings::default()
        };
        Simulation::new(settings, 21).unwrap()
    }

    #[test]
    fn runs_exactly_max_ticks() {
        let mut sim = simulation();
        let mut callback = Counting { ticks: Vec::new() };

        let result = run_headless(&mut sim, 5, &mut callback).unwrap();

        assert_eq!(result.total_ticks, 5);
        assert_eq!(result.final_summary.unwrap().tick, 5);
        assert_eq!(callback.ticks, vec![1, 2, 3, 4, 5]);
        assert_eq!(result.run_id, sim.run_id());
    }

    #[test]
    fn zero_ticks_is_empty_run() {
        let mut sim = simulation();
        let result = run_headless(&mut sim, 0, &mut NoOpCallback).unwrap();
        assert_eq!(result.total_ticks, 0);
        assert!(result.final_summary.is_none());
        assert_eq!(sim.current_tick(), 0);
    }
}
