//! Tick cycle: the fixed-order engine step that drives the SwarmGrid simulation.
//!
//! Each tick runs these stages in sequence, with no suspension between them:
//!
//! 1. **Clock** -- advance the tick counter and clear last tick's heat.
//! 2. **Movement** -- every agent may take one random cardinal step.
//! 3. **Trade** -- cell-local, reputation-weighted matching; every recorded
//!    attempt lands in the global log and both agents' histories.
//! 4. **Metrics** -- recompute the windowed economic statistics.
//! 5. **Conservation** -- confirm trades only moved units between agents.
//!
//! The cycle is deterministic given the same starting state and the same
//! random stream. [`step`] is the non-mutating form; [`run_tick`] advances a
//! state in place.

use serde::{Deserialize, Serialize};
use swarmgrid_agents::movement::{MovementReport, run_movement_stage};
use swarmgrid_agents::registry::{AgentRegistry, PopulationPlan};
use swarmgrid_agents::trade::{TradeParams, TradeReport, run_trade_stage};
use swarmgrid_agents::{AgentError, RandomSource};
use swarmgrid_ledger::{ConservationResult, TransactionLog, recompute_metrics, verify_conservation};
use swarmgrid_types::EconomicMetrics;
use swarmgrid_world::{GridSpace, WorldError, distribute_resources};
use tracing::{debug, error, info};

use crate::clock::{ClockError, WorldClock};
use crate::config::{SettingsError, SimulationSettings};

/// Errors that can occur during initialization or tick execution.
#[derive(Debug, thiserror::Error)]
pub enum TickError {
    /// The settings failed validation.
    #[error("settings error: {source}")]
    Settings {
        /// The underlying validation error.
        #[from]
        source: SettingsError,
    },

    /// A clock operation failed.
    #[error("clock error: {source}")]
    Clock {
        /// The underlying clock error.
        #[from]
        source: ClockError,
    },

    /// A grid operation failed.
    #[error("world error: {source}")]
    World {
        /// The underlying world error.
        #[from]
        source: WorldError,
    },

    /// An agent stage failed.
    #[error("agent error: {source}")]
    Agent {
        /// The underlying agent error.
        #[from]
        source: AgentError,
    },
}

/// Summary of a single tick's execution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickSummary {
    /// The tick number that was executed.
    pub tick: u64,
    /// Movement stage counts.
    pub movement: MovementReport,
    /// Trade stage counts.
    pub trade: TradeReport,
    /// Metrics after this tick.
    pub metrics: EconomicMetrics,
    /// Whether holdings totals were unchanged by the tick.
    pub conserved: bool,
    /// Description of the conservation failure, if any.
    pub anomaly: Option<String>,
}

/// Everything a tick reads and writes.
///
/// Cloning produces an independent snapshot; [`step`] relies on this.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationState {
    /// The world clock.
    pub clock: WorldClock,
    /// Cells, occupancy and resource pools.
    pub grid: GridSpace,
    /// Every agent, addressed by id.
    pub agents: AgentRegistry,
    /// Every recorded trade attempt.
    pub ledger: TransactionLog,
    /// Metrics as of the last completed tick.
    pub metrics: EconomicMetrics,
}

impl SimulationState {
    /// The last completed tick (0 before the first).
    pub const fn tick(&self) -> u64 {
        self.clock.tick()
    }
}

/// Build a fresh state from `settings`.
///
/// Validates the settings, lays out the grid, distributes the configured
/// resource totals, spawns the population, and zeroes the metrics.
///
/// # Errors
///
/// Returns [`TickError::Settings`] for invalid settings, or a world or agent
/// error if placement breaks an invariant.
pub fn initialize<R: RandomSource + ?Sized>(
    settings: &SimulationSettings,
    rng: &mut R,
) -> Result<SimulationState, TickError> {
    settings.validate()?;

    let mut grid = GridSpace::new(settings.grid_width, settings.grid_height)?;
    let distribution = distribute_resources(&mut grid, &settings.initial_resources, rng.generator())?;

    let plan = PopulationPlan::split(
        settings.initial_agent_count,
        settings.provider_ratio,
        settings.consumer_ratio,
    );
    let mut agents = AgentRegistry::new();
    agents.spawn_population(&plan, &mut grid, rng)?;

    info!(
        width = settings.grid_width,
        height = settings.grid_height,
        providers = plan.providers,
        consumers = plan.consumers,
        hybrids = plan.hybrids,
        hotspots = distribution.hotspots.len(),
        scatter_drops = distribution.scatter_drop_count(),
        "Simulation initialized"
    );

    Ok(SimulationState {
        clock: WorldClock::new(),
        grid,
        agents,
        ledger: TransactionLog::new(),
        metrics: EconomicMetrics::default(),
    })
}

/// Produce the state after one tick without touching `state`.
///
/// # Errors
///
/// Returns [`TickError`] under the same conditions as [`run_tick`].
pub fn step<R: RandomSource + ?Sized>(
    state: &SimulationState,
    settings: &SimulationSettings,
    rng: &mut R,
) -> Result<(SimulationState, TickSummary), TickError> {
    let mut next = state.clone();
    let summary = run_tick(&mut next, settings, rng)?;
    Ok((next, summary))
}

/// Execute one complete tick in place.
///
/// # Errors
///
/// Returns [`TickError::Settings`] for invalid settings (state untouched),
/// [`TickError::Clock`] on tick overflow, or a world or agent error if a
/// stage breaks an invariant.
pub fn run_tick<R: RandomSource + ?Sized>(
    state: &mut SimulationState,
    settings: &SimulationSettings,
    rng: &mut R,
) -> Result<TickSummary, TickError> {
    settings.validate()?;

    // --- Clock ---
    let tick = state.clock.advance()?;
    state.grid.clear_heat();
    let holdings_before = state.agents.holdings_totals();

    // --- Movement ---
    let movement = run_movement_stage(
        &mut state.agents,
        &mut state.grid,
        settings.movement_probability,
        rng,
    )?;

    // --- Trade ---
    let params = TradeParams {
        tick,
        trade_probability: settings.trade_probability,
        reputation_impact: settings.reputation_impact,
    };
    let trade = run_trade_stage(
        &mut state.agents,
        &mut state.grid,
        &mut state.ledger,
        &params,
        rng,
    )?;

    // --- Metrics ---
    let holdings_after = state.agents.holdings_totals();
    state.metrics = recompute_metrics(&state.metrics, &state.ledger, &holdings_after, tick);

    // --- Conservation ---
    let anomaly = match verify_conservation(tick, &holdings_before, &holdings_after) {
        ConservationResult::Balanced => None,
        ConservationResult::Anomaly(anomaly) => {
            error!(tick, %anomaly, "Holdings conservation violated");
            Some(anomaly.message)
        }
    };

    debug!(
        tick,
        moved = movement.moved,
        attempts = trade.attempts,
        transactions = trade.recorded,
        successes = trade.successes,
        "Tick completed"
    );

    Ok(TickSummary {
        tick,
        movement,
        trade,
        metrics: state.metrics.clone(),
        conserved: anomaly.is_none(),
        anomaly,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use swarmgrid_agents::SeededRandom;
    use swarmgrid_types::ResourceType;

    use super::*;

    fn small_settings() -> SimulationSettings {
        SimulationSettings {
            grid_width: 6,
            grid_height: 4,
            initial_agent_count: 12,
            ..SimulationSettings::default()
        }
    }

    #[test]
    fn initialize_builds_grid_population_and_resources() {
        let settings = small_settings();
        let mut rng = SeededRandom::new(1);
        let state = initialize(&settings, &mut rng).unwrap();

        assert_eq!(state.tick(), 0);
        assert_eq!(state.grid.cell_count(), 24);
        assert_eq!(state.agents.len(), 12);
        assert!(state.ledger.is_empty());
        for resource in ResourceType::ALL {
            assert_eq!(state.grid.resource_total(resource), 1000);
        }
    }

    #[test]
    fn initialize_rejects_invalid_settings() {
        let settings = SimulationSettings {
            grid_width: 0,
            ..small_settings()
        };
        let result = initialize(&settings, &mut SeededRandom::new(1));
        assert!(matches!(
            result,
            Err(TickError::Settings {
                source: SettingsError::InvalidGridDimensions { .. }
            })
        ));
    }

    #[test]
    fn tick_advances_clock_and_conserves_holdings() {
        let settings = small_settings();
        let mut rng = SeededRandom::new(2);
        let mut state = initialize(&settings, &mut rng).unwrap();

        for expected in 1..=20 {
            let summary = run_tick(&mut state, &settings, &mut rng).unwrap();
            assert_eq!(summary.tick, expected);
            assert!(summary.conserved);
            assert!(summary.anomaly.is_none());
        }
        assert_eq!(state.tick(), 20);
    }

    #[test]
    fn step_leaves_input_untouched() {
        let settings = small_settings();
        let mut rng = SeededRandom::new(3);
        let state = initialize(&settings, &mut rng).unwrap();
        let before = state.clone();

        let (next, summary) = step(&state, &settings, &mut rng).unwrap();

        assert_eq!(state, before);
        assert_eq!(next.tick(), 1);
        assert_eq!(summary.tick, 1);
    }

    #[test]
    fn invalid_settings_do_not_advance_the_clock() {
        let settings = small_settings();
        let mut rng = SeededRandom::new(4);
        let mut state = initialize(&settings, &mut rng).unwrap();

        let broken = SimulationSettings {
            movement_probability: 2.0,
            ..settings
        };
        assert!(run_tick(&mut state, &broken, &mut rng).is_err());
        assert_eq!(state.tick(), 0);
    }

    #[test]
    fn heat_counts_only_the_last_tick() {
        let settings = SimulationSettings {
            trade_probability: 1.0,
            ..small_settings()
        };
        let mut rng = SeededRandom::new(5);
        let mut state = initialize(&settings, &mut rng).unwrap();

        for _ in 0..10 {
            let summary = run_tick(&mut state, &settings, &mut rng).unwrap();
            let heat: u32 = state.grid.cells().map(|c| c.heat_level).sum();
            assert_eq!(heat, summary.trade.recorded);
        }
    }
}
