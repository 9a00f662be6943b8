//! The [`Simulation`] aggregate: settings, state and randomness for one run.
//!
//! Ticks and resets replace the whole state at once: a tick is computed on a
//! copy and swapped in only if every stage succeeds, so a failed tick leaves
//! the last completed state in place. A reset also mints a new `run_id`. The
//! random stream is not rewound, so successive runs from the same seed differ
//! while the sequence of runs as a whole stays reproducible.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use swarmgrid_agents::SeededRandom;
use tracing::info;
use uuid::Uuid;

use crate::config::{SettingsUpdate, SimulationSettings, is_structural_change};
use crate::tick::{self, SimulationState, TickError, TickSummary};

/// How a settings update was applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SettingsChange {
    /// Nothing differed.
    Unchanged,
    /// Takes effect from the next tick.
    NextTick,
    /// The state was rebuilt.
    Reinitialized,
}

/// One simulation run and the inputs that drive it.
#[derive(Debug, Clone)]
pub struct Simulation {
    settings: SimulationSettings,
    state: SimulationState,
    rng: SeededRandom,
    run_id: Uuid,
    started_at: DateTime<Utc>,
}

impl Simulation {
    /// Initialize a run from `settings`, drawing randomness from `seed`.
    ///
    /// # Errors
    ///
    /// Returns [`TickError::Settings`] for invalid settings.
    pub fn new(settings: SimulationSettings, seed: u64) -> Result<Self, TickError> {
        let mut rng = SeededRandom::new(seed);
        let state = tick::initialize(&settings, &mut rng)?;
        let run_id = Uuid::now_v7();
        info!(%run_id, seed, "Simulation run created");
        Ok(Self {
            settings,
            state,
            rng,
            run_id,
            started_at: Utc::now(),
        })
    }

    /// Run one tick.
    ///
    /// # Errors
    ///
    /// Returns [`TickError`] if a stage breaks an invariant. The state is
    /// left as it was before the call.
    pub fn tick(&mut self) -> Result<TickSummary, TickError> {
        let (next, summary) = tick::step(&self.state, &self.settings, &mut self.rng)?;
        self.state = next;
        Ok(summary)
    }

    /// Replace the state with a freshly initialized one under a new run id.
    ///
    /// # Errors
    ///
    /// Returns [`TickError`] if initialization fails; the old state is kept.
    pub fn reset(&mut self) -> Result<(), TickError> {
        let state = tick::initialize(&self.settings, &mut self.rng)?;
        let previous = self.run_id;
        self.state = state;
        self.run_id = Uuid::now_v7();
        self.started_at = Utc::now();
        info!(%previous, run_id = %self.run_id, "Simulation reset");
        Ok(())
    }

    /// Merge `update` into the current settings.
    ///
    /// Structural changes (grid, population, ratios, resources) rebuild the
    /// state; the rest apply from the next tick.
    ///
    /// # Errors
    ///
    /// Returns [`TickError::Settings`] if the merged settings are invalid;
    /// nothing changes in that case.
    pub fn update_settings(&mut self, update: &SettingsUpdate) -> Result<SettingsChange, TickError> {
        let merged = update.apply(&self.settings);
        merged.validate()?;
        if merged == self.settings {
            return Ok(SettingsChange::Unchanged);
        }

        let structural = is_structural_change(&self.settings, &merged);
        let previous = std::mem::replace(&mut self.settings, merged);
        if structural {
            if let Err(err) = self.reset() {
                self.settings = previous;
                return Err(err);
            }
            return Ok(SettingsChange::Reinitialized);
        }
        info!(tick = self.state.tick(), "Settings updated");
        Ok(SettingsChange::NextTick)
    }

    /// Current settings.
    pub const fn settings(&self) -> &SimulationSettings {
        &self.settings
    }

    /// Current state.
    pub const fn state(&self) -> &SimulationState {
        &self.state
    }

    /// Identifier of the current run.
    pub const fn run_id(&self) -> Uuid {
        self.run_id
    }

    /// When the current run was initialized.
    pub const fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Seed the random stream was created from.
    pub const fn seed(&self) -> u64 {
        self.rng.seed()
    }

    /// The last completed tick.
    pub const fn current_tick(&self) -> u64 {
        self.state.tick()
    }
}
