//! Settings, tick cycle, and run control for the SwarmGrid simulation.
//!
//! This crate owns the fixed-order tick that drives the simulation:
//! Clock, Movement, Trade, Metrics, and a holdings conservation check.
//!
//! # Modules
//!
//! - [`clock`] -- Monotonic tick counter.
//! - [`config`] -- Configuration loading from `swarmgrid-config.yaml` and
//!   validated [`SimulationSettings`].
//! - [`driver`] -- [`TickDriver`]: manual steps and a cancellable timer.
//! - [`runner`] -- [`TickCallback`] and the bounded headless runner.
//! - [`simulation`] -- The [`Simulation`] aggregate (settings, state, run id).
//! - [`tick`] -- `initialize`, `step` and `run_tick`.
//!
//! [`SimulationSettings`]: config::SimulationSettings
//! [`TickDriver`]: driver::TickDriver
//! [`TickCallback`]: runner::TickCallback
//! [`Simulation`]: simulation::Simulation

pub mod clock;
pub mod config;
pub mod driver;
pub mod runner;
pub mod simulation;
pub mod tick;
