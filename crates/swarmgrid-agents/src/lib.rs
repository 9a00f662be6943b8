//! Agent population, movement, and trade matching for the SwarmGrid
//! simulation.
//!
//! This crate holds the per-agent logic of a tick without touching I/O. It
//! sits between `swarmgrid-types` (plain data), `swarmgrid-world` (the grid)
//! and `swarmgrid-ledger` (the transaction log) on one side and
//! `swarmgrid-core` (tick orchestration) on the other.
//!
//! # Modules
//!
//! - [`error`] -- Error type for agent operations ([`AgentError`])
//! - [`movement`] -- The movement stage and the four-way [`Direction`]
//! - [`random`] -- Injectable randomness ([`RandomSource`], [`SeededRandom`])
//! - [`registry`] -- The agent arena and population spawning ([`AgentRegistry`])
//! - [`reputation`] -- Reputation adjustment and reputation-scaled pricing
//! - [`trade`] -- The cell-local trade matching stage

pub mod error;
pub mod movement;
pub mod random;
pub mod registry;
pub mod reputation;
pub mod trade;

pub use error::AgentError;
pub use movement::{Direction, MovementReport, run_movement_stage};
pub use random::{RandomSource, SeededRandom};
pub use registry::{AgentRegistry, PopulationPlan, starting_holdings};
pub use reputation::{
    MAX_REPUTATION, MIN_REPUTATION, NEUTRAL_REPUTATION, penalize, quote_price, reward,
};
pub use trade::{TradeOutcome, TradeParams, TradeReport, run_trade_stage};
