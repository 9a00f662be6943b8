//! Shared type definitions for the SwarmGrid simulation.
//!
//! This crate is the single source of truth for the data that flows between
//! the simulation crates and out to the observer. Types are exported to
//! `TypeScript` via `ts-rs` for dashboard clients.
//!
//! # Modules
//!
//! - [`ids`] -- Arena-index identifiers for agents and transactions
//! - [`enums`] -- Agent kinds, resource types, trend direction
//! - [`structs`] -- Positions, agents, cells, transactions, metrics

pub mod enums;
pub mod ids;
pub mod structs;

pub use enums::{AgentKind, ResourceType, TrendDirection};
pub use ids::{AgentId, TransactionId};
pub use structs::{
    Agent, EconomicMetrics, GridCell, Holdings, Position, PriceTrend, Transaction,
    uniform_holdings,
};
