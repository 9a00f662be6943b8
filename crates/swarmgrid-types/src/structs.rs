//! Core entity structs shared across the SwarmGrid workspace.
//!
//! These are plain data carriers. Behavior lives in the crates that own
//! each concern (`swarmgrid-world` for cells, `swarmgrid-agents` for agents,
//! `swarmgrid-ledger` for transactions and metrics).

use std::collections::{BTreeMap, BTreeSet};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::{AgentKind, ResourceType, TrendDirection};
use crate::ids::{AgentId, TransactionId};

/// Quantity held per resource type.
pub type Holdings = BTreeMap<ResourceType, u32>;

/// Build a [`Holdings`] map with the same quantity for every resource type.
pub fn uniform_holdings(quantity: u32) -> Holdings {
    ResourceType::ALL.iter().map(|r| (*r, quantity)).collect()
}

// ---------------------------------------------------------------------------
// Position
// ---------------------------------------------------------------------------

/// A coordinate on the grid. `x` is the column, `y` the row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Position {
    /// Column, in `[0, width)`.
    pub x: u32,
    /// Row, in `[0, height)`.
    pub y: u32,
}

impl Position {
    /// Create a position from column and row.
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }
}

impl core::fmt::Display for Position {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

// ---------------------------------------------------------------------------
// Agent
// ---------------------------------------------------------------------------

/// A trading agent and its mutable economic state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Agent {
    /// Arena index of this agent.
    pub id: AgentId,
    /// Trading role.
    pub kind: AgentKind,
    /// Current cell.
    pub position: Position,
    /// Units held per resource type.
    pub holdings: Holdings,
    /// Reputation in `[0, 100]`; 50 is neutral.
    #[ts(as = "String")]
    pub reputation: Decimal,
    /// Transactions this agent took part in, oldest first.
    pub history: Vec<TransactionId>,
}

impl Agent {
    /// Units of `resource` currently held (0 when absent).
    pub fn holding(&self, resource: ResourceType) -> u32 {
        self.holdings.get(&resource).copied().unwrap_or(0)
    }
}

// ---------------------------------------------------------------------------
// Grid cell
// ---------------------------------------------------------------------------

/// A single grid cell: occupants, local resource pool, and heat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct GridCell {
    /// Coordinate of this cell.
    pub position: Position,
    /// Agents currently standing in this cell.
    pub occupants: BTreeSet<AgentId>,
    /// Resource pool placed at initialization.
    pub resources: Holdings,
    /// Transactions recorded in this cell during the last completed tick.
    pub heat_level: u32,
}

impl GridCell {
    /// Create an empty cell at `position`.
    pub fn empty(position: Position) -> Self {
        Self {
            position,
            occupants: BTreeSet::new(),
            resources: uniform_holdings(0),
            heat_level: 0,
        }
    }

    /// Units of `resource` pooled in this cell (0 when absent).
    pub fn resource(&self, resource: ResourceType) -> u32 {
        self.resources.get(&resource).copied().unwrap_or(0)
    }
}

// ---------------------------------------------------------------------------
// Transaction
// ---------------------------------------------------------------------------

/// An immutable record of one trade attempt between two agents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Transaction {
    /// Position in the global log.
    pub id: TransactionId,
    /// Agent that supplied the resource.
    pub provider_id: AgentId,
    /// Agent that requested the resource.
    pub consumer_id: AgentId,
    /// Resource traded.
    pub resource_type: ResourceType,
    /// Units requested, always at least 1.
    pub amount: u32,
    /// Quoted price, always at least 1.
    pub price: u32,
    /// Tick in which the attempt happened.
    pub tick: u64,
    /// Whether the units were transferred.
    pub success: bool,
}

impl Transaction {
    /// Whether `agent` was either side of this transaction.
    pub fn involves(&self, agent: AgentId) -> bool {
        self.provider_id == agent || self.consumer_id == agent
    }

    /// The other side of this transaction from `agent`'s point of view.
    pub fn counterparty_of(&self, agent: AgentId) -> Option<AgentId> {
        if self.provider_id == agent {
            Some(self.consumer_id)
        } else if self.consumer_id == agent {
            Some(self.provider_id)
        } else {
            None
        }
    }
}

// ---------------------------------------------------------------------------
// Metrics
// ---------------------------------------------------------------------------

/// Rolling economic statistics recomputed at the end of every tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct EconomicMetrics {
    /// Size of the full transaction log.
    pub total_transactions: u64,
    /// Fraction of windowed transactions that succeeded.
    pub success_rate: f64,
    /// Price per unit over successful windowed trades, per type.
    pub average_price: BTreeMap<ResourceType, f64>,
    /// Windowed traded units over current holdings, per type.
    pub resource_utilization: BTreeMap<ResourceType, f64>,
}

impl Default for EconomicMetrics {
    fn default() -> Self {
        let zeros: BTreeMap<ResourceType, f64> =
            ResourceType::ALL.iter().map(|r| (*r, 0.0)).collect();
        Self {
            total_transactions: 0,
            success_rate: 0.0,
            average_price: zeros.clone(),
            resource_utilization: zeros,
        }
    }
}

/// Recent unit-price movement for one resource type.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct PriceTrend {
    /// Percent change of the newer half's mean unit price over the older half's.
    pub percent_change: f64,
    /// Sign of the change.
    pub direction: TrendDirection,
}
