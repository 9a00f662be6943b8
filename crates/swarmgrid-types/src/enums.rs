//! Enumeration types for the SwarmGrid simulation.
//!
//! Agent roles and resource kinds are closed sets, so they are modeled as
//! plain enums with explicit branching rather than trait objects.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

// ---------------------------------------------------------------------------
// Agent kind
// ---------------------------------------------------------------------------

/// The economic role an agent plays in trade matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum AgentKind {
    /// Sells resources to consumers in the same cell.
    Provider,
    /// Buys resources from providers in the same cell.
    Consumer,
    /// May act as either side, decided per tick.
    Hybrid,
}

impl AgentKind {
    /// All agent kinds in declaration order.
    pub const ALL: [Self; 3] = [Self::Provider, Self::Consumer, Self::Hybrid];

    /// Whether agents of this kind are eligible to be selected as providers.
    pub const fn can_provide(self) -> bool {
        matches!(self, Self::Provider | Self::Hybrid)
    }

    /// Whether agents of this kind are eligible to act as consumers.
    pub const fn can_consume(self) -> bool {
        matches!(self, Self::Consumer | Self::Hybrid)
    }
}

// ---------------------------------------------------------------------------
// Resource type
// ---------------------------------------------------------------------------

/// One of the fixed resource types traded on the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum ResourceType {
    /// Compute capacity.
    Compute,
    /// Storage capacity.
    Storage,
    /// Data sets.
    Data,
}

impl ResourceType {
    /// All resource types in declaration order.
    pub const ALL: [Self; 3] = [Self::Compute, Self::Storage, Self::Data];

    /// Lowercase name used in JSON keys and log fields.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Compute => "compute",
            Self::Storage => "storage",
            Self::Data => "data",
        }
    }
}

impl core::fmt::Display for ResourceType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Price trend direction
// ---------------------------------------------------------------------------

/// Direction of a resource's recent unit-price movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum TrendDirection {
    /// Newer trades are more expensive per unit.
    Up,
    /// Newer trades are cheaper per unit.
    Down,
    /// No measurable change.
    Flat,
}
