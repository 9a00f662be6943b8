//! Error types for the swarmgrid-agents crate.
//!
//! The stages never panic. Anything that would break an invariant (an
//! unknown agent id, a transfer larger than live holdings) comes back as an
//! [`AgentError`] and indicates a defect rather than a recoverable condition.

use swarmgrid_ledger::LedgerError;
use swarmgrid_types::{AgentId, ResourceType};
use swarmgrid_world::WorldError;

/// Errors that can occur during agent operations.
#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    /// Agent with the given ID is not in the registry.
    #[error("agent not found: {0}")]
    AgentNotFound(AgentId),

    /// Attempted to remove more of a resource than the agent holds.
    #[error("agent {agent} holds {available} {resource}, cannot give {requested}")]
    InsufficientHoldings {
        /// The giving agent.
        agent: AgentId,
        /// The resource type being removed.
        resource: ResourceType,
        /// The quantity the caller attempted to remove.
        requested: u32,
        /// The quantity the agent actually holds.
        available: u32,
    },

    /// An arithmetic overflow occurred.
    #[error("arithmetic overflow: {context}")]
    ArithmeticOverflow {
        /// Description of what was being computed.
        context: String,
    },

    /// A grid operation failed.
    #[error("world error: {source}")]
    World {
        /// The underlying world error.
        #[from]
        source: WorldError,
    },

    /// A transaction could not be recorded.
    #[error("ledger error: {source}")]
    Ledger {
        /// The underlying ledger error.
        #[from]
        source: LedgerError,
    },
}
