//! Error types for the `swarmgrid-world` crate.
//!
//! All fallible operations in this crate return [`WorldError`] through the
//! standard [`Result`] type alias.

use swarmgrid_types::{AgentId, Position, ResourceType};

/// Errors that can occur during grid operations.
#[derive(Debug, thiserror::Error)]
pub enum WorldError {
    /// Width or height is zero, or the cell count does not fit in memory.
    #[error("invalid grid dimensions {width}x{height}")]
    InvalidDimensions {
        /// Requested width.
        width: u32,
        /// Requested height.
        height: u32,
    },

    /// A coordinate lies outside the grid.
    #[error("position {position} is outside the grid")]
    OutOfBounds {
        /// The offending coordinate.
        position: Position,
    },

    /// The agent is not an occupant of the specified cell.
    #[error("agent {agent} is not in cell {position}")]
    AgentNotInCell {
        /// The agent.
        agent: AgentId,
        /// The cell.
        position: Position,
    },

    /// The agent already occupies the specified cell.
    #[error("agent {agent} is already in cell {position}")]
    AlreadyOccupant {
        /// The agent.
        agent: AgentId,
        /// The cell.
        position: Position,
    },

    /// Resource placement did not add up to the requested total.
    #[error("placed {placed} units of {resource}, expected {requested}")]
    DistributionMismatch {
        /// The resource type.
        resource: ResourceType,
        /// Configured total.
        requested: u32,
        /// Units actually placed.
        placed: u64,
    },

    /// Arithmetic overflow during a checked operation.
    #[error("arithmetic overflow in grid calculation")]
    ArithmeticOverflow,
}
