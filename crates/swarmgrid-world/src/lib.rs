//! Grid space and resource distribution for the SwarmGrid simulation.
//!
//! # Modules
//!
//! - [`grid`] -- [`GridSpace`]: the cell arena, occupancy sets, heat, and
//!   clamped movement geometry.
//! - [`distribution`] -- Hotspot-then-scatter placement of the initial
//!   resource pools.
//! - [`error`] -- Error types for grid operations.

pub mod distribution;
pub mod error;
pub mod grid;

pub use distribution::{DistributionReport, Hotspot, distribute_resources};
pub use error::WorldError;
pub use grid::GridSpace;
