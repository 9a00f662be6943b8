//! Movement stage: one random cardinal step per agent per tick.
//!
//! Each agent moves independently, so the resulting occupancy does not
//! depend on processing order. Steps off an edge are clamped away.

use serde::{Deserialize, Serialize};
use swarmgrid_world::GridSpace;

use crate::error::AgentError;
use crate::random::RandomSource;
use crate::registry::AgentRegistry;

/// A cardinal direction on the grid. `Up` decreases `y`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    /// `y - 1`.
    Up,
    /// `x + 1`.
    Right,
    /// `y + 1`.
    Down,
    /// `x - 1`.
    Left,
}

impl Direction {
    /// All four directions.
    pub const ALL: [Self; 4] = [Self::Up, Self::Right, Self::Down, Self::Left];

    /// `(dx, dy)` for one step.
    pub const fn delta(self) -> (i32, i32) {
        match self {
            Self::Up => (0, -1),
            Self::Right => (1, 0),
            Self::Down => (0, 1),
            Self::Left => (-1, 0),
        }
    }
}

/// Counts from one movement pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovementReport {
    /// Agents whose position changed.
    pub moved: u32,
    /// Agents that tried to step off the grid and stayed put.
    pub blocked: u32,
}

/// Move every agent with probability `movement_probability`.
///
/// # Errors
///
/// Returns [`AgentError::World`] if an agent's recorded position disagrees
/// with grid occupancy.
pub fn run_movement_stage<R: RandomSource + ?Sized>(
    registry: &mut AgentRegistry,
    grid: &mut GridSpace,
    movement_probability: f64,
    rng: &mut R,
) -> Result<MovementReport, AgentError> {
    let mut report = MovementReport::default();

    for agent in registry.iter_mut() {
        if !rng.chance(movement_probability) {
            continue;
        }
        let (dx, dy) = rng.direction().delta();
        let to = grid.clamp_step(agent.position, dx, dy);
        if to == agent.position {
            report.blocked = report.blocked.saturating_add(1);
            continue;
        }
        grid.relocate_agent(agent.id, agent.position, to)?;
        agent.position = to;
        report.moved = report.moved.saturating_add(1);
    }

    Ok(report)
}
