//! The grid: a dense, row-major arena of cells.
//!
//! Cells hold [`AgentId`] sets rather than references to agents, so moving
//! an agent is two set edits and never aliases the agent registry. The grid
//! is the only place occupancy is stored; the agent's own `position` field
//! must always agree with it at tick boundaries.

use std::collections::{BTreeMap, BTreeSet};

use rand::Rng;
use swarmgrid_types::{AgentId, GridCell, Position, ResourceType};

use crate::error::WorldError;

/// A `width` x `height` grid of cells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridSpace {
    width: u32,
    height: u32,
    /// Row-major: index = `y * width + x`.
    cells: Vec<GridCell>,
}

impl GridSpace {
    /// Create a grid of empty cells.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::InvalidDimensions`] if either side is zero.
    pub fn new(width: u32, height: u32) -> Result<Self, WorldError> {
        if width == 0 || height == 0 {
            return Err(WorldError::InvalidDimensions { width, height });
        }
        let count = usize::try_from(u64::from(width).saturating_mul(u64::from(height)))
            .ok()
            .ok_or(WorldError::InvalidDimensions { width, height })?;

        let mut cells = Vec::with_capacity(count);
        for y in 0..height {
            for x in 0..width {
                cells.push(GridCell::empty(Position::new(x, y)));
            }
        }
        Ok(Self {
            width,
            height,
            cells,
        })
    }

    /// Number of columns.
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Number of rows.
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Total number of cells.
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// Whether `position` lies on the grid.
    pub const fn contains(&self, position: Position) -> bool {
        position.x < self.width && position.y < self.height
    }

    fn slot(&self, position: Position) -> Option<usize> {
        if !self.contains(position) {
            return None;
        }
        let row = u64::from(position.y).checked_mul(u64::from(self.width))?;
        let index = row.checked_add(u64::from(position.x))?;
        usize::try_from(index).ok()
    }

    /// The cell at `position`, if on the grid.
    pub fn cell(&self, position: Position) -> Option<&GridCell> {
        self.slot(position).and_then(|i| self.cells.get(i))
    }

    /// Mutable access to the cell at `position`, if on the grid.
    pub fn cell_mut(&mut self, position: Position) -> Option<&mut GridCell> {
        self.slot(position).and_then(|i| self.cells.get_mut(i))
    }

    fn cell_or_err(&mut self, position: Position) -> Result<&mut GridCell, WorldError> {
        self.cell_mut(position)
            .ok_or(WorldError::OutOfBounds { position })
    }

    /// All cells in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = &GridCell> {
        self.cells.iter()
    }

    /// Occupants of the cell at `position`.
    pub fn occupants(&self, position: Position) -> Option<&BTreeSet<AgentId>> {
        self.cell(position).map(|c| &c.occupants)
    }

    /// Positions of cells holding at least `min_occupants` agents, row-major.
    pub fn crowded_positions(&self, min_occupants: usize) -> Vec<Position> {
        self.cells
            .iter()
            .filter(|c| c.occupants.len() >= min_occupants)
            .map(|c| c.position)
            .collect()
    }

    // -----------------------------------------------------------------------
    // Geometry
    // -----------------------------------------------------------------------

    /// Offset `from` by `(dx, dy)`, clamping each axis into the grid.
    ///
    /// An attempted move off an edge leaves that axis unchanged.
    pub fn clamp_step(&self, from: Position, dx: i32, dy: i32) -> Position {
        Position::new(
            clamp_axis(from.x, dx, self.width),
            clamp_axis(from.y, dy, self.height),
        )
    }

    /// A uniformly random coordinate on the grid.
    pub fn random_position<R: Rng + ?Sized>(&self, rng: &mut R) -> Position {
        Position::new(
            rng.random_range(0..self.width),
            rng.random_range(0..self.height),
        )
    }

    // -----------------------------------------------------------------------
    // Occupancy
    // -----------------------------------------------------------------------

    /// Add `agent` to the occupant set of the cell at `position`.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::OutOfBounds`] or [`WorldError::AlreadyOccupant`].
    pub fn place_agent(&mut self, agent: AgentId, position: Position) -> Result<(), WorldError> {
        let cell = self.cell_or_err(position)?;
        if !cell.occupants.insert(agent) {
            return Err(WorldError::AlreadyOccupant { agent, position });
        }
        Ok(())
    }

    /// Move `agent` from the cell at `from` to the cell at `to`.
    ///
    /// Both cells are validated before either is touched, so a failed move
    /// leaves occupancy unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::OutOfBounds`] or [`WorldError::AgentNotInCell`].
    pub fn relocate_agent(
        &mut self,
        agent: AgentId,
        from: Position,
        to: Position,
    ) -> Result<(), WorldError> {
        if !self.contains(to) {
            return Err(WorldError::OutOfBounds { position: to });
        }
        if from == to {
            return Ok(());
        }

        let source = self.cell_or_err(from)?;
        if !source.occupants.remove(&agent) {
            return Err(WorldError::AgentNotInCell {
                agent,
                position: from,
            });
        }

        self.cell_or_err(to)?.occupants.insert(agent);
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Resources and heat
    // -----------------------------------------------------------------------

    /// Add `amount` units of `resource` to the pool at `position`.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::OutOfBounds`] or [`WorldError::ArithmeticOverflow`].
    pub fn add_resource(
        &mut self,
        position: Position,
        resource: ResourceType,
        amount: u32,
    ) -> Result<(), WorldError> {
        let cell = self.cell_or_err(position)?;
        let pool = cell.resources.entry(resource).or_insert(0);
        *pool = pool
            .checked_add(amount)
            .ok_or(WorldError::ArithmeticOverflow)?;
        Ok(())
    }

    /// Sum of `resource` across every cell.
    pub fn resource_total(&self, resource: ResourceType) -> u64 {
        self.cells
            .iter()
            .map(|c| u64::from(c.resource(resource)))
            .fold(0_u64, u64::saturating_add)
    }

    /// Per-type sums across every cell.
    pub fn resource_totals(&self) -> BTreeMap<ResourceType, u64> {
        ResourceType::ALL
            .iter()
            .map(|r| (*r, self.resource_total(*r)))
            .collect()
    }

    /// Bump the heat of the cell at `position` by one.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::OutOfBounds`].
    pub fn record_heat(&mut self, position: Position) -> Result<(), WorldError> {
        let cell = self.cell_or_err(position)?;
        cell.heat_level = cell.heat_level.saturating_add(1);
        Ok(())
    }

    /// Zero every cell's heat.
    pub fn clear_heat(&mut self) {
        for cell in &mut self.cells {
            cell.heat_level = 0;
        }
    }
}

fn clamp_axis(value: u32, delta: i32, extent: u32) -> u32 {
    let max = extent.saturating_sub(1);
    let moved = if delta.is_negative() {
        value.saturating_sub(delta.unsigned_abs())
    } else {
        value.saturating_add(delta.unsigned_abs())
    };
    moved.min(max)
}
