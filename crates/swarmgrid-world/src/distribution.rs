//! Stochastic placement of the initial resource pools.
//!
//! Each resource type is placed independently. A handful of hotspots first
//! absorb large shares of what is left, then the remainder is scattered in
//! small drops until the pool is exhausted. The placed sum always equals the
//! requested total.

use rand::Rng;
use swarmgrid_types::{Holdings, Position, ResourceType};
use tracing::debug;

use crate::error::WorldError;
use crate::grid::GridSpace;

/// Fewest hotspots drawn per resource type.
pub const MIN_HOTSPOTS: u32 = 3;

/// Most hotspots drawn per resource type.
pub const MAX_HOTSPOTS: u32 = 7;

/// Smallest hotspot share of the remaining pool, in per-mille.
const MIN_HOTSPOT_SHARE_PER_MILLE: u64 = 100;

/// Upper bound (exclusive) of a hotspot share, in per-mille.
const MAX_HOTSPOT_SHARE_PER_MILLE: u64 = 400;

/// Largest single scatter drop after the hotspots are placed.
pub const MAX_SCATTER_UNITS: u32 = 10;

/// A hotspot placed during distribution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hotspot {
    /// Resource type placed.
    pub resource: ResourceType,
    /// Where it landed.
    pub position: Position,
    /// Units absorbed.
    pub amount: u32,
}

/// What [`distribute_resources`] placed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DistributionReport {
    /// Every hotspot, in placement order.
    pub hotspots: Vec<Hotspot>,
    /// Number of scatter drops per resource type.
    pub scatter_drops: Vec<(ResourceType, u32)>,
}

impl DistributionReport {
    /// Units placed by hotspots for `resource`.
    pub fn hotspot_units(&self, resource: ResourceType) -> u64 {
        self.hotspots
            .iter()
            .filter(|h| h.resource == resource)
            .map(|h| u64::from(h.amount))
            .sum()
    }

    /// Scatter drops across every resource type.
    pub fn scatter_drop_count(&self) -> u32 {
        self.scatter_drops
            .iter()
            .fold(0_u32, |acc, (_, drops)| acc.saturating_add(*drops))
    }
}

/// Place `totals` onto `grid`.
///
/// # Errors
///
/// Returns [`WorldError::ArithmeticOverflow`] if a cell pool would overflow,
/// or [`WorldError::DistributionMismatch`] if the placed sum for a type does
/// not equal its requested total.
pub fn distribute_resources<R: Rng + ?Sized>(
    grid: &mut GridSpace,
    totals: &Holdings,
    rng: &mut R,
) -> Result<DistributionReport, WorldError> {
    let mut report = DistributionReport::default();

    for resource in ResourceType::ALL {
        let requested = totals.get(&resource).copied().unwrap_or(0);
        let mut remaining = requested;
        let mut placed: u64 = 0;

        let hotspot_count = rng.random_range(MIN_HOTSPOTS..=MAX_HOTSPOTS);
        for _ in 0..hotspot_count {
            let position = grid.random_position(rng);
            let share = rng.random_range(MIN_HOTSPOT_SHARE_PER_MILLE..MAX_HOTSPOT_SHARE_PER_MILLE);
            let amount = u64::from(remaining)
                .checked_mul(share)
                .and_then(|v| v.checked_div(1000))
                .and_then(|v| u32::try_from(v).ok())
                .ok_or(WorldError::ArithmeticOverflow)?;
            if amount == 0 {
                continue;
            }
            grid.add_resource(position, resource, amount)?;
            remaining = remaining
                .checked_sub(amount)
                .ok_or(WorldError::ArithmeticOverflow)?;
            placed = placed.saturating_add(u64::from(amount));
            report.hotspots.push(Hotspot {
                resource,
                position,
                amount,
            });
        }

        let mut drops: u32 = 0;
        while remaining > 0 {
            let amount = rng.random_range(1..=MAX_SCATTER_UNITS).min(remaining);
            let position = grid.random_position(rng);
            grid.add_resource(position, resource, amount)?;
            remaining = remaining.saturating_sub(amount);
            placed = placed.saturating_add(u64::from(amount));
            drops = drops.saturating_add(1);
        }
        report.scatter_drops.push((resource, drops));

        if placed != u64::from(requested) {
            return Err(WorldError::DistributionMismatch {
                resource,
                requested,
                placed,
            });
        }
        debug!(
            resource = resource.as_str(),
            requested,
            hotspots = hotspot_count,
            drops,
            "Resource distributed"
        );
    }

    Ok(report)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use swarmgrid_types::uniform_holdings;

    use super::*;

    #[test]
    fn placed_totals_match_requested_exactly() {
        for seed in 0..20 {
            let mut rng = StdRng::seed_from_u64(seed);
            let mut grid = GridSpace::new(20, 20).unwrap();
            let mut totals = uniform_holdings(1000);
            totals.insert(ResourceType::Data, 7);
            distribute_resources(&mut grid, &totals, &mut rng).unwrap();
            assert_eq!(grid.resource_total(ResourceType::Compute), 1000);
            assert_eq!(grid.resource_total(ResourceType::Storage), 1000);
            assert_eq!(grid.resource_total(ResourceType::Data), 7);
        }
    }

    #[test]
    fn hotspot_count_within_bounds() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut grid = GridSpace::new(10, 10).unwrap();
        let report = distribute_resources(&mut grid, &uniform_holdings(5000), &mut rng).unwrap();
        for resource in ResourceType::ALL {
            let count = report
                .hotspots
                .iter()
                .filter(|h| h.resource == resource)
                .count();
            assert!(count <= 7, "{resource}: {count} hotspots");
            assert!(count >= 3, "{resource}: {count} hotspots");
        }
    }

    #[test]
    fn scatter_covers_what_hotspots_leave() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut grid = GridSpace::new(8, 8).unwrap();
        let report = distribute_resources(&mut grid, &uniform_holdings(1000), &mut rng).unwrap();

        assert_eq!(report.scatter_drops.len(), ResourceType::ALL.len());
        for (resource, drops) in &report.scatter_drops {
            let leftover = 1000_u64.saturating_sub(report.hotspot_units(*resource));
            // Each drop places between 1 and MAX_SCATTER_UNITS units.
            assert!(u64::from(*drops) >= leftover.div_ceil(u64::from(MAX_SCATTER_UNITS)));
            assert!(u64::from(*drops) <= leftover);
        }
        assert!(report.scatter_drop_count() > 0);
    }

    #[test]
    fn zero_total_places_nothing() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut grid = GridSpace::new(3, 3).unwrap();
        let report = distribute_resources(&mut grid, &uniform_holdings(0), &mut rng).unwrap();
        assert!(report.hotspots.is_empty());
        assert_eq!(report.scatter_drop_count(), 0);
        assert!(grid.resource_totals().values().all(|v| *v == 0));
    }

    #[test]
    fn single_cell_grid_receives_everything() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut grid = GridSpace::new(1, 1).unwrap();
        distribute_resources(&mut grid, &uniform_holdings(250), &mut rng).unwrap();
        let cell = grid.cell(Position::new(0, 0)).unwrap();
        assert_eq!(cell.resource(ResourceType::Storage), 250);
    }
}
