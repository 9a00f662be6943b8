//! Holdings conservation check.
//!
//! Trades only move units between agents; nothing is minted or burned. The
//! total held per resource type must therefore be identical before and after
//! a tick. A mismatch produces a [`ConservationAnomaly`], which always means
//! a defect in the trade stage.

use std::collections::BTreeMap;

use swarmgrid_types::ResourceType;

use crate::ConservationAnomaly;

/// The result of a conservation check for a single tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConservationResult {
    /// Every type's total is unchanged.
    Balanced,
    /// One or more types changed.
    Anomaly(ConservationAnomaly),
}

impl ConservationResult {
    /// Whether the check passed.
    pub const fn is_balanced(&self) -> bool {
        matches!(self, Self::Balanced)
    }
}

/// Compare per-type holdings totals taken before and after `tick`.
pub fn verify_conservation(
    tick: u64,
    before: &BTreeMap<ResourceType, u64>,
    after: &BTreeMap<ResourceType, u64>,
) -> ConservationResult {
    let mut imbalances = BTreeMap::new();

    for resource in ResourceType::ALL {
        let was = before.get(&resource).copied().unwrap_or(0);
        let now = after.get(&resource).copied().unwrap_or(0);
        if was != now {
            imbalances.insert(resource, (was, now));
        }
    }

    if imbalances.is_empty() {
        return ConservationResult::Balanced;
    }

    let detail: Vec<String> = imbalances
        .iter()
        .map(|(r, (was, now))| format!("{r}: {was} -> {now}"))
        .collect();
    ConservationResult::Anomaly(ConservationAnomaly {
        tick,
        message: format!(
            "holdings not conserved at tick {tick}: {}",
            detail.join(", ")
        ),
        imbalances,
    })
}
