//! The agent arena.
//!
//! [`AgentRegistry`] owns every [`Agent`] in a dense `Vec`; an agent's
//! [`AgentId`] is its slot. Cells refer to agents only by id, so the
//! registry is the single owner of agent state.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use swarmgrid_types::{Agent, AgentId, AgentKind, Holdings, Position, ResourceType, uniform_holdings};
use swarmgrid_world::GridSpace;
use tracing::debug;

use crate::error::AgentError;
use crate::random::RandomSource;
use crate::reputation::NEUTRAL_REPUTATION;

/// Units of each type a consumer starts with.
pub const CONSUMER_STARTING_UNITS: u32 = 10;

/// Fewest units of each type a provider or hybrid starts with.
pub const SUPPLIER_MIN_STARTING_UNITS: u32 = 20;

/// Most units of each type a provider or hybrid starts with.
pub const SUPPLIER_MAX_STARTING_UNITS: u32 = 119;

// ---------------------------------------------------------------------------
// Population plan
// ---------------------------------------------------------------------------

/// How many agents of each kind to spawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PopulationPlan {
    /// Pure providers.
    pub providers: u32,
    /// Pure consumers.
    pub consumers: u32,
    /// Hybrids; absorbs rounding so the total is exact.
    pub hybrids: u32,
}

impl PopulationPlan {
    /// Split `total` by ratio: providers and consumers are floored, hybrids
    /// take the remainder.
    pub fn split(total: u32, provider_ratio: f64, consumer_ratio: f64) -> Self {
        let providers = floor_share(total, provider_ratio);
        let consumers = floor_share(total, consumer_ratio).min(total.saturating_sub(providers));
        let hybrids = total.saturating_sub(providers).saturating_sub(consumers);
        Self {
            providers,
            consumers,
            hybrids,
        }
    }

    /// Total agents in the plan.
    pub const fn total(&self) -> u32 {
        self.providers
            .saturating_add(self.consumers)
            .saturating_add(self.hybrids)
    }

    /// Kinds in spawn order: providers, then consumers, then hybrids.
    pub fn kinds(&self) -> impl Iterator<Item = AgentKind> {
        std::iter::repeat_n(AgentKind::Provider, count(self.providers))
            .chain(std::iter::repeat_n(AgentKind::Consumer, count(self.consumers)))
            .chain(std::iter::repeat_n(AgentKind::Hybrid, count(self.hybrids)))
    }
}

fn count(n: u32) -> usize {
    usize::try_from(n).unwrap_or(usize::MAX)
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn floor_share(total: u32, ratio: f64) -> u32 {
    let share = (f64::from(total) * ratio).floor();
    if share.is_nan() || share <= 0.0 {
        0
    } else if share >= f64::from(total) {
        total
    } else {
        share as u32
    }
}

/// Starting holdings for a freshly spawned agent of `kind`.
pub fn starting_holdings<R: RandomSource + ?Sized>(kind: AgentKind, rng: &mut R) -> Holdings {
    match kind {
        AgentKind::Consumer => uniform_holdings(CONSUMER_STARTING_UNITS),
        AgentKind::Provider | AgentKind::Hybrid => ResourceType::ALL
            .iter()
            .map(|r| {
                (
                    *r,
                    rng.between(SUPPLIER_MIN_STARTING_UNITS, SUPPLIER_MAX_STARTING_UNITS),
                )
            })
            .collect(),
    }
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// Arena of all agents, addressed by [`AgentId`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AgentRegistry {
    agents: Vec<Agent>,
}

impl AgentRegistry {
    /// Create an empty registry.
    pub const fn new() -> Self {
        Self { agents: Vec::new() }
    }

    /// Number of agents.
    pub const fn len(&self) -> usize {
        self.agents.len()
    }

    /// Whether the registry is empty.
    pub const fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    /// Look up an agent.
    pub fn get(&self, id: AgentId) -> Option<&Agent> {
        self.agents.get(id.slot())
    }

    /// Look up an agent mutably.
    pub fn get_mut(&mut self, id: AgentId) -> Option<&mut Agent> {
        self.agents.get_mut(id.slot())
    }

    /// All agents in id order.
    pub fn iter(&self) -> impl Iterator<Item = &Agent> {
        self.agents.iter()
    }

    /// All agents in id order, mutably.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Agent> {
        self.agents.iter_mut()
    }

    /// Two distinct agents, mutably. `None` if they are the same or unknown.
    pub fn pair_mut(&mut self, a: AgentId, b: AgentId) -> Option<(&mut Agent, &mut Agent)> {
        let (i, j) = (a.slot(), b.slot());
        if i == j {
            return None;
        }
        let (low, high) = (i.min(j), i.max(j));
        let (left, right) = self.agents.split_at_mut_checked(high)?;
        let low_agent = left.get_mut(low)?;
        let high_agent = right.first_mut()?;
        if i < j {
            Some((low_agent, high_agent))
        } else {
            Some((high_agent, low_agent))
        }
    }

    /// Insert an agent of `kind` at `position` with explicit holdings and
    /// register it with the grid.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::World`] if the position is off the grid, or
    /// [`AgentError::ArithmeticOverflow`] if the arena is full.
    pub fn insert(
        &mut self,
        kind: AgentKind,
        position: Position,
        holdings: Holdings,
        grid: &mut GridSpace,
    ) -> Result<AgentId, AgentError> {
        let index = u32::try_from(self.agents.len()).map_err(|e| AgentError::ArithmeticOverflow {
            context: format!("agent arena full: {e}"),
        })?;
        let id = AgentId::new(index);
        grid.place_agent(id, position)?;
        self.agents.push(Agent {
            id,
            kind,
            position,
            holdings,
            reputation: NEUTRAL_REPUTATION,
            history: Vec::new(),
        });
        Ok(id)
    }

    /// Spawn an agent of `kind` at a uniformly random cell with starting
    /// holdings for its kind.
    ///
    /// # Errors
    ///
    /// See [`AgentRegistry::insert`].
    pub fn spawn<R: RandomSource + ?Sized>(
        &mut self,
        kind: AgentKind,
        grid: &mut GridSpace,
        rng: &mut R,
    ) -> Result<AgentId, AgentError> {
        let position = grid.random_position(rng.generator());
        let holdings = starting_holdings(kind, rng);
        self.insert(kind, position, holdings, grid)
    }

    /// Spawn every agent in `plan`.
    ///
    /// # Errors
    ///
    /// See [`AgentRegistry::insert`].
    pub fn spawn_population<R: RandomSource + ?Sized>(
        &mut self,
        plan: &PopulationPlan,
        grid: &mut GridSpace,
        rng: &mut R,
    ) -> Result<(), AgentError> {
        for kind in plan.kinds() {
            self.spawn(kind, grid, rng)?;
        }
        debug!(
            providers = plan.providers,
            consumers = plan.consumers,
            hybrids = plan.hybrids,
            "Population spawned"
        );
        Ok(())
    }

    /// Total held per resource type across all agents.
    pub fn holdings_totals(&self) -> BTreeMap<ResourceType, u64> {
        ResourceType::ALL
            .iter()
            .map(|r| {
                let total = self
                    .agents
                    .iter()
                    .map(|a| u64::from(a.holding(*r)))
                    .fold(0_u64, u64::saturating_add);
                (*r, total)
            })
            .collect()
    }

    /// Number of agents of each kind.
    pub fn kind_counts(&self) -> BTreeMap<AgentKind, usize> {
        let mut counts: BTreeMap<AgentKind, usize> =
            AgentKind::ALL.iter().map(|k| (*k, 0)).collect();
        for agent in &self.agents {
            if let Some(c) = counts.get_mut(&agent.kind) {
                *c = c.saturating_add(1);
            }
        }
        counts
    }
}
