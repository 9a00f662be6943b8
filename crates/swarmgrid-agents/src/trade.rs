//! Trade matching stage: cell-local, reputation-weighted trading.
//!
//! Cells are processed independently in row-major order. Within a cell every
//! eligible consumer may attempt one trade, each against a provider drawn
//! with probability proportional to reputation. Settlement is first-served:
//! each attempt reads the provider's live holdings, so a provider serving
//! several consumers in one tick shows later consumers its already-reduced
//! balance.
//!
//! Every recorded attempt, successful or not, is appended to the global log
//! and then to both participants' histories.
//!
//! A hybrid takes part in at most one role per tick. Once it appears on one
//! side of a recorded transaction it is withdrawn from the other side for
//! the rest of the cell's pass.

use std::collections::BTreeSet;

use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;
use serde::{Deserialize, Serialize};
use swarmgrid_ledger::{TransactionBuilder, TransactionLog};
use swarmgrid_types::{Agent, AgentId, AgentKind, Position, ResourceType, TransactionId};
use swarmgrid_world::GridSpace;
use tracing::trace;

use crate::error::AgentError;
use crate::random::RandomSource;
use crate::registry::AgentRegistry;
use crate::reputation::{penalize, quote_price, reward};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Probability that a trade attempt succeeds.
pub const TRADE_SUCCESS_PROBABILITY: f64 = 0.8;

/// Probability that a hybrid sits out the consumer role for a tick.
pub const HYBRID_ABSTAIN_PROBABILITY: f64 = 0.5;

/// Largest number of units a single trade may move.
pub const MAX_TRADE_UNITS: u32 = 10;

/// Cells with fewer occupants are skipped.
pub const MIN_OCCUPANTS_FOR_TRADE: usize = 2;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Per-tick parameters for the trade stage.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TradeParams {
    /// Tick stamped on recorded transactions.
    pub tick: u64,
    /// Probability that an eligible consumer attempts a trade.
    pub trade_probability: f64,
    /// Scale of reputation adjustments.
    pub reputation_impact: Decimal,
}

/// Counts from one trade pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeReport {
    /// Cells with at least one eligible provider and consumer.
    pub cells_matched: u32,
    /// Consumers that decided to trade.
    pub attempts: u32,
    /// Transactions appended to the log.
    pub recorded: u32,
    /// Recorded transactions that moved units.
    pub successes: u32,
    /// Recorded transactions that did not.
    pub failures: u32,
    /// Attempts dropped because the provider drawn was the consumer.
    pub self_rejections: u32,
    /// Attempts dropped because the provider held none of the drawn type.
    pub empty_caps: u32,
    /// Hybrids skipped as consumers because they already sold this tick.
    pub role_conflicts: u32,
}

/// What happened to a single attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TradeOutcome {
    /// A transaction was recorded.
    Recorded {
        /// Id of the new transaction.
        id: TransactionId,
        /// The provider that was drawn.
        provider: AgentId,
        /// Whether units moved.
        success: bool,
    },
    /// The provider drawn was the consumer itself.
    SelfTrade,
    /// The provider held none of the drawn resource type.
    EmptyCap,
    /// No eligible provider.
    NoProvider,
}

/// The agents in one cell eligible for each role this tick.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CellRoles {
    /// Providers and hybrids, in id order.
    pub providers: Vec<AgentId>,
    /// Consumers and non-abstaining hybrids, in id order.
    pub consumers: Vec<AgentId>,
}

// ---------------------------------------------------------------------------
// Stage
// ---------------------------------------------------------------------------

/// Run trade matching over every cell.
///
/// # Errors
///
/// Returns [`AgentError`] if an occupant is unknown to the registry, or a
/// transfer or log append breaks an invariant.
pub fn run_trade_stage<R: RandomSource + ?Sized>(
    registry: &mut AgentRegistry,
    grid: &mut GridSpace,
    log: &mut TransactionLog,
    params: &TradeParams,
    rng: &mut R,
) -> Result<TradeReport, AgentError> {
    let mut report = TradeReport::default();

    for position in tradable_positions(grid) {
        let occupants: Vec<AgentId> = grid
            .occupants(position)
            .map(|set| set.iter().copied().collect())
            .unwrap_or_default();
        let CellRoles {
            mut providers,
            consumers,
        } = partition_roles(&occupants, registry, rng)?;
        if providers.is_empty() || consumers.is_empty() {
            continue;
        }
        report.cells_matched = report.cells_matched.saturating_add(1);

        let mut provided: BTreeSet<AgentId> = BTreeSet::new();
        for consumer in &consumers {
            if provided.contains(consumer) {
                report.role_conflicts = report.role_conflicts.saturating_add(1);
                continue;
            }
            if !rng.chance(params.trade_probability) {
                continue;
            }
            report.attempts = report.attempts.saturating_add(1);

            match attempt_trade(*consumer, &providers, registry, log, params, rng)? {
                TradeOutcome::Recorded {
                    id,
                    provider,
                    success,
                } => {
                    provided.insert(provider);
                    providers.retain(|p| p != consumer);
                    grid.record_heat(position)?;
                    report.recorded = report.recorded.saturating_add(1);
                    if success {
                        report.successes = report.successes.saturating_add(1);
                    } else {
                        report.failures = report.failures.saturating_add(1);
                    }
                    trace!(tick = params.tick, %position, transaction = %id, success, "Trade recorded");
                }
                TradeOutcome::SelfTrade => {
                    report.self_rejections = report.self_rejections.saturating_add(1);
                }
                TradeOutcome::EmptyCap => {
                    report.empty_caps = report.empty_caps.saturating_add(1);
                }
                TradeOutcome::NoProvider => {}
            }
        }
    }

    Ok(report)
}

/// Split a cell's occupants into this tick's providers and consumers.
///
/// Each hybrid is dropped from the consumer side with
/// [`HYBRID_ABSTAIN_PROBABILITY`]; it stays eligible as a provider. A hybrid
/// left on both sides is narrowed to one role by [`run_trade_stage`] as soon
/// as it trades.
///
/// # Errors
///
/// Returns [`AgentError::AgentNotFound`] for an unknown occupant.
pub fn partition_roles<R: RandomSource + ?Sized>(
    occupants: &[AgentId],
    registry: &AgentRegistry,
    rng: &mut R,
) -> Result<CellRoles, AgentError> {
    let mut roles = CellRoles::default();
    for id in occupants {
        let kind = registry.get(*id).ok_or(AgentError::AgentNotFound(*id))?.kind;
        if kind.can_provide() {
            roles.providers.push(*id);
        }
        if kind.can_consume() && !(kind == AgentKind::Hybrid && rng.hybrid_abstains()) {
            roles.consumers.push(*id);
        }
    }
    Ok(roles)
}

/// Draw a provider with probability proportional to reputation.
///
/// Walks the providers subtracting each weight from a uniform draw in
/// `[0, total)` and picks the first at which the remainder reaches zero.
/// Falls back to a uniform pick if the walk runs off the end.
pub fn select_provider<R: RandomSource + ?Sized>(
    providers: &[AgentId],
    registry: &AgentRegistry,
    rng: &mut R,
) -> Option<AgentId> {
    if providers.is_empty() {
        return None;
    }

    let weights: Vec<Decimal> = providers
        .iter()
        .map(|id| {
            registry
                .get(*id)
                .map_or(Decimal::ZERO, |a| a.reputation.max(Decimal::ZERO))
        })
        .collect();
    let total = weights
        .iter()
        .fold(Decimal::ZERO, |acc, w| acc.saturating_add(*w));

    let fraction = Decimal::from_f64(rng.unit()).unwrap_or(Decimal::ZERO);
    let mut remainder = total.saturating_mul(fraction);
    for (id, weight) in providers.iter().zip(&weights) {
        remainder = remainder.saturating_sub(*weight);
        if remainder <= Decimal::ZERO {
            return Some(*id);
        }
    }

    providers.get(rng.index(providers.len())).copied()
}

/// One consumer's trade attempt against the cell's providers.
///
/// # Errors
///
/// Returns [`AgentError`] if an agent is unknown, the transfer exceeds live
/// holdings, or the record fails validation.
pub fn attempt_trade<R: RandomSource + ?Sized>(
    consumer_id: AgentId,
    providers: &[AgentId],
    registry: &mut AgentRegistry,
    log: &mut TransactionLog,
    params: &TradeParams,
    rng: &mut R,
) -> Result<TradeOutcome, AgentError> {
    let Some(provider_id) = select_provider(providers, registry, rng) else {
        return Ok(TradeOutcome::NoProvider);
    };
    if provider_id == consumer_id {
        return Ok(TradeOutcome::SelfTrade);
    }

    let resource = rng.resource_type();
    let provider = registry
        .get(provider_id)
        .ok_or(AgentError::AgentNotFound(provider_id))?;
    let cap = provider.holding(resource).min(rng.trade_cap());
    if cap == 0 {
        return Ok(TradeOutcome::EmptyCap);
    }
    let amount = rng.trade_amount(cap).clamp(1, cap);
    let price = quote_price(amount, provider.reputation);
    let success = rng.trade_succeeds();

    let id = log.record(
        TransactionBuilder::new(params.tick, resource)
            .provider(provider_id)
            .consumer(consumer_id)
            .amount(amount)
            .price(price)
            .success(success),
    )?;

    let (provider, consumer) = registry
        .pair_mut(provider_id, consumer_id)
        .ok_or(AgentError::AgentNotFound(consumer_id))?;

    if success {
        transfer(provider, consumer, resource, amount)?;
        provider.reputation = reward(provider.reputation, params.reputation_impact);
    } else {
        provider.reputation = penalize(provider.reputation, params.reputation_impact);
    }

    provider.history.push(id);
    consumer.history.push(id);

    Ok(TradeOutcome::Recorded {
        id,
        provider: provider_id,
        success,
    })
}

fn transfer(
    provider: &mut Agent,
    consumer: &mut Agent,
    resource: ResourceType,
    amount: u32,
) -> Result<(), AgentError> {
    let available = provider.holding(resource);
    let remaining = available
        .checked_sub(amount)
        .ok_or(AgentError::InsufficientHoldings {
            agent: provider.id,
            resource,
            requested: amount,
            available,
        })?;
    let received = consumer
        .holding(resource)
        .checked_add(amount)
        .ok_or_else(|| AgentError::ArithmeticOverflow {
            context: format!("agent {} {resource} holdings", consumer.id),
        })?;
    provider.holdings.insert(resource, remaining);
    consumer.holdings.insert(resource, received);
    Ok(())
}

/// Positions of every cell where trading is possible this tick.
pub fn tradable_positions(grid: &GridSpace) -> Vec<Position> {
    grid.crowded_positions(MIN_OCCUPANTS_FOR_TRADE)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic, clippy::indexing_slicing)]
mod tests {
    use std::collections::VecDeque;

    use rand::rngs::StdRng;
    use rust_decimal_macros::dec;
    use swarmgrid_types::{Holdings, uniform_holdings};

    use super::*;
    use crate::random::SeededRandom;

    /// Forces the trade draws; everything else comes from the seeded stream.
    struct Forced {
        inner: SeededRandom,
        resource: ResourceType,
        amount: u32,
        success: bool,
    }

    impl Forced {
        fn new(resource: ResourceType, amount: u32, success: bool) -> Self {
            Self {
                inner: SeededRandom::new(7),
                resource,
                amount,
                success,
            }
        }
    }

    impl RandomSource for Forced {
        fn generator(&mut self) -> &mut StdRng {
            self.inner.generator()
        }

        fn resource_type(&mut self) -> ResourceType {
            self.resource
        }

        fn trade_cap(&mut self) -> u32 {
            MAX_TRADE_UNITS
        }

        fn trade_amount(&mut self, _cap: u32) -> u32 {
            self.amount
        }

        fn trade_succeeds(&mut self) -> bool {
            self.success
        }
    }

    fn params() -> TradeParams {
        TradeParams {
            tick: 1,
            trade_probability: 1.0,
            reputation_impact: dec!(0.1),
        }
    }

    fn holdings(compute: u32) -> Holdings {
        let mut h = uniform_holdings(0);
        h.insert(ResourceType::Compute, compute);
        h
    }

    #[test]
    fn zero_reputation_providers_are_never_weighted_in() {
        let mut grid = GridSpace::new(1, 1).unwrap();
        let mut registry = AgentRegistry::new();
        let here = Position::new(0, 0);
        let shunned = registry
            .insert(AgentKind::Provider, here, holdings(10), &mut grid)
            .unwrap();
        let trusted = registry
            .insert(AgentKind::Provider, here, holdings(10), &mut grid)
            .unwrap();
        registry.get_mut(shunned).unwrap().reputation = Decimal::ZERO;

        let mut rng = SeededRandom::new(3);
        for _ in 0..200 {
            assert_eq!(
                select_provider(&[shunned, trusted], &registry, &mut rng),
                Some(trusted)
            );
        }
    }

    #[test]
    fn selection_favors_higher_reputation() {
        let mut grid = GridSpace::new(1, 1).unwrap();
        let mut registry = AgentRegistry::new();
        let here = Position::new(0, 0);
        let low = registry
            .insert(AgentKind::Provider, here, holdings(10), &mut grid)
            .unwrap();
        let high = registry
            .insert(AgentKind::Provider, here, holdings(10), &mut grid)
            .unwrap();
        registry.get_mut(low).unwrap().reputation = dec!(10);
        registry.get_mut(high).unwrap().reputation = dec!(90);

        let mut rng = SeededRandom::new(4);
        let picks_high = (0..2000)
            .filter(|_| select_provider(&[low, high], &registry, &mut rng) == Some(high))
            .count();
        assert!(picks_high > 1600, "high picked {picks_high} times");
    }

    #[test]
    fn consumers_only_cell_records_nothing() {
        let mut grid = GridSpace::new(2, 2).unwrap();
        let mut registry = AgentRegistry::new();
        for _ in 0..3 {
            registry
                .insert(AgentKind::Consumer, Position::new(1, 0), uniform_holdings(10), &mut grid)
                .unwrap();
        }
        let mut log = TransactionLog::new();
        let mut rng = SeededRandom::new(1);
        let report =
            run_trade_stage(&mut registry, &mut grid, &mut log, &params(), &mut rng).unwrap();
        assert_eq!(report.cells_matched, 0);
        assert!(log.is_empty());
    }

    #[test]
    fn lone_hybrid_pair_never_self_trades_into_the_log() {
        let mut grid = GridSpace::new(1, 1).unwrap();
        let mut registry = AgentRegistry::new();
        let here = Position::new(0, 0);
        registry
            .insert(AgentKind::Hybrid, here, uniform_holdings(50), &mut grid)
            .unwrap();
        registry
            .insert(AgentKind::Hybrid, here, uniform_holdings(50), &mut grid)
            .unwrap();
        let mut log = TransactionLog::new();
        let mut rng = SeededRandom::new(9);
        for tick in 1..=50 {
            let p = TradeParams { tick, ..params() };
            run_trade_stage(&mut registry, &mut grid, &mut log, &p, &mut rng).unwrap();
        }
        assert!(log.entries().iter().all(|t| t.provider_id != t.consumer_id));
    }

    #[test]
    fn empty_provider_holdings_abort_without_record() {
        let mut grid = GridSpace::new(1, 1).unwrap();
        let mut registry = AgentRegistry::new();
        let here = Position::new(0, 0);
        let provider = registry
            .insert(AgentKind::Provider, here, holdings(0), &mut grid)
            .unwrap();
        let consumer = registry
            .insert(AgentKind::Consumer, here, uniform_holdings(10), &mut grid)
            .unwrap();
        let mut log = TransactionLog::new();
        let mut rng = Forced::new(ResourceType::Compute, 5, true);

        let outcome =
            attempt_trade(consumer, &[provider], &mut registry, &mut log, &params(), &mut rng)
                .unwrap();
        assert_eq!(outcome, TradeOutcome::EmptyCap);
        assert!(log.is_empty());
    }

    #[test]
    fn forced_amount_is_capped_by_live_holdings() {
        let mut grid = GridSpace::new(1, 1).unwrap();
        let mut registry = AgentRegistry::new();
        let here = Position::new(0, 0);
        let provider = registry
            .insert(AgentKind::Provider, here, holdings(3), &mut grid)
            .unwrap();
        let consumer = registry
            .insert(AgentKind::Consumer, here, uniform_holdings(10), &mut grid)
            .unwrap();
        let mut log = TransactionLog::new();
        let mut rng = Forced::new(ResourceType::Compute, 8, true);

        attempt_trade(consumer, &[provider], &mut registry, &mut log, &params(), &mut rng)
            .unwrap();
        let tx = log.entries().first().unwrap();
        assert_eq!(tx.amount, 3);
        assert_eq!(registry.get(provider).unwrap().holding(ResourceType::Compute), 0);
    }

    #[test]
    fn provider_settles_first_come_first_served() {
        // One provider with 7 compute, three consumers each asking for 5.
        let mut grid = GridSpace::new(1, 1).unwrap();
        let mut registry = AgentRegistry::new();
        let here = Position::new(0, 0);
        let provider = registry
            .insert(AgentKind::Provider, here, holdings(7), &mut grid)
            .unwrap();
        let consumers: Vec<AgentId> = (0..3)
            .map(|_| {
                registry
                    .insert(AgentKind::Consumer, here, uniform_holdings(10), &mut grid)
                    .unwrap()
            })
            .collect();
        let mut log = TransactionLog::new();
        let mut rng = Forced::new(ResourceType::Compute, 5, true);

        let report =
            run_trade_stage(&mut registry, &mut grid, &mut log, &params(), &mut rng).unwrap();

        // First consumer gets 5, second gets the remaining 2, third finds nothing.
        let amounts: Vec<u32> = log.entries().iter().map(|t| t.amount).collect();
        assert_eq!(amounts, vec![5, 2]);
        assert_eq!(report.empty_caps, 1);
        let compute = |id: AgentId| registry.get(id).unwrap().holding(ResourceType::Compute);
        assert_eq!(compute(provider), 0);
        assert_eq!(compute(consumers[0]), 15);
        assert_eq!(compute(consumers[1]), 12);
        assert_eq!(compute(consumers[2]), 10);
    }

    #[test]
    fn recorded_trade_is_in_log_and_both_histories() {
        let mut grid = GridSpace::new(1, 1).unwrap();
        let mut registry = AgentRegistry::new();
        let here = Position::new(0, 0);
        let provider = registry
            .insert(AgentKind::Provider, here, holdings(20), &mut grid)
            .unwrap();
        let consumer = registry
            .insert(AgentKind::Consumer, here, uniform_holdings(10), &mut grid)
            .unwrap();
        let mut log = TransactionLog::new();
        let mut rng = Forced::new(ResourceType::Compute, 2, false);

        let outcome =
            attempt_trade(consumer, &[provider], &mut registry, &mut log, &params(), &mut rng)
                .unwrap();
        let TradeOutcome::Recorded { id, success, .. } = outcome else {
            panic!("expected a recorded trade, got {outcome:?}");
        };
        assert!(!success);
        assert_eq!(registry.get(provider).unwrap().history, vec![id]);
        assert_eq!(registry.get(consumer).unwrap().history, vec![id]);
        assert_eq!(registry.get(provider).unwrap().reputation, dec!(48.5));
        assert_eq!(registry.get(provider).unwrap().holding(ResourceType::Compute), 20);
        assert_eq!(grid.cell(here).unwrap().heat_level, 0);
    }
    /// Scripts the uniform draws and the hybrid role choice. Trades always
    /// move one unit of compute and succeed.
    struct Scripted {
        inner: SeededRandom,
        units: VecDeque<f64>,
        abstain: bool,
    }

    impl Scripted {
        fn new(units: &[f64], abstain: bool) -> Self {
            Self {
                inner: SeededRandom::new(5),
                units: units.iter().copied().collect(),
                abstain,
            }
        }
    }

    impl RandomSource for Scripted {
        fn generator(&mut self) -> &mut StdRng {
            self.inner.generator()
        }

        fn unit(&mut self) -> f64 {
            self.units.pop_front().unwrap_or(0.0)
        }

        fn resource_type(&mut self) -> ResourceType {
            ResourceType::Compute
        }

        fn trade_cap(&mut self) -> u32 {
            MAX_TRADE_UNITS
        }

        fn trade_amount(&mut self, _cap: u32) -> u32 {
            1
        }

        fn trade_succeeds(&mut self) -> bool {
            true
        }

        fn hybrid_abstains(&mut self) -> bool {
            self.abstain
        }
    }

    fn mixed_cell(kinds: &[AgentKind]) -> (GridSpace, AgentRegistry, Vec<AgentId>) {
        let mut grid = GridSpace::new(1, 1).unwrap();
        let mut registry = AgentRegistry::new();
        let ids = kinds
            .iter()
            .map(|kind| {
                registry
                    .insert(*kind, Position::new(0, 0), uniform_holdings(50), &mut grid)
                    .unwrap()
            })
            .collect();
        (grid, registry, ids)
    }

    #[test]
    fn abstaining_hybrid_is_provider_only() {
        let (_, registry, ids) =
            mixed_cell(&[AgentKind::Hybrid, AgentKind::Provider, AgentKind::Consumer]);
        let roles = partition_roles(&ids, &registry, &mut Scripted::new(&[], true)).unwrap();
        assert_eq!(roles.providers, vec![ids[0], ids[1]]);
        assert_eq!(roles.consumers, vec![ids[2]]);
    }

    #[test]
    fn participating_hybrid_is_eligible_for_both_roles() {
        let (_, registry, ids) =
            mixed_cell(&[AgentKind::Hybrid, AgentKind::Provider, AgentKind::Consumer]);
        let roles = partition_roles(&ids, &registry, &mut Scripted::new(&[], false)).unwrap();
        assert_eq!(roles.providers, vec![ids[0], ids[1]]);
        assert_eq!(roles.consumers, vec![ids[0], ids[2]]);
    }

    #[test]
    fn hybrid_that_sold_does_not_buy_in_the_same_tick() {
        let (mut grid, mut registry, ids) =
            mixed_cell(&[AgentKind::Consumer, AgentKind::Hybrid, AgentKind::Provider]);
        let (consumer, hybrid, provider) = (ids[0], ids[1], ids[2]);
        // Consumer: attempt, then 0.3 of total weight lands on the hybrid.
        // Hybrid: attempt, then 0.9 would land on the provider.
        let mut rng = Scripted::new(&[0.0, 0.3, 0.0, 0.9], false);
        let mut log = TransactionLog::new();

        let report =
            run_trade_stage(&mut registry, &mut grid, &mut log, &params(), &mut rng).unwrap();

        assert_eq!(log.len(), 1);
        let tx = &log.entries()[0];
        assert_eq!((tx.provider_id, tx.consumer_id), (hybrid, consumer));
        assert_eq!(report.role_conflicts, 1);
        assert!(registry.get(provider).unwrap().history.is_empty());
    }

    #[test]
    fn hybrid_that_bought_is_withdrawn_as_provider() {
        let (mut grid, mut registry, ids) =
            mixed_cell(&[AgentKind::Hybrid, AgentKind::Consumer, AgentKind::Provider]);
        let (hybrid, consumer, provider) = (ids[0], ids[1], ids[2]);
        // Hybrid buys from the provider; the consumer's 0.3 draw would
        // otherwise land on the hybrid.
        let mut rng = Scripted::new(&[0.0, 0.9, 0.0, 0.3], false);
        let mut log = TransactionLog::new();

        run_trade_stage(&mut registry, &mut grid, &mut log, &params(), &mut rng).unwrap();

        let pairs: Vec<(AgentId, AgentId)> = log
            .entries()
            .iter()
            .map(|t| (t.provider_id, t.consumer_id))
            .collect();
        assert_eq!(pairs, vec![(provider, hybrid), (provider, consumer)]);
    }

    #[test]
    fn hybrid_never_takes_both_roles_in_one_tick() {
        for seed in 0..200 {
            let (mut grid, mut registry, ids) =
                mixed_cell(&[AgentKind::Provider, AgentKind::Hybrid, AgentKind::Consumer]);
            let hybrid = ids[1];
            let mut log = TransactionLog::new();
            let mut rng = SeededRandom::new(seed);

            run_trade_stage(&mut registry, &mut grid, &mut log, &params(), &mut rng).unwrap();

            let sold = log.entries().iter().any(|t| t.provider_id == hybrid);
            let bought = log.entries().iter().any(|t| t.consumer_id == hybrid);
            assert!(!(sold && bought), "seed {seed}: hybrid bought and sold");
        }
    }
}
