//! Rolling economic statistics over a trailing window of the log.
//!
//! Metrics are recomputed from scratch every tick. A statistic whose
//! denominator is zero keeps its previous value instead of collapsing to 0
//! or NaN. An empty window keeps all of them, utilization included.

use std::collections::BTreeMap;

use swarmgrid_types::{EconomicMetrics, ResourceType};

use crate::ledger::TransactionLog;

/// Number of trailing ticks the window covers.
pub const METRICS_WINDOW_TICKS: u64 = 50;

#[derive(Debug, Default, Clone, Copy)]
struct TypeTotals {
    successful_price: u64,
    successful_amount: u64,
}

/// Recompute metrics at `current_tick`.
///
/// `holdings` is the current total held per type across all agents.
pub fn recompute_metrics(
    previous: &EconomicMetrics,
    log: &TransactionLog,
    holdings: &BTreeMap<ResourceType, u64>,
    current_tick: u64,
) -> EconomicMetrics {
    let mut attempts: u64 = 0;
    let mut successes: u64 = 0;
    let mut per_type: BTreeMap<ResourceType, TypeTotals> = BTreeMap::new();

    for tx in log.window(current_tick, METRICS_WINDOW_TICKS) {
        attempts = attempts.saturating_add(1);
        if !tx.success {
            continue;
        }
        successes = successes.saturating_add(1);
        let totals = per_type.entry(tx.resource_type).or_default();
        totals.successful_price = totals.successful_price.saturating_add(u64::from(tx.price));
        totals.successful_amount = totals
            .successful_amount
            .saturating_add(u64::from(tx.amount));
    }

    let mut next = previous.clone();
    next.total_transactions = u64::try_from(log.len()).unwrap_or(u64::MAX);

    // An empty window leaves every rolling statistic as it was.
    let Some(rate) = ratio(successes, attempts) else {
        return next;
    };
    next.success_rate = rate;

    for resource in ResourceType::ALL {
        let totals = per_type.get(&resource).copied().unwrap_or_default();

        if let Some(price) = ratio(totals.successful_price, totals.successful_amount) {
            next.average_price.insert(resource, price);
        }

        let held = holdings.get(&resource).copied().unwrap_or(0);
        if let Some(utilization) = ratio(totals.successful_amount, held) {
            next.resource_utilization.insert(resource, utilization);
        }
    }

    next
}

/// `numerator / denominator`, or `None` when the denominator is zero.
#[allow(clippy::cast_precision_loss)]
fn ratio(numerator: u64, denominator: u64) -> Option<f64> {
    if denominator == 0 {
        return None;
    }
    Some(numerator as f64 / denominator as f64)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use swarmgrid_types::AgentId;

    use super::*;
    use crate::transaction::TransactionBuilder;

    fn record(log: &mut TransactionLog, tick: u64, resource: ResourceType, amount: u32, price: u32, success: bool) {
        log.record(
            TransactionBuilder::new(tick, resource)
                .provider(AgentId::new(0))
                .consumer(AgentId::new(1))
                .amount(amount)
                .price(price)
                .success(success),
        )
        .unwrap();
    }

    fn holdings(value: u64) -> BTreeMap<ResourceType, u64> {
        ResourceType::ALL.iter().map(|r| (*r, value)).collect()
    }

    #[test]
    fn computes_rate_price_and_utilization() {
        let mut log = TransactionLog::new();
        record(&mut log, 1, ResourceType::Compute, 5, 50, true);
        record(&mut log, 1, ResourceType::Compute, 5, 40, true);
        record(&mut log, 2, ResourceType::Storage, 2, 20, false);
        record(&mut log, 2, ResourceType::Data, 4, 30, true);

        let metrics = recompute_metrics(&EconomicMetrics::default(), &log, &holdings(100), 2);

        assert_eq!(metrics.total_transactions, 4);
        assert_eq!(metrics.success_rate, 0.75);
        assert_eq!(metrics.average_price[&ResourceType::Compute], 9.0);
        assert_eq!(metrics.average_price[&ResourceType::Data], 7.5);
        // Failed trades do not count as traded volume.
        assert_eq!(metrics.resource_utilization[&ResourceType::Compute], 0.1);
        assert_eq!(metrics.resource_utilization[&ResourceType::Storage], 0.0);
    }

    #[test]
    fn empty_window_retains_previous_values() {
        let mut log = TransactionLog::new();
        record(&mut log, 1, ResourceType::Compute, 2, 20, true);

        let mut previous = EconomicMetrics::default();
        previous.success_rate = 0.6;
        previous.average_price.insert(ResourceType::Compute, 12.5);
        previous.resource_utilization.insert(ResourceType::Data, 0.3);

        // Tick 100: the only transaction (tick 1) is outside the window.
        let metrics = recompute_metrics(&previous, &log, &holdings(100), 100);

        assert_eq!(metrics.total_transactions, 1);
        assert_eq!(metrics.success_rate, 0.6);
        assert_eq!(metrics.average_price[&ResourceType::Compute], 12.5);
        assert_eq!(metrics.resource_utilization[&ResourceType::Data], 0.3);
    }

    #[test]
    fn type_without_successes_keeps_previous_price() {
        let mut log = TransactionLog::new();
        record(&mut log, 3, ResourceType::Storage, 3, 30, false);

        let mut previous = EconomicMetrics::default();
        previous.average_price.insert(ResourceType::Storage, 11.0);

        let metrics = recompute_metrics(&previous, &log, &holdings(10), 3);
        assert_eq!(metrics.success_rate, 0.0);
        assert_eq!(metrics.average_price[&ResourceType::Storage], 11.0);
    }

    #[test]
    fn zero_holdings_retain_utilization() {
        let mut log = TransactionLog::new();
        record(&mut log, 1, ResourceType::Data, 3, 30, true);

        let mut previous = EconomicMetrics::default();
        previous.resource_utilization.insert(ResourceType::Data, 0.42);

        let metrics = recompute_metrics(&previous, &log, &holdings(0), 1);
        assert_eq!(metrics.resource_utilization[&ResourceType::Data], 0.42);
        assert!(metrics.resource_utilization.values().all(|v| v.is_finite()));
    }

    #[test]
    fn window_boundary_is_strict() {
        let mut log = TransactionLog::new();
        record(&mut log, 10, ResourceType::Compute, 1, 10, false);
        record(&mut log, 11, ResourceType::Compute, 1, 10, true);

        // At tick 60 the window is ticks > 10.
        let metrics = recompute_metrics(&EconomicMetrics::default(), &log, &holdings(50), 60);
        assert_eq!(metrics.success_rate, 1.0);
    }
}
