//! Read-only dashboard analytics derived from the log.

use std::collections::BTreeMap;

use swarmgrid_types::{AgentId, PriceTrend, ResourceType, Transaction, TransactionId, TrendDirection};

use crate::ledger::TransactionLog;

/// Most recent successful trades sampled per type.
pub const TREND_SAMPLE_SIZE: usize = 20;

/// Fewest samples needed before a trend is reported.
pub const MIN_TREND_SAMPLES: usize = 10;

/// Number of entries in the recent-transactions feed.
pub const RECENT_FEED_SIZE: usize = 5;

/// Counterparties shown in an agent's network view.
pub const NETWORK_VIEW_SIZE: usize = 3;

/// Price trend for every resource type.
///
/// Types with fewer than [`MIN_TREND_SAMPLES`] successful trades report a
/// flat 0% trend.
pub fn price_trends(log: &TransactionLog) -> BTreeMap<ResourceType, PriceTrend> {
    ResourceType::ALL
        .iter()
        .map(|r| (*r, price_trend(log, *r)))
        .collect()
}

/// Compare the mean unit price of the older half of the sample to the newer
/// half.
pub fn price_trend(log: &TransactionLog, resource: ResourceType) -> PriceTrend {
    let mut sample: Vec<&Transaction> = log
        .successful_of(resource)
        .rev()
        .take(TREND_SAMPLE_SIZE)
        .collect();
    sample.reverse();

    if sample.len() < MIN_TREND_SAMPLES {
        return flat();
    }

    let mid = sample.len().checked_div(2).unwrap_or(0);
    let (older, newer) = sample.split_at(mid);
    let (Some(older_avg), Some(newer_avg)) = (mean_unit_price(older), mean_unit_price(newer))
    else {
        return flat();
    };
    if older_avg <= 0.0 {
        return flat();
    }

    let percent_change = (newer_avg - older_avg) / older_avg * 100.0;
    let direction = if percent_change > 0.0 {
        TrendDirection::Up
    } else if percent_change < 0.0 {
        TrendDirection::Down
    } else {
        TrendDirection::Flat
    };
    PriceTrend {
        percent_change,
        direction,
    }
}

const fn flat() -> PriceTrend {
    PriceTrend {
        percent_change: 0.0,
        direction: TrendDirection::Flat,
    }
}

fn mean_unit_price(sample: &[&Transaction]) -> Option<f64> {
    if sample.is_empty() {
        return None;
    }
    let total: f64 = sample
        .iter()
        .map(|t| f64::from(t.price) / f64::from(t.amount))
        .sum();
    let count = f64::from(u32::try_from(sample.len()).unwrap_or(u32::MAX));
    Some(total / count)
}

/// The last [`RECENT_FEED_SIZE`] transactions, newest first.
pub fn recent_transactions(log: &TransactionLog) -> Vec<Transaction> {
    log.recent(RECENT_FEED_SIZE).into_iter().cloned().collect()
}

/// The last [`NETWORK_VIEW_SIZE`] distinct agents `agent` traded with,
/// most recent first, walking `history` backwards.
pub fn recent_counterparties(
    log: &TransactionLog,
    agent: AgentId,
    history: &[TransactionId],
) -> Vec<AgentId> {
    let mut seen = Vec::with_capacity(NETWORK_VIEW_SIZE);
    for id in history.iter().rev() {
        if seen.len() >= NETWORK_VIEW_SIZE {
            break;
        }
        let Some(other) = log.get(*id).and_then(|t| t.counterparty_of(agent)) else {
            continue;
        };
        if !seen.contains(&other) {
            seen.push(other);
        }
    }
    seen
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {

    use super::*;
    use crate::transaction::TransactionBuilder;

    fn record(log: &mut TransactionLog, resource: ResourceType, amount: u32, price: u32, success: bool) {
        log.record(
            TransactionBuilder::new(1, resource)
                .provider(AgentId::new(0))
                .consumer(AgentId::new(1))
                .amount(amount)
                .price(price)
                .success(success),
        )
        .unwrap();
    }

    #[test]
    fn too_few_samples_is_flat() {
        let mut log = TransactionLog::new();
        for _ in 0..9 {
            record(&mut log, ResourceType::Compute, 1, 10, true);
        }
        let trend = price_trend(&log, ResourceType::Compute);
        assert_eq!(trend.direction, TrendDirection::Flat);
        assert_eq!(trend.percent_change, 0.0);
    }

    #[test]
    fn rising_unit_price_trends_up() {
        let mut log = TransactionLog::new();
        for _ in 0..5 {
            record(&mut log, ResourceType::Storage, 2, 20, true);
        }
        for _ in 0..5 {
            record(&mut log, ResourceType::Storage, 2, 30, true);
        }
        // Failures are ignored.
        record(&mut log, ResourceType::Storage, 1, 1, false);

        let trend = price_trend(&log, ResourceType::Storage);
        assert_eq!(trend.direction, TrendDirection::Up);
        assert_eq!(trend.percent_change, 50.0);
    }

    #[test]
    fn only_last_twenty_are_sampled() {
        let mut log = TransactionLog::new();
        for _ in 0..30 {
            record(&mut log, ResourceType::Data, 1, 100, true);
        }
        for _ in 0..10 {
            record(&mut log, ResourceType::Data, 1, 10, true);
        }
        for _ in 0..10 {
            record(&mut log, ResourceType::Data, 1, 5, true);
        }
        let trend = price_trend(&log, ResourceType::Data);
        assert_eq!(trend.direction, TrendDirection::Down);
        assert_eq!(trend.percent_change, -50.0);
    }

    #[test]
    fn recent_feed_is_capped_and_newest_first() {
        let mut log = TransactionLog::new();
        for price in 1..=8 {
            record(&mut log, ResourceType::Compute, 1, price, true);
        }
        let feed = recent_transactions(&log);
        let prices: Vec<u32> = feed.iter().map(|t| t.price).collect();
        assert_eq!(prices, vec![8, 7, 6, 5, 4]);
    }

    #[test]
    fn counterparties_are_distinct_and_newest_first() {
        let mut log = TransactionLog::new();
        let me = AgentId::new(0);
        let mut history = Vec::new();
        for other in [1, 2, 1, 3, 4, 4] {
            let id = log
                .record(
                    TransactionBuilder::new(1, ResourceType::Data)
                        .provider(me)
                        .consumer(AgentId::new(other))
                        .amount(1)
                        .price(10)
                        .success(true),
                )
                .unwrap();
            history.push(id);
        }

        let view = recent_counterparties(&log, me, &history);
        assert_eq!(view, vec![AgentId::new(4), AgentId::new(3), AgentId::new(1)]);
    }
}
