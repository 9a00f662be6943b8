//! Shared application state for the Observer API server.
//!
//! [`AppState`] holds the [`TickDriver`] (and through it the simulation)
//! plus the broadcast channel for tick summaries. REST reads take the
//! simulation's read lock, so they only ever see completed ticks.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use swarmgrid_core::driver::TickDriver;
use swarmgrid_core::tick::TickSummary;
use swarmgrid_types::EconomicMetrics;
use tokio::sync::broadcast;
use uuid::Uuid;

/// Capacity of the broadcast channel for tick summaries.
///
/// If a subscriber falls behind by more than this many messages it will
/// receive a [`broadcast::error::RecvError::Lagged`] and skip to the
/// newest message.
pub const BROADCAST_CAPACITY: usize = 256;

/// JSON-serializable tick summary pushed over the `WebSocket`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickBroadcast {
    /// Run the tick belongs to.
    pub run_id: Uuid,
    /// The tick number.
    pub tick: u64,
    /// Agents that changed cell.
    pub agents_moved: u32,
    /// Consumers that attempted a trade.
    pub trade_attempts: u32,
    /// Transactions recorded.
    pub transactions: u32,
    /// Recorded transactions that succeeded.
    pub successes: u32,
    /// Metrics after the tick.
    pub metrics: EconomicMetrics,
    /// Whether holdings were conserved.
    pub conserved: bool,
}

impl TickBroadcast {
    /// Project a core tick summary for the wire.
    pub fn from_summary(run_id: Uuid, summary: &TickSummary) -> Self {
        Self {
            run_id,
            tick: summary.tick,
            agents_moved: summary.movement.moved,
            trade_attempts: summary.trade.attempts,
            transactions: summary.trade.recorded,
            successes: summary.trade.successes,
            metrics: summary.metrics.clone(),
            conserved: summary.conserved,
        }
    }
}

/// Create the tick broadcast sender.
///
/// The engine hands a clone to its tick callback before the driver exists,
/// then passes the original to [`AppState::new`].
pub fn broadcast_channel() -> broadcast::Sender<TickBroadcast> {
    let (tx, _) = broadcast::channel(BROADCAST_CAPACITY);
    tx
}

/// Shared state for the Axum application.
///
/// Wrapped in [`Arc`] and injected via Axum's `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Broadcast sender for tick summary messages.
    pub tx: broadcast::Sender<TickBroadcast>,
    /// The driver owning the simulation.
    pub driver: Arc<TickDriver>,
}

impl AppState {
    /// Create application state around `driver`.
    pub const fn new(driver: Arc<TickDriver>, tx: broadcast::Sender<TickBroadcast>) -> Self {
        Self { tx, driver }
    }

    /// Subscribe to the tick broadcast channel.
    pub fn subscribe(&self) -> broadcast::Receiver<TickBroadcast> {
        self.tx.subscribe()
    }
}
