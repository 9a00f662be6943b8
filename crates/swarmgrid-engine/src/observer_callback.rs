//! Tick callback that feeds the Observer `WebSocket` stream.
//!
//! After each tick, timed or manual, this callback converts the
//! [`TickSummary`] into a [`TickBroadcast`] and publishes it to every
//! connected client.

use swarmgrid_core::runner::TickCallback;
use swarmgrid_core::simulation::Simulation;
use swarmgrid_core::tick::TickSummary;
use swarmgrid_observer::TickBroadcast;
use tokio::sync::broadcast;
use tracing::debug;

/// Callback that bridges the tick cycle to the Observer API.
pub struct ObserverCallback {
    tx: broadcast::Sender<TickBroadcast>,
}

impl ObserverCallback {
    /// Create a callback publishing on `tx`.
    pub const fn new(tx: broadcast::Sender<TickBroadcast>) -> Self {
        Self { tx }
    }
}

impl TickCallback for ObserverCallback {
    fn on_tick(&mut self, summary: &TickSummary, simulation: &Simulation) {
        let message = TickBroadcast::from_summary(simulation.run_id(), summary);
        // Sending fails only when no client is connected.
        let receivers = self.tx.send(message).unwrap_or(0);
        debug!(tick = summary.tick, receivers, "Tick broadcast sent");
    }
}
