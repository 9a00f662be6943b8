//! Transaction log and economic bookkeeping for the SwarmGrid simulation.
//!
//! Every trade attempt is recorded here. The log is the input to the
//! rolling metrics and the dashboard analytics, and the holdings
//! conservation check guards the trade stage. The ledger never panics; it
//! returns errors.
//!
//! # Modules
//!
//! - [`ledger`] -- [`TransactionLog`]: append-only log with windowed queries.
//! - [`transaction`] -- [`TransactionBuilder`] for validated records.
//! - [`metrics`] -- Windowed success rate, average price, utilization.
//! - [`trends`] -- Price trends and the recent-transactions feed.
//! - [`conservation`] -- Per-tick holdings conservation check.

pub mod conservation;
pub mod ledger;
pub mod metrics;
pub mod transaction;
pub mod trends;

pub use conservation::{ConservationResult, verify_conservation};
pub use ledger::TransactionLog;
pub use metrics::{METRICS_WINDOW_TICKS, recompute_metrics};
pub use transaction::TransactionBuilder;
pub use trends::{price_trend, price_trends, recent_counterparties, recent_transactions};

use std::collections::BTreeMap;

use swarmgrid_types::{AgentId, ResourceType};

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors that can occur when recording transactions.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    /// Amount must be strictly positive.
    #[error("transaction amount must be non-zero")]
    ZeroAmount,

    /// Price must be at least 1.
    #[error("transaction price must be at least 1")]
    ZeroPrice,

    /// Provider and consumer are the same agent.
    #[error("agent {agent} cannot trade with itself")]
    SelfTrade {
        /// The agent on both sides.
        agent: AgentId,
    },

    /// A required field was not set on the builder.
    #[error("missing required field: {0}")]
    MissingField(&'static str),
}

// ---------------------------------------------------------------------------
// Anomaly type
// ---------------------------------------------------------------------------

/// A holdings conservation violation detected at the end of a tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConservationAnomaly {
    /// The tick where the anomaly was detected.
    pub tick: u64,
    /// Per-type `(before, after)` totals for every type that changed.
    pub imbalances: BTreeMap<ResourceType, (u64, u64)>,
    /// Human-readable description of the anomaly.
    pub message: String,
}

impl core::fmt::Display for ConservationAnomaly {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.message)
    }
}
