//! The global, append-only transaction log.
//!
//! Every trade attempt, successful or not, lands here exactly once and in
//! chronological order. A transaction's id is its index in the log.

use swarmgrid_types::{AgentId, ResourceType, Transaction, TransactionId};

use crate::LedgerError;
use crate::transaction::TransactionBuilder;

/// Append-only log of every trade attempt.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransactionLog {
    entries: Vec<Transaction>,
}

impl TransactionLog {
    /// Create an empty log.
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Number of recorded transactions.
    pub const fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing has been recorded yet.
    pub const fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The id the next recorded transaction will receive.
    pub fn next_id(&self) -> TransactionId {
        TransactionId::new(u64::try_from(self.entries.len()).unwrap_or(u64::MAX))
    }

    /// Validate and append a transaction, returning its id.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError`] if the builder fails validation.
    pub fn record(&mut self, builder: TransactionBuilder) -> Result<TransactionId, LedgerError> {
        let id = self.next_id();
        let tx = builder.build(id)?;
        self.entries.push(tx);
        Ok(id)
    }

    /// All entries, oldest first.
    pub fn entries(&self) -> &[Transaction] {
        &self.entries
    }

    /// Look up a transaction by id.
    pub fn get(&self, id: TransactionId) -> Option<&Transaction> {
        self.entries.get(id.slot())
    }

    /// Transactions recorded during `tick`.
    pub fn for_tick(&self, tick: u64) -> impl DoubleEndedIterator<Item = &Transaction> {
        self.entries.iter().filter(move |t| t.tick == tick)
    }

    /// Transactions with `tick > current_tick - window_ticks`.
    ///
    /// The comparison is done without subtraction so early ticks include
    /// the whole log.
    pub fn window(
        &self,
        current_tick: u64,
        window_ticks: u64,
    ) -> impl DoubleEndedIterator<Item = &Transaction> {
        self.entries
            .iter()
            .filter(move |t| t.tick.saturating_add(window_ticks) > current_tick)
    }

    /// Transactions `agent` took part in, oldest first.
    pub fn involving(&self, agent: AgentId) -> impl DoubleEndedIterator<Item = &Transaction> {
        self.entries.iter().filter(move |t| t.involves(agent))
    }

    /// Successful transactions of `resource`, oldest first.
    pub fn successful_of(
        &self,
        resource: ResourceType,
    ) -> impl DoubleEndedIterator<Item = &Transaction> {
        self.entries
            .iter()
            .filter(move |t| t.success && t.resource_type == resource)
    }

    /// The last `count` transactions, newest first.
    pub fn recent(&self, count: usize) -> Vec<&Transaction> {
        self.entries.iter().rev().take(count).collect()
    }
}
