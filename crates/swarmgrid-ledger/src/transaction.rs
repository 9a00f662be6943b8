//! Validated construction of [`Transaction`] records.
//!
//! A [`TransactionBuilder`] collects the fields of a trade attempt and
//! refuses to produce a record that breaks the log's invariants: a strictly
//! positive amount, a price of at least 1, and two distinct participants.

use swarmgrid_types::{AgentId, ResourceType, Transaction, TransactionId};

use crate::LedgerError;

// ---------------------------------------------------------------------------
// Transaction builder
// ---------------------------------------------------------------------------

/// Builder for constructing validated [`Transaction`] values.
///
/// # Examples
///
/// ```
/// use swarmgrid_ledger::TransactionBuilder;
/// use swarmgrid_types::{AgentId, ResourceType, TransactionId};
///
/// let tx = TransactionBuilder::new(1, ResourceType::Compute)
///     .provider(AgentId::new(0))
///     .consumer(AgentId::new(1))
///     .amount(5)
///     .price(50)
///     .success(true)
///     .build(TransactionId::new(0));
///
/// assert!(tx.is_ok());
/// ```
#[derive(Debug, Clone, Copy)]
pub struct TransactionBuilder {
    tick: u64,
    resource: ResourceType,
    provider: Option<AgentId>,
    consumer: Option<AgentId>,
    amount: Option<u32>,
    price: Option<u32>,
    success: Option<bool>,
}

impl TransactionBuilder {
    /// Start a record for a trade of `resource` during `tick`.
    pub const fn new(tick: u64, resource: ResourceType) -> Self {
        Self {
            tick,
            resource,
            provider: None,
            consumer: None,
            amount: None,
            price: None,
            success: None,
        }
    }

    /// Set the providing agent.
    #[must_use]
    pub const fn provider(mut self, agent: AgentId) -> Self {
        self.provider = Some(agent);
        self
    }

    /// Set the consuming agent.
    #[must_use]
    pub const fn consumer(mut self, agent: AgentId) -> Self {
        self.consumer = Some(agent);
        self
    }

    /// Set the number of units requested.
    #[must_use]
    pub const fn amount(mut self, amount: u32) -> Self {
        self.amount = Some(amount);
        self
    }

    /// Set the quoted price.
    #[must_use]
    pub const fn price(mut self, price: u32) -> Self {
        self.price = Some(price);
        self
    }

    /// Set whether the units changed hands.
    #[must_use]
    pub const fn success(mut self, success: bool) -> Self {
        self.success = Some(success);
        self
    }

    /// Validate inputs and produce a [`Transaction`] with the given id.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::MissingField`] if a field was never set,
    /// [`LedgerError::ZeroAmount`], [`LedgerError::ZeroPrice`], or
    /// [`LedgerError::SelfTrade`] if the record would break an invariant.
    pub fn build(self, id: TransactionId) -> Result<Transaction, LedgerError> {
        let provider_id = self.provider.ok_or(LedgerError::MissingField("provider"))?;
        let consumer_id = self.consumer.ok_or(LedgerError::MissingField("consumer"))?;
        let amount = self.amount.ok_or(LedgerError::MissingField("amount"))?;
        let price = self.price.ok_or(LedgerError::MissingField("price"))?;
        let success = self.success.ok_or(LedgerError::MissingField("success"))?;

        if amount == 0 {
            return Err(LedgerError::ZeroAmount);
        }
        if price == 0 {
            return Err(LedgerError::ZeroPrice);
        }
        if provider_id == consumer_id {
            return Err(LedgerError::SelfTrade { agent: provider_id });
        }

        Ok(Transaction {
            id,
            provider_id,
            consumer_id,
            resource_type: self.resource,
            amount,
            price,
            tick: self.tick,
            success,
        })
    }
}
