//! Escrow coordination: validator → ledger → state machine sequencing.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::auth::{Authorization, CancelPolicy};
use crate::condition::{ConditionChecker, Proof};
use crate::error::SwapError;
use crate::ledger::{MemoryLedger, SwapLedger};
use crate::machine;
use crate::swap::{Refund, Settlement, SwapId, SwapProposal, SwapRecord, SwapStatus, SwapView};
use crate::validate::{validate, PriceCheck};
use crate::Result;

/// The public face of the engine.
///
/// Thread-safe through `&self`; callers on distinct swaps never contend,
/// and two racing transitions on the same swap resolve to exactly one
/// winner through the ledger's compare-and-swap. Heights are always
/// supplied by the caller; the engine never reads a clock or a chain.
pub struct EscrowEngine<L = MemoryLedger> {
    ledger: L,
    checker: Arc<dyn ConditionChecker>,
    cancel_policy: Arc<dyn CancelPolicy>,
    price_check: Option<PriceCheck>,
}

impl EscrowEngine<MemoryLedger> {
    /// Engine over a fresh in-memory ledger.
    pub fn in_memory(
        checker: Arc<dyn ConditionChecker>,
        cancel_policy: Arc<dyn CancelPolicy>,
    ) -> Self {
        Self::new(MemoryLedger::new(), checker, cancel_policy)
    }
}

impl<L: SwapLedger> EscrowEngine<L> {
    /// Engine over an injected ledger.
    pub fn new(
        ledger: L,
        checker: Arc<dyn ConditionChecker>,
        cancel_policy: Arc<dyn CancelPolicy>,
    ) -> Self {
        Self {
            ledger,
            checker,
            cancel_policy,
            price_check: None,
        }
    }

    /// Enable price-consistency validation for new proposals.
    pub fn with_price_check(mut self, price_check: PriceCheck) -> Self {
        self.price_check = Some(price_check);
        self
    }

    /// Admit a proposal and return its id.
    ///
    /// Validation runs before id allocation, so a rejected proposal
    /// leaves the id counter untouched.
    ///
    /// # Errors
    ///
    /// [`SwapError::Validation`] with the first failing check.
    pub fn propose(&self, proposal: SwapProposal, current_height: u64) -> Result<SwapId> {
        if let Err(reason) = validate(&proposal, current_height, self.price_check.as_ref()) {
            debug!(%reason, "swap proposal rejected");
            return Err(reason.into());
        }

        let id = self.ledger.allocate_id();
        self.ledger
            .insert(SwapRecord::from_proposal(id, proposal, current_height));
        info!(id, current_height, "swap admitted");
        Ok(id)
    }

    /// Immutable snapshot of a swap.
    ///
    /// # Errors
    ///
    /// [`SwapError::NotFound`] for an unknown id.
    pub fn get_status(&self, id: SwapId) -> Result<SwapView> {
        self.load(id).map(|record| record.view())
    }

    /// Execute a pending swap whose condition `proof` satisfies, emitting
    /// a settlement decision for the downstream executor.
    ///
    /// # Errors
    ///
    /// [`SwapError::NotFound`], [`SwapError::SwapExpired`],
    /// [`SwapError::ConditionNotSatisfied`], or
    /// [`SwapError::AlreadyFinalized`] when another transition won the
    /// race; the engine never retries on the caller's behalf.
    pub fn execute(&self, id: SwapId, current_height: u64, proof: &Proof) -> Result<Settlement> {
        let record = self.load(id)?;
        let settlement = machine::execute_decision(&record, current_height, &*self.checker, proof)?;
        self.commit(id, SwapStatus::Executed)?;
        info!(
            id,
            net_amount = settlement.net_amount,
            fee_amount = settlement.fee_amount,
            "swap executed"
        );
        Ok(settlement)
    }

    /// Expire a pending swap past its expiration height, emitting a full
    /// refund decision for the source-side lock.
    ///
    /// # Errors
    ///
    /// [`SwapError::NotFound`], [`SwapError::NotYetExpired`], or
    /// [`SwapError::AlreadyFinalized`].
    pub fn expire(&self, id: SwapId, current_height: u64) -> Result<Refund> {
        let record = self.load(id)?;
        let refund = machine::expire_decision(&record, current_height)?;
        self.commit(id, SwapStatus::Expired)?;
        info!(id, current_height, "swap expired");
        Ok(refund)
    }

    /// Cancel a pending swap under an authorization proof, emitting a
    /// full refund decision.
    ///
    /// # Errors
    ///
    /// [`SwapError::NotFound`], [`SwapError::Unauthorized`], or
    /// [`SwapError::AlreadyFinalized`].
    pub fn cancel(&self, id: SwapId, auth: &Authorization) -> Result<Refund> {
        let record = self.load(id)?;
        if !self.cancel_policy.authorize(&record, auth) {
            return Err(SwapError::Unauthorized(id));
        }
        let refund = machine::cancel_decision(&record)?;
        self.commit(id, SwapStatus::Cancelled)?;
        info!(id, "swap cancelled");
        Ok(refund)
    }

    fn load(&self, id: SwapId) -> Result<SwapRecord> {
        self.ledger.get(id).ok_or(SwapError::NotFound(id))
    }

    // Commit a decision through the ledger CAS. A lost race surfaces as
    // AlreadyFinalized with the status the winner installed.
    fn commit(&self, id: SwapId, new: SwapStatus) -> Result<()> {
        match self.ledger.update_status(id, SwapStatus::Pending, new) {
            Ok(_) => Ok(()),
            Err(SwapError::StaleState { id, actual, .. }) => {
                warn!(id, status = %actual, "transition lost the race");
                Err(SwapError::AlreadyFinalized { id, status: actual })
            }
            Err(other) => Err(other),
        }
    }
}
