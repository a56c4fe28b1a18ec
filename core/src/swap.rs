//! Core types for swaps held in escrow: proposals, records, and the
//! settlement decisions the engine emits.

use serde::{Deserialize, Serialize};

use crate::condition::ConditionTag;

/// Unique swap identifier. Dense, starting at 1, never reused.
pub type SwapId = u64;

/// Fee denominator: 10000 basis points = 100%.
pub const BPS_DENOMINATOR: u64 = 10_000;

/// Lifecycle of a swap.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SwapStatus {
    /// Admitted; awaiting execution, expiration, or cancellation.
    Pending,
    /// Release condition satisfied; settlement decision emitted.
    Executed,
    /// Past its expiration height; refund decision emitted.
    Expired,
    /// Cancelled under an authorization proof; refund decision emitted.
    Cancelled,
}

impl SwapStatus {
    /// Whether this status permits no further transition.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending)
    }
}

impl std::fmt::Display for SwapStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Pending => "pending",
            Self::Executed => "executed",
            Self::Expired => "expired",
            Self::Cancelled => "cancelled",
        };
        write!(f, "{}", s)
    }
}

/// Parameters a caller submits to open a swap.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SwapProposal {
    /// Amount locked on the source chain, in its smallest unit
    /// (e.g., satoshis). Must be non-zero.
    pub source_amount: u64,
    /// Amount expected on the target chain. Must be non-zero.
    pub target_amount: u64,
    /// Source-chain block height after which the swap is refundable.
    /// Must be strictly greater than the height at proposal time.
    pub expiration_height: u64,
    /// Exchange rate implied by the proposal, informational unless
    /// price-consistency checking is configured.
    pub price: u64,
    /// Release condition the counterparty must satisfy to claim funds.
    pub condition: ConditionTag,
    /// Fee in basis points (0..=10000), applied to `target_amount`
    /// on execution.
    pub fee_bps: u64,
}

/// One swap held in escrow. Only `status` ever changes after creation,
/// and only through the ledger's compare-and-swap.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SwapRecord {
    /// Unique identifier assigned at creation.
    pub id: SwapId,
    pub source_amount: u64,
    pub target_amount: u64,
    pub expiration_height: u64,
    pub price: u64,
    pub condition: ConditionTag,
    pub fee_bps: u64,
    /// Current lifecycle state.
    pub status: SwapStatus,
    /// Height at which the record was created.
    pub created_at_height: u64,
}

impl SwapRecord {
    /// Build a `Pending` record from an admitted proposal.
    pub fn from_proposal(id: SwapId, proposal: SwapProposal, current_height: u64) -> Self {
        Self {
            id,
            source_amount: proposal.source_amount,
            target_amount: proposal.target_amount,
            expiration_height: proposal.expiration_height,
            price: proposal.price,
            condition: proposal.condition,
            fee_bps: proposal.fee_bps,
            status: SwapStatus::Pending,
            created_at_height: current_height,
        }
    }

    /// Whether the swap is past its expiration height.
    pub fn is_expired(&self, current_height: u64) -> bool {
        current_height > self.expiration_height
    }

    /// Immutable snapshot for external callers.
    pub fn view(&self) -> SwapView {
        SwapView {
            id: self.id,
            source_amount: self.source_amount,
            target_amount: self.target_amount,
            expiration_height: self.expiration_height,
            price: self.price,
            condition: self.condition.clone(),
            fee_bps: self.fee_bps,
            status: self.status,
            created_at_height: self.created_at_height,
        }
    }
}

/// Read-only snapshot of a swap, as returned by status queries.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SwapView {
    pub id: SwapId,
    pub source_amount: u64,
    pub target_amount: u64,
    pub expiration_height: u64,
    pub price: u64,
    pub condition: ConditionTag,
    pub fee_bps: u64,
    pub status: SwapStatus,
    pub created_at_height: u64,
}

/// Decision emitted on successful execution. Actual fund movement is
/// the settlement executor's responsibility, strictly downstream.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Settlement {
    pub id: SwapId,
    /// Target amount net of fees, owed to the claimant.
    pub net_amount: u64,
    /// Fee withheld; `net_amount + fee_amount == target_amount` exactly.
    pub fee_amount: u64,
}

/// Decision emitted on expiration or cancellation: full refund of the
/// source-side lock, no fee.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Refund {
    pub id: SwapId,
    pub source_amount: u64,
}
