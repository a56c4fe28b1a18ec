use thiserror::Error;

use crate::swap::{SwapId, SwapStatus};

/// Swap engine errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SwapError {
    /// Proposal rejected before admission; no state was created.
    #[error("proposal rejected: {0}")]
    Validation(#[from] ValidationError),

    /// Unknown swap id.
    #[error("swap {0} not found")]
    NotFound(SwapId),

    /// Compare-and-swap failed: the stored status differed from the
    /// expected one at the instant of mutation. A normal outcome of a
    /// lost race, not an application failure.
    #[error("stale state for swap {id}: expected {expected}, found {actual}")]
    StaleState {
        id: SwapId,
        expected: SwapStatus,
        actual: SwapStatus,
    },

    /// The swap already reached a terminal status; the observed status
    /// is reported so the caller can reconcile.
    #[error("swap {id} already finalized as {status}")]
    AlreadyFinalized { id: SwapId, status: SwapStatus },

    /// Execution attempted past the expiration height; the caller
    /// should invoke expiration instead.
    #[error("swap {id} expired at height {expiration_height} (current {current_height})")]
    SwapExpired {
        id: SwapId,
        expiration_height: u64,
        current_height: u64,
    },

    /// Expiration attempted before the expiration height has passed.
    #[error("swap {id} not yet expired: expires after height {expiration_height} (current {current_height})")]
    NotYetExpired {
        id: SwapId,
        expiration_height: u64,
        current_height: u64,
    },

    /// The supplied proof does not satisfy the swap's release condition.
    #[error("condition not satisfied for swap {0}")]
    ConditionNotSatisfied(SwapId),

    /// Cancellation authorization rejected by the configured policy.
    #[error("unauthorized cancellation of swap {0}")]
    Unauthorized(SwapId),
}

/// Reasons a proposal is rejected by the validator.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("source and target amounts must be non-zero")]
    ZeroAmount,

    #[error("fee must be at most 10000 bps, got {0}")]
    InvalidFee(u64),

    #[error("expiration height {expiration_height} must exceed current height {current_height}")]
    InvalidExpiration {
        expiration_height: u64,
        current_height: u64,
    },

    #[error("invalid condition tag: {0}")]
    InvalidCondition(String),

    #[error("target amount {target_amount} outside tolerance of expected {expected_target}")]
    PriceMismatch {
        target_amount: u64,
        expected_target: u64,
    },
}
