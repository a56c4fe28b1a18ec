//! Chainswap core: a cross-chain atomic-swap escrow engine.
//!
//! Accepts swap proposals pairing an amount on one chain with an amount
//! on another, holds them in a well-defined lifecycle
//! (propose → execute | expire | cancel), and emits settlement or refund
//! *decisions*; fund movement, height tracking, and transport belong to
//! the host. Current heights are explicit parameters on every
//! height-sensitive call, and every lifecycle transition goes through the
//! ledger's compare-and-swap, so a swap can never be released twice or
//! after expiry, even under concurrent callers.

/// Cancellation authorization policies
pub mod auth;
/// Release-condition tags and pluggable proof checking
pub mod condition;
/// Escrow coordination over validator, ledger, and state machine
pub mod escrow;
/// Swap ledger: id allocation and compare-and-swap record storage
pub mod ledger;
/// Lifecycle transition rules and fee application
pub mod machine;
/// Swap data model: proposals, records, decisions
pub mod swap;
/// Proposal validation
pub mod validate;

/// JSON load/save helpers for hosts
pub mod interface;

pub mod error;
pub use error::{SwapError, ValidationError};

pub type Result<T> = std::result::Result<T, SwapError>;

pub use auth::{cancel_message, Authorization, CancelPolicy, KeyCancelPolicy};
pub use condition::{
    ConditionChecker, ConditionFamily, ConditionTag, ExternalCondition, Proof, StandardChecker,
    MAX_CONDITION_LEN,
};
pub use escrow::EscrowEngine;
pub use ledger::{MemoryLedger, SwapLedger};
pub use swap::{
    Refund, Settlement, SwapId, SwapProposal, SwapRecord, SwapStatus, SwapView, BPS_DENOMINATOR,
};
pub use validate::{validate, PriceCheck};
