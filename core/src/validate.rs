//! Pure validation of swap proposals before admission.
//!
//! No side effects: a rejected proposal allocates no id and writes no
//! state. Checks run in a fixed order and short-circuit on the first
//! failure.

use std::num::NonZeroU64;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::swap::{SwapProposal, BPS_DENOMINATOR};

/// Opt-in price-consistency check.
///
/// When configured, `target_amount` must lie within `tolerance_bps` of
/// `source_amount * price / scale`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct PriceCheck {
    /// Source units per priced unit (e.g. `100_000_000` when `price` is
    /// target units per whole source coin and amounts are in satoshis).
    pub scale: NonZeroU64,
    /// Allowed deviation from the derived target amount, in basis points.
    pub tolerance_bps: u64,
}

impl PriceCheck {
    /// Target amount implied by a proposal's source amount and price.
    pub fn expected_target(&self, source_amount: u64, price: u64) -> u128 {
        source_amount as u128 * price as u128 / self.scale.get() as u128
    }
}

/// Validate a proposal against the current source-chain height.
///
/// # Errors
///
/// The first failing check is returned, in order: [`ValidationError::ZeroAmount`],
/// [`ValidationError::InvalidFee`], [`ValidationError::InvalidExpiration`],
/// [`ValidationError::InvalidCondition`], and, only when `price_check` is
/// supplied, [`ValidationError::PriceMismatch`].
pub fn validate(
    proposal: &SwapProposal,
    current_height: u64,
    price_check: Option<&PriceCheck>,
) -> Result<(), ValidationError> {
    if proposal.source_amount == 0 || proposal.target_amount == 0 {
        return Err(ValidationError::ZeroAmount);
    }

    if proposal.fee_bps > BPS_DENOMINATOR {
        return Err(ValidationError::InvalidFee(proposal.fee_bps));
    }

    if proposal.expiration_height <= current_height {
        return Err(ValidationError::InvalidExpiration {
            expiration_height: proposal.expiration_height,
            current_height,
        });
    }

    proposal.condition.family()?;

    if let Some(check) = price_check {
        let expected = check.expected_target(proposal.source_amount, proposal.price);
        let actual = proposal.target_amount as u128;
        let deviation = expected.abs_diff(actual);
        if deviation * BPS_DENOMINATOR as u128 > expected * check.tolerance_bps as u128 {
            return Err(ValidationError::PriceMismatch {
                target_amount: proposal.target_amount,
                expected_target: u64::try_from(expected).unwrap_or(u64::MAX),
            });
        }
    }

    Ok(())
}
