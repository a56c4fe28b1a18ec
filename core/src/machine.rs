//! Transition rules governing a swap's lifecycle.
//!
//! Every function here is a pure decision over a record snapshot; the
//! coordinator commits a decision through the ledger's compare-and-swap,
//! which is what actually guarantees at-most-one transition per swap.

use crate::condition::{ConditionChecker, Proof};
use crate::error::SwapError;
use crate::swap::{Refund, Settlement, SwapRecord, BPS_DENOMINATOR};
use crate::Result;

/// Decide execution: condition satisfied before expiry.
///
/// # Errors
///
/// [`SwapError::AlreadyFinalized`] for a terminal record,
/// [`SwapError::SwapExpired`] past the expiration height (the caller
/// should invoke expiration instead), [`SwapError::ConditionNotSatisfied`]
/// if the checker rejects the proof.
pub fn execute_decision(
    record: &SwapRecord,
    current_height: u64,
    checker: &dyn ConditionChecker,
    proof: &Proof,
) -> Result<Settlement> {
    ensure_pending(record)?;

    if record.is_expired(current_height) {
        return Err(SwapError::SwapExpired {
            id: record.id,
            expiration_height: record.expiration_height,
            current_height,
        });
    }

    if !checker.satisfies(&record.condition, proof) {
        return Err(SwapError::ConditionNotSatisfied(record.id));
    }

    Ok(settle(record))
}

/// Decide expiration: refund once the expiration height has passed.
///
/// # Errors
///
/// [`SwapError::AlreadyFinalized`] for a terminal record,
/// [`SwapError::NotYetExpired`] at or before the expiration height.
pub fn expire_decision(record: &SwapRecord, current_height: u64) -> Result<Refund> {
    ensure_pending(record)?;

    if !record.is_expired(current_height) {
        return Err(SwapError::NotYetExpired {
            id: record.id,
            expiration_height: record.expiration_height,
            current_height,
        });
    }

    Ok(refund(record))
}

/// Decide cancellation. Authorization is the coordinator's concern; by
/// the time this runs the caller has already been authorized.
///
/// # Errors
///
/// [`SwapError::AlreadyFinalized`] for a terminal record.
pub fn cancel_decision(record: &SwapRecord) -> Result<Refund> {
    ensure_pending(record)?;
    Ok(refund(record))
}

fn ensure_pending(record: &SwapRecord) -> Result<()> {
    if record.status.is_terminal() {
        return Err(SwapError::AlreadyFinalized {
            id: record.id,
            status: record.status,
        });
    }
    Ok(())
}

// Fee math in u128: fee_bps <= 10000 is enforced at admission, so the
// fee never exceeds the target amount and the casts cannot truncate.
fn settle(record: &SwapRecord) -> Settlement {
    let fee_amount =
        (record.target_amount as u128 * record.fee_bps as u128 / BPS_DENOMINATOR as u128) as u64;
    Settlement {
        id: record.id,
        net_amount: record.target_amount - fee_amount,
        fee_amount,
    }
}

fn refund(record: &SwapRecord) -> Refund {
    Refund {
        id: record.id,
        source_amount: record.source_amount,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::condition::{ConditionTag, StandardChecker};
    use crate::swap::{SwapProposal, SwapStatus};

    fn record(fee_bps: u64) -> SwapRecord {
        let proposal = SwapProposal {
            source_amount: 10_000_000,
            target_amount: 5000,
            expiration_height: 100_000,
            price: 50_000,
            condition: ConditionTag::new("HODL").unwrap(),
            fee_bps,
        };
        SwapRecord::from_proposal(1, proposal, 1)
    }

    fn hodl() -> Proof {
        Proof::Keyword {
            keyword: "HODL".into(),
        }
    }

    #[test]
    fn execute_settles_with_fee() {
        let checker = StandardChecker::new();
        let settlement = execute_decision(&record(100), 50, &checker, &hodl()).unwrap();
        assert_eq!(settlement.fee_amount, 50); // 1% of 5000
        assert_eq!(settlement.net_amount, 4950);
        assert_eq!(
            settlement.net_amount + settlement.fee_amount,
            record(100).target_amount
        );
    }

    #[test]
    fn fee_bounds() {
        let checker = StandardChecker::new();

        let free = execute_decision(&record(0), 50, &checker, &hodl()).unwrap();
        assert_eq!((free.net_amount, free.fee_amount), (5000, 0));

        let all_fee = execute_decision(&record(BPS_DENOMINATOR), 50, &checker, &hodl()).unwrap();
        assert_eq!((all_fee.net_amount, all_fee.fee_amount), (0, 5000));

        // rounding truncates toward the claimant
        let mut odd = record(33); // 0.33% of 5000 = 16.5
        odd.target_amount = 5000;
        let settlement = execute_decision(&odd, 50, &checker, &hodl()).unwrap();
        assert_eq!(settlement.fee_amount, 16);
        assert_eq!(settlement.net_amount + settlement.fee_amount, 5000);
    }

    #[test]
    fn execute_rejects_bad_proof() {
        let checker = StandardChecker::new();
        let result = execute_decision(
            &record(100),
            50,
            &checker,
            &Proof::Keyword {
                keyword: "SELL".into(),
            },
        );
        assert_eq!(result, Err(SwapError::ConditionNotSatisfied(1)));
    }

    #[test]
    fn execute_expiry_boundary() {
        let checker = StandardChecker::new();
        // at the expiration height execution is still allowed
        assert!(execute_decision(&record(100), 100_000, &checker, &hodl()).is_ok());

        let result = execute_decision(&record(100), 100_001, &checker, &hodl());
        assert_eq!(
            result,
            Err(SwapError::SwapExpired {
                id: 1,
                expiration_height: 100_000,
                current_height: 100_001,
            })
        );
    }

    #[test]
    fn expire_boundary() {
        let refund = expire_decision(&record(100), 100_001).unwrap();
        assert_eq!(refund.source_amount, 10_000_000);

        assert_eq!(
            expire_decision(&record(100), 100_000),
            Err(SwapError::NotYetExpired {
                id: 1,
                expiration_height: 100_000,
                current_height: 100_000,
            })
        );
    }

    #[test]
    fn terminal_records_are_frozen() {
        let checker = StandardChecker::new();
        for status in [
            SwapStatus::Executed,
            SwapStatus::Expired,
            SwapStatus::Cancelled,
        ] {
            let mut r = record(100);
            r.status = status;
            let expected = SwapError::AlreadyFinalized { id: 1, status };
            assert_eq!(
                execute_decision(&r, 50, &checker, &hodl()).unwrap_err(),
                expected
            );
            assert_eq!(expire_decision(&r, 200_000).unwrap_err(), expected);
            assert_eq!(cancel_decision(&r).unwrap_err(), expected);
        }
    }

    #[test]
    fn cancel_refunds_source() {
        let refund = cancel_decision(&record(100)).unwrap();
        assert_eq!(refund.source_amount, 10_000_000);
    }
}
