// crates/strata-core/src/types.rs
//
// Primitive quantities used across the ledger.
//
// All monetary values are unsigned base units; there is no floating point
// anywhere in ledger accounting. Time is always supplied by the host as whole
// seconds, so the ledger never reads a clock of its own.

use crate::error::StrataError;

/// Token amount in base units.
pub type Amount = u128;

/// Sequential era index. Era 0 is genesis.
pub type EraNumber = u64;

/// Host-supplied timestamp in seconds.
pub type Timestamp = u64;

/// A span of time in seconds.
pub type Seconds = u64;

/// Denominator for all basis-point rates: 10000 BP = 100%.
pub const BASIS_POINTS: u32 = 10_000;

/// Reject a basis-point rate above 100%.
pub fn ensure_rate_bp(rate_bp: u32) -> Result<u32, StrataError> {
    if rate_bp > BASIS_POINTS {
        return Err(StrataError::RateOutOfRange(rate_bp));
    }
    Ok(rate_bp)
}

/// `amount * rate_bp / 10000`, truncating.
pub fn bp_of(amount: Amount, rate_bp: u32) -> Result<Amount, StrataError> {
    amount
        .checked_mul(Amount::from(rate_bp))
        .map(|v| v / Amount::from(BASIS_POINTS))
        .ok_or(StrataError::Overflow("basis point product"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bp_of_truncates() {
        assert_eq!(bp_of(500, 10).unwrap(), 0);
        assert_eq!(bp_of(10_000, 10).unwrap(), 10);
        assert_eq!(bp_of(12_345, 100).unwrap(), 123);
    }

    #[test]
    fn test_ensure_rate_bp_bounds() {
        assert_eq!(ensure_rate_bp(0).unwrap(), 0);
        assert_eq!(ensure_rate_bp(10_000).unwrap(), 10_000);
        assert_eq!(
            ensure_rate_bp(10_001),
            Err(StrataError::RateOutOfRange(10_001))
        );
    }

    #[test]
    fn test_bp_of_overflow() {
        assert!(bp_of(Amount::MAX, 2).is_err());
    }
}
