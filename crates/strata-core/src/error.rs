// crates/strata-core/src/error.rs

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Coarse failure categories shared by every ledger operation.
///
/// Hosts that only care about the class of a failure (retry later, reject the
/// transaction, report a permission problem) match on this instead of on the
/// individual `StrataError` variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorKind {
    /// An era or unbonding window has not opened yet.
    TimingNotElapsed,
    /// The work was already done for the current period (double mint, double era start).
    AlreadySettled,
    /// Zero, out-of-range, or overflowing amount.
    InvalidAmount,
    /// A configured cap would be exceeded.
    LimitExceeded,
    /// The caller lacks the capability required for the operation.
    Unauthorized,
    /// No matching record exists.
    NotFound,
}

/// Protocol-wide error type for the Strata ledger.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StrataError {
    /// `start_new_era` was called before `start_time + period`.
    #[error("Current era is still active: era {era} ends at {ends_at}, now {now}")]
    EraStillActive { era: u64, ends_at: u64, now: u64 },

    /// Delegation would push the indexer past its leverage limit.
    #[error("Delegation limitation reached: {requested} exceeds capacity {capacity}")]
    LeverageExceeded { requested: u128, capacity: u128 },

    /// Amount was zero or otherwise unusable.
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    /// Self-delegation can only be unwound through the indexer exit path.
    #[error("Self delegation can not be unbonded or redelegated")]
    SelfDelegationLocked,

    /// Removal larger than the delegation currently recorded.
    #[error("Removed delegation {requested} cannot be greater than current amount {available}")]
    InsufficientDelegation { requested: u128, available: u128 },

    /// No unbonding request is both unsettled and matured.
    #[error("Need to request unbond before withdraw")]
    NothingToWithdraw,

    /// Every started era has already been inflated.
    #[error("Already minted in the current era")]
    AlreadyMinted,

    /// Basis-point rate above 10000.
    #[error("Rate {0} BP is out of range")]
    RateOutOfRange(u32),

    /// Caller does not hold the required capability.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Token balance too small for a transfer or burn.
    #[error("Insufficient balance: requested {requested}, available {available}")]
    InsufficientBalance { requested: u128, available: u128 },

    /// Checked arithmetic overflowed.
    #[error("Arithmetic overflow in {0}")]
    Overflow(&'static str),

    /// Configuration value out of range.
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl StrataError {
    /// Map this error onto its coarse category.
    pub fn kind(&self) -> ErrorKind {
        match self {
            StrataError::EraStillActive { .. } => ErrorKind::TimingNotElapsed,
            StrataError::NothingToWithdraw => ErrorKind::NotFound,
            StrataError::AlreadyMinted => ErrorKind::AlreadySettled,
            StrataError::LeverageExceeded { .. } => ErrorKind::LimitExceeded,
            StrataError::InvalidAmount(_)
            | StrataError::InsufficientDelegation { .. }
            | StrataError::InsufficientBalance { .. }
            | StrataError::Overflow(_)
            | StrataError::RateOutOfRange(_)
            | StrataError::InvalidConfig(_)
            | StrataError::Serialization(_) => ErrorKind::InvalidAmount,
            StrataError::SelfDelegationLocked | StrataError::Unauthorized(_) => {
                ErrorKind::Unauthorized
            }
            StrataError::NotFound(_) => ErrorKind::NotFound,
        }
    }
}

impl From<serde_json::Error> for StrataError {
    fn from(e: serde_json::Error) -> Self {
        StrataError::Serialization(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_era_still_active_is_timing() {
        let err = StrataError::EraStillActive {
            era: 1,
            ends_at: 100,
            now: 50,
        };
        assert_eq!(err.kind(), ErrorKind::TimingNotElapsed);
    }

    #[test]
    fn test_self_delegation_is_unauthorized() {
        assert_eq!(
            StrataError::SelfDelegationLocked.kind(),
            ErrorKind::Unauthorized
        );
    }

    #[test]
    fn test_display_messages() {
        assert_eq!(
            StrataError::AlreadyMinted.to_string(),
            "Already minted in the current era"
        );
        assert_eq!(
            StrataError::NothingToWithdraw.to_string(),
            "Need to request unbond before withdraw"
        );
    }
}
