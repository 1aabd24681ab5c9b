// crates/strata-core/src/events.rs
//
// Externally observable ledger effects.
//
// The ledger appends one event per effect in call order; the host drains them
// after each transaction to index, log, or relay them.

use serde::{Deserialize, Serialize};

use crate::account::Account;
use crate::types::{Amount, EraNumber, Seconds};

/// Events emitted by ledger operations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum LedgerEvent {
    /// A new era started.
    NewEraStart { era: EraNumber, caller: Account },
    /// The era period changed; applies to the next boundary check.
    EraPeriodUpdate { era: EraNumber, period: Seconds },
    /// Self-stake added by the registrar; effective immediately.
    Staked { indexer: Account, amount: Amount },
    /// Delegation added; effective next era.
    Delegated {
        source: Account,
        indexer: Account,
        amount: Amount,
    },
    /// Delegation moved between indexers without leaving escrow.
    Redelegated {
        source: Account,
        from: Account,
        to: Account,
        amount: Amount,
    },
    /// An unbonding request was queued.
    UnbondRequested {
        source: Account,
        indexer: Account,
        amount: Amount,
        index: u64,
    },
    /// An unbonding request was settled and paid out.
    Withdrawn {
        source: Account,
        index: u64,
        amount: Amount,
        fee: Amount,
    },
    /// An indexer left the active set.
    IndexerUnregistered { indexer: Account },
    /// Inflation minted for `eras` eras.
    InflationMinted {
        eras: u64,
        amount: Amount,
        destination: Account,
    },
    /// Payment credited to an indexer's reward schedule.
    PaymentDeposited {
        payer: Account,
        indexer: Account,
        amount: Amount,
        first_era: EraNumber,
        last_era: EraNumber,
    },
    /// One era of an indexer's rewards was settled.
    RewardsDistributed {
        indexer: Account,
        era: EraNumber,
        reward: Amount,
    },
    /// Accrued rewards paid to a beneficiary.
    RewardsClaimed {
        indexer: Account,
        beneficiary: Account,
        amount: Amount,
    },
    /// A privileged configuration value changed.
    ConfigUpdated { key: String, value: u128 },
    /// Future inflation is minted to a new account.
    InflationDestinationUpdated { destination: Account },
}

impl LedgerEvent {
    /// Short name of the event, for log lines and metrics labels.
    pub fn name(&self) -> &'static str {
        match self {
            LedgerEvent::NewEraStart { .. } => "new_era_start",
            LedgerEvent::EraPeriodUpdate { .. } => "era_period_update",
            LedgerEvent::Staked { .. } => "staked",
            LedgerEvent::Delegated { .. } => "delegated",
            LedgerEvent::Redelegated { .. } => "redelegated",
            LedgerEvent::UnbondRequested { .. } => "unbond_requested",
            LedgerEvent::Withdrawn { .. } => "withdrawn",
            LedgerEvent::IndexerUnregistered { .. } => "indexer_unregistered",
            LedgerEvent::InflationMinted { .. } => "inflation_minted",
            LedgerEvent::PaymentDeposited { .. } => "payment_deposited",
            LedgerEvent::RewardsDistributed { .. } => "rewards_distributed",
            LedgerEvent::RewardsClaimed { .. } => "rewards_claimed",
            LedgerEvent::ConfigUpdated { .. } => "config_updated",
            LedgerEvent::InflationDestinationUpdated { .. } => "inflation_destination_updated",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_tagging() {
        let event = LedgerEvent::NewEraStart {
            era: 1,
            caller: Account::ZERO,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "new_era_start");
        assert_eq!(json["era"], 1);

        let back: LedgerEvent = serde_json::from_value(json).unwrap();
        assert_eq!(back, event);
    }

    #[test]
    fn test_name_matches_serde_tag() {
        let event = LedgerEvent::UnbondRequested {
            source: Account::ZERO,
            indexer: Account::ZERO,
            amount: 1000,
            index: 0,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], event.name());
    }
}
